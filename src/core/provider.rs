//! Rate publication source abstraction

use super::error::RatesError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Undecoded publication bytes for exactly one requested day.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub day: NaiveDate,
    pub bytes: Vec<u8>,
}

impl RawDocument {
    pub fn new(day: NaiveDate, bytes: impl Into<Vec<u8>>) -> Self {
        RawDocument {
            day,
            bytes: bytes.into(),
        }
    }
}

#[async_trait]
pub trait RatesProvider: Send + Sync {
    async fn fetch_document(&self, day: NaiveDate) -> Result<RawDocument, RatesError>;
}
