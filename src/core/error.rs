//! Per-day failure taxonomy for the fetch and parse stages

use chrono::NaiveDate;
use super::observation::InvalidRate;
use thiserror::Error;

/// A failure that drops one day's contribution from the run.
///
/// Every variant carries the requested day so a failure can be reported
/// without any surrounding context.
#[derive(Debug, Error)]
pub enum RatesError {
    #[error("Failed to build request for {day}: {source}")]
    RequestConstruction {
        day: NaiveDate,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request failed for {day}: {source}")]
    Network {
        day: NaiveDate,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {status} for {day}")]
    UnexpectedStatus {
        day: NaiveDate,
        status: reqwest::StatusCode,
    },

    #[error("Failed to read response body for {day}: {source}")]
    ResponseRead {
        day: NaiveDate,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode document for {day}: {reason}")]
    Decode { day: NaiveDate, reason: String },

    #[error("Invalid {field} '{text}' for {day}: {source}")]
    NumericParse {
        day: NaiveDate,
        field: &'static str,
        text: String,
        #[source]
        source: InvalidRate,
    },
}

impl RatesError {
    pub fn day(&self) -> NaiveDate {
        match self {
            RatesError::RequestConstruction { day, .. }
            | RatesError::Network { day, .. }
            | RatesError::UnexpectedStatus { day, .. }
            | RatesError::ResponseRead { day, .. }
            | RatesError::Decode { day, .. }
            | RatesError::NumericParse { day, .. } => *day,
        }
    }

    pub(crate) fn decode(day: NaiveDate, reason: impl Into<String>) -> Self {
        RatesError::Decode {
            day,
            reason: reason.into(),
        }
    }
}
