use crate::core::config::CbrProviderConfig;
use crate::core::{RatesError, RatesProvider, RawDocument};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use tracing::{debug, instrument};

const DAILY_PATH: &str = "/scripts/XML_daily_eng.asp";
const REQUEST_DATE_FORMAT: &str = "%d/%m/%Y";

/// Daily publications of the Central Bank of Russia, one request per day.
pub struct CbrProvider {
    base_url: String,
    client: reqwest::Client,
}

impl CbrProvider {
    pub fn new(config: &CbrProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(CbrProvider {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url_for(&self, day: NaiveDate) -> String {
        format!(
            "{}{}?date_req={}",
            self.base_url,
            DAILY_PATH,
            day.format(REQUEST_DATE_FORMAT)
        )
    }
}

#[async_trait]
impl RatesProvider for CbrProvider {
    #[instrument(name = "CbrDailyFetch", skip(self), fields(day = %day))]
    async fn fetch_document(&self, day: NaiveDate) -> Result<RawDocument, RatesError> {
        let url = self.url_for(day);
        debug!("Requesting daily rates from {}", url);

        let request = self
            .client
            .get(&url)
            .build()
            .map_err(|source| RatesError::RequestConstruction { day, source })?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|source| RatesError::Network { day, source })?;

        if !response.status().is_success() {
            return Err(RatesError::UnexpectedStatus {
                day,
                status: response.status(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| RatesError::ResponseRead { day, source })?;
        debug!(len = bytes.len(), "Received daily rates");

        Ok(RawDocument::new(day, bytes.to_vec()))
    }
}
