// src/services/treasury.rs
use std::future::Future;
use std::time::Duration;
use log::{error, info};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{redirect, Client, StatusCode};
use thiserror::Error;

use crate::config::ServiceConfig;
use super::feed::ParseError;

/// Anything that keeps the upstream feed from giving us usable entries.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Treasury request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Treasury responded with status {0}")]
    Status(StatusCode),

    #[error("Treasury feed is not valid XML: {0}")]
    Malformed(#[from] ParseError),
}

/// Source of the raw daily bill-rate feed for one calendar year.
pub trait FeedSource: Send + Sync {
    fn fetch_year(&self, year: i32) -> impl Future<Output = Result<String, FeedError>> + Send;
}

impl<T: FeedSource> FeedSource for std::sync::Arc<T> {
    fn fetch_year(&self, year: i32) -> impl Future<Output = Result<String, FeedError>> + Send {
        (**self).fetch_year(year)
    }
}

/// Fetches the daily T-bill rates XML from home.treasury.gov. One attempt per
/// call; the underlying client enforces the timeout and redirect bound.
#[derive(Debug, Clone)]
pub struct TreasuryClient {
    client: Client,
    endpoint: String,
}

impl TreasuryClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration, max_redirects: usize) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::limited(max_redirects))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, FeedError> {
        Self::new(
            config.feed_url.clone(),
            config.feed_timeout,
            config.feed_max_redirects,
        )
    }
}

impl FeedSource for TreasuryClient {
    async fn fetch_year(&self, year: i32) -> Result<String, FeedError> {
        info!("Fetching T-bill XML for {} from {}", year, self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("data", "daily_treasury_bill_rates".to_string()),
                ("field_tdr_date_value", year.to_string()),
            ])
            .header(ACCEPT, "application/xml,text/xml")
            .header(USER_AGENT, "treasury-yields-service/1.0")
            .send()
            .await
            .map_err(|e| {
                error!("Treasury request for {} failed: {}", year, e);
                FeedError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Treasury responded {} for {}", status, year);
            return Err(FeedError::Status(status));
        }

        let body = response.text().await?;
        info!("Received {} bytes of T-bill XML for {}", body.len(), year);
        Ok(body)
    }
}
