//! Elia day-ahead auction results feed
//!
//! One HTTP GET per calendar date against the Elia grid data service. An
//! empty JSON array means the auction results are not published yet; it is
//! not an error.

use crate::config::FeedConfig;
use crate::error::{Result, SdacError};
use crate::logging::get_logger;
use crate::prices::PriceRecord;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::time::Duration;

/// Source of quarter-hour auction prices for one calendar date
#[async_trait::async_trait]
pub trait PriceFeed: Send + Sync {
    /// Fetch all records for `date`; an empty list means "not yet published"
    async fn fetch(&self, date: NaiveDate) -> Result<Vec<PriceRecord>>;
}

/// One element of the upstream JSON array; other fields are ignored
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuctionResult {
    date_time: DateTime<Utc>,
    price: f64,
}

/// Decode an auction results payload into price records
pub fn parse_auction_results(body: &[u8]) -> Result<Vec<PriceRecord>> {
    let results: Vec<AuctionResult> = serde_json::from_slice(body)
        .map_err(|e| SdacError::fetch(format!("Malformed auction results: {}", e)))?;
    Ok(results
        .into_iter()
        .map(|r| PriceRecord::new(r.date_time, r.price))
        .collect())
}

/// Request URL of the quarter-hour auction results for `date`
pub fn auction_results_url(base_url: &str, date: NaiveDate) -> String {
    format!(
        "{}/interface/Interconnections/daily/auctionresultsqh/{}",
        base_url.trim_end_matches('/'),
        date.format("%Y-%m-%d")
    )
}

/// HTTP client for the Elia feed
pub struct EliaFeedClient {
    base_url: String,
    http: reqwest::Client,
    logger: crate::logging::StructuredLogger,
}

impl EliaFeedClient {
    /// Create a client with the configured base URL and request timeout
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("sdac-elia/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: config.base_url.clone(),
            http,
            logger: get_logger("feed"),
        })
    }
}

#[async_trait::async_trait]
impl PriceFeed for EliaFeedClient {
    async fn fetch(&self, date: NaiveDate) -> Result<Vec<PriceRecord>> {
        let url = auction_results_url(&self.base_url, date);
        self.logger.debug(&format!("GET {}", url));

        let resp = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SdacError::fetch(format!(
                "Elia responded with {} for {}",
                status, date
            )));
        }

        let body = resp.bytes().await?;
        let records = parse_auction_results(&body)?;
        self.logger.debug(&format!(
            "Received {} auction results for {}",
            records.len(),
            date
        ));
        Ok(records)
    }
}
