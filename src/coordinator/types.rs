use crate::prices::PriceRecord;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// What has been fetched so far, and when
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchState {
    /// Local date whose prices were last fetched successfully as "today"
    pub last_fetch_date: Option<NaiveDate>,
    /// Tomorrow's prices are merged into the table
    pub fetched_tomorrow: bool,
    /// Instant of the last successful fetch of today's prices
    pub last_fetch_today: Option<DateTime<Utc>>,
    /// Instant of the last successful fetch of tomorrow's prices
    pub last_fetch_tomorrow: Option<DateTime<Utc>>,
    /// Instant of the last tomorrow-fetch attempt, successful or not
    pub last_tomorrow_attempt: Option<DateTime<Utc>>,
}

impl FetchState {
    /// Most recent successful fetch, for display
    pub fn last_fetch_time(&self) -> Option<DateTime<Utc>> {
        if self.fetched_tomorrow {
            self.last_fetch_tomorrow
        } else {
            self.last_fetch_today
        }
    }
}

/// Read-only result of an update cycle
///
/// Derived tariffs keep their last-known-good value when the current
/// quarter-hour has no price; `current_price` reflects the latest lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSnapshot {
    pub prices: Vec<PriceRecord>,
    pub current_price: Option<f64>,
    pub last_fetch_time: Option<DateTime<Utc>>,
    pub ecopower_price: Option<f64>,
    pub ecopower_injection_tariff: Option<f64>,
    pub custom_price: Option<f64>,
    pub custom_injection_tariff: Option<f64>,
    pub updated_at: Option<DateTime<Utc>>,
}
