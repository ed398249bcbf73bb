//! Price-update coordinator
//!
//! Owns the price table, the fetch bookkeeping and the latest derived
//! tariffs. Each cycle decides whether today's or tomorrow's auction results
//! must be fetched, merges them, resolves the price of the current
//! quarter-hour and recomputes the tariffs. Consumers only ever see
//! immutable [`PriceSnapshot`]s published through a watch channel.

mod cycle;
mod runtime;
mod types;

#[cfg(test)]
mod tests;

use crate::config::{Config, MAX_POLL_INTERVAL_SECONDS};
use crate::error::Result;
use crate::feed::PriceFeed;
use crate::logging::{LogContext, get_logger_with_context};
use crate::prices::PriceTable;
use crate::tariff::{DerivedPrices, TariffConfig};
use chrono::TimeDelta;
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub use types::{FetchState, PriceSnapshot};

/// Stateful polling engine for SDAC prices
pub struct PriceCoordinator {
    /// Validated tariff formulas
    tariffs: TariffConfig,

    /// Timezone deciding the calendar day and publication hour
    timezone: Tz,

    /// Local hour from which tomorrow's prices are requested
    publication_hour: u32,

    /// Minimum spacing between tomorrow-fetch attempts
    tomorrow_retry: TimeDelta,

    /// Interval between cycles
    poll_interval: Duration,

    /// Upstream feed
    feed: Arc<dyn PriceFeed>,

    /// Today's and, when published, tomorrow's prices
    table: PriceTable,

    /// Fetch bookkeeping
    fetch: FetchState,

    /// Price resolved in the latest cycle
    current_price: Option<f64>,

    /// Last-known-good tariffs
    derived: Option<DerivedPrices>,

    /// Latest published snapshot
    snapshot_tx: watch::Sender<Arc<PriceSnapshot>>,

    logger: crate::logging::StructuredLogger,
}

impl PriceCoordinator {
    /// Create a coordinator from the application configuration
    ///
    /// Fails immediately when an enabled custom tariff lacks its coefficients
    /// or the timezone is unknown.
    pub fn new(config: &Config, feed: Arc<dyn PriceFeed>) -> Result<Self> {
        let tariffs = TariffConfig::from_settings(&config.tariffs)?;
        let timezone = config.tz()?;
        let tomorrow_retry = config.tomorrow_retry()?;
        let logger = get_logger_with_context(
            LogContext::new("coordinator").with_field("timezone", config.timezone.clone()),
        );
        let (snapshot_tx, _) = watch::channel(Arc::new(PriceSnapshot::default()));

        logger.info("SDAC coordinator was set up");

        Ok(Self {
            tariffs,
            timezone,
            publication_hour: config.coordinator.publication_hour,
            tomorrow_retry,
            poll_interval: Duration::from_secs(
                config
                    .coordinator
                    .poll_interval_seconds
                    .clamp(1, MAX_POLL_INTERVAL_SECONDS),
            ),
            feed,
            table: PriceTable::new(),
            fetch: FetchState::default(),
            current_price: None,
            derived: None,
            snapshot_tx,
            logger,
        })
    }

    /// Subscribe to published snapshots
    pub fn subscribe(&self) -> watch::Receiver<Arc<PriceSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<PriceSnapshot> {
        self.snapshot_tx.borrow().clone()
    }

    pub fn tariffs(&self) -> &TariffConfig {
        &self.tariffs
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch
    }
}
