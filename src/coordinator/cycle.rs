use chrono::{DateTime, Days, NaiveDate, Timelike, Utc};
use std::sync::Arc;

use crate::error::{Result, SdacError};
use crate::prices::quarter_hour_start;

use super::types::PriceSnapshot;

impl super::PriceCoordinator {
    /// Run one update cycle against the wall clock
    pub async fn refresh(&mut self) -> Arc<PriceSnapshot> {
        self.refresh_at(Utc::now()).await
    }

    /// Run one update cycle as if the clock read `now`
    ///
    /// A failed fetch aborts the cycle and returns the previous snapshot
    /// unchanged; the next cycle retries.
    pub async fn refresh_at(&mut self, now: DateTime<Utc>) -> Arc<PriceSnapshot> {
        match self.update_cycle(now).await {
            Ok(()) => self.publish(now),
            Err(e) => {
                let msg = format!("Error fetching data from Elia: {}", e);
                if e.is_transient() {
                    self.logger.warn(&msg);
                } else {
                    self.logger.error(&msg);
                }
                self.snapshot()
            }
        }
    }

    async fn update_cycle(&mut self, now: DateTime<Utc>) -> Result<()> {
        let local = now.with_timezone(&self.timezone);
        let today = local.date_naive();
        let tomorrow = today
            .checked_add_days(Days::new(1))
            .ok_or_else(|| SdacError::generic(format!("No calendar day after {}", today)))?;

        self.fetch_today(now, today).await?;

        if self.tomorrow_due(now, local.hour()) {
            self.fetch_tomorrow(now, tomorrow).await?;
        }

        self.resolve(now);
        Ok(())
    }

    /// Today-fetch step: runs until today's prices have been fetched once
    async fn fetch_today(&mut self, now: DateTime<Utc>, today: NaiveDate) -> Result<()> {
        if self.fetch.last_fetch_date == Some(today) {
            return Ok(());
        }

        if self.fetch.last_fetch_date.is_some() && !self.table.is_empty() {
            self.logger
                .info(&format!("New day {}, dropping previous prices", today));
        }
        self.table.clear();
        self.fetch.fetched_tomorrow = false;

        let records = self.feed.fetch(today).await?;
        if records.is_empty() {
            self.logger
                .warn(&format!("SDAC prices of {} not published yet", today));
            return Ok(());
        }

        self.table.replace(records);
        self.fetch.last_fetch_date = Some(today);
        self.fetch.last_fetch_today = Some(now);
        self.logger.info(&format!(
            "SDAC prices of today ({}) fetched from Elia: {} quarter-hours",
            today,
            self.table.len()
        ));
        Ok(())
    }

    fn tomorrow_due(&self, now: DateTime<Utc>, local_hour: u32) -> bool {
        if self.fetch.fetched_tomorrow || local_hour < self.publication_hour {
            return false;
        }
        match self.fetch.last_tomorrow_attempt {
            Some(last) => now - last >= self.tomorrow_retry,
            None => true,
        }
    }

    /// Tomorrow-fetch step: appends tomorrow's prices once published
    async fn fetch_tomorrow(&mut self, now: DateTime<Utc>, tomorrow: NaiveDate) -> Result<()> {
        self.fetch.last_tomorrow_attempt = Some(now);

        let records = self.feed.fetch(tomorrow).await?;
        if records.is_empty() {
            self.logger
                .debug(&format!("SDAC prices of {} not published yet", tomorrow));
            return Ok(());
        }

        let added = self.table.extend(records);
        if added == 0 {
            self.logger.warn(&format!(
                "Elia returned no new quarter-hours for {}, retrying later",
                tomorrow
            ));
            return Ok(());
        }

        self.fetch.fetched_tomorrow = true;
        self.fetch.last_fetch_tomorrow = Some(now);
        self.logger.info(&format!(
            "SDAC prices of tomorrow ({}) fetched from Elia: {} quarter-hours",
            tomorrow, added
        ));
        Ok(())
    }

    /// Resolution step: keeps the previous tariffs on a miss
    fn resolve(&mut self, now: DateTime<Utc>) {
        self.current_price = self.table.current_price(now);
        match self.current_price {
            Some(price) => {
                self.derived = Some(self.tariffs.derive(price));
            }
            None if self.table.is_empty() => {
                self.logger.warn("No SDAC prices available yet");
            }
            None => {
                self.logger.error(&format!(
                    "No time match found in prices from Elia for {}",
                    quarter_hour_start(now).format("%Y-%m-%dT%H:%M:%SZ")
                ));
            }
        }
    }

    fn publish(&self, now: DateTime<Utc>) -> Arc<PriceSnapshot> {
        let snapshot = Arc::new(PriceSnapshot {
            prices: self.table.records().to_vec(),
            current_price: self.current_price,
            last_fetch_time: self.fetch.last_fetch_time(),
            ecopower_price: self.derived.map(|d| d.ecopower_price),
            ecopower_injection_tariff: self.derived.map(|d| d.ecopower_injection_tariff),
            custom_price: self.derived.and_then(|d| d.custom_price),
            custom_injection_tariff: self.derived.and_then(|d| d.custom_injection_tariff),
            updated_at: Some(now),
        });
        self.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }
}
