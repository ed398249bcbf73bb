//! Quarter-hour price table
//!
//! Holds the SDAC auction results for today and, once published, tomorrow.
//! Records are keyed by their UTC start instant; insertion order is kept for
//! display.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One auction result: the price (EUR/MWh) of the quarter-hour starting at `time`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    #[serde(rename = "time")]
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PriceRecord {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Ordered, timestamp-unique collection of [`PriceRecord`]s
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    records: Vec<PriceRecord>,
    index: HashMap<DateTime<Utc>, usize>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every record (day rollover)
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    /// Replace the whole table with `records`
    pub fn replace(&mut self, records: Vec<PriceRecord>) {
        self.clear();
        self.extend(records);
    }

    /// Append records whose timestamp is not present yet; returns how many were added
    pub fn extend(&mut self, records: impl IntoIterator<Item = PriceRecord>) -> usize {
        let mut added = 0;
        for record in records {
            if self.index.contains_key(&record.timestamp) {
                continue;
            }
            self.index.insert(record.timestamp, self.records.len());
            self.records.push(record);
            added += 1;
        }
        added
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Price of the quarter-hour starting exactly at `timestamp`
    pub fn get(&self, timestamp: &DateTime<Utc>) -> Option<f64> {
        self.index.get(timestamp).map(|&i| self.records[i].price)
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    /// Price in effect at `now`, or `None` when no record covers it
    pub fn current_price(&self, now: DateTime<Utc>) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        self.get(&quarter_hour_start(now))
    }
}

/// Truncate `now` to the most recently started quarter-hour
pub fn quarter_hour_start(now: DateTime<Utc>) -> DateTime<Utc> {
    // Truncation against the epoch cannot overflow for any representable UTC instant
    now.duration_trunc(TimeDelta::minutes(15)).unwrap_or(now)
}
