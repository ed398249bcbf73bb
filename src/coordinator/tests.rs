use super::*;
use crate::config::{CustomInjectionParams, CustomPriceParams};
use crate::error::SdacError;
use crate::prices::PriceRecord;
use crate::tariff;
use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Feed returning scripted responses per date, empty once a script runs out
#[derive(Default)]
struct ScriptedFeed {
    responses: Mutex<HashMap<NaiveDate, VecDeque<Result<Vec<PriceRecord>>>>>,
    calls: Mutex<Vec<NaiveDate>>,
}

impl ScriptedFeed {
    fn script(&self, date: NaiveDate, response: Result<Vec<PriceRecord>>) {
        self.responses
            .lock()
            .unwrap()
            .entry(date)
            .or_default()
            .push_back(response);
    }

    fn calls(&self) -> Vec<NaiveDate> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PriceFeed for ScriptedFeed {
    async fn fetch(&self, date: NaiveDate) -> Result<Vec<PriceRecord>> {
        self.calls.lock().unwrap().push(date);
        self.responses
            .lock()
            .unwrap()
            .get_mut(&date)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

/// 96 quarter-hours starting at `start`, priced `base`, `base + 1`, ...
fn day_records(start: DateTime<Utc>, base: f64) -> Vec<PriceRecord> {
    (0..96)
        .map(|i| PriceRecord::new(start + TimeDelta::minutes(15 * i), base + i as f64))
        .collect()
}

// Brussels is UTC+2 in early October 2025
fn oct1_records() -> Vec<PriceRecord> {
    day_records(utc(2025, 9, 30, 22, 0), 50.0)
}

fn oct2_records() -> Vec<PriceRecord> {
    day_records(utc(2025, 10, 1, 22, 0), 150.0)
}

fn coordinator(feed: Arc<ScriptedFeed>) -> PriceCoordinator {
    PriceCoordinator::new(&Config::default(), feed).unwrap()
}

#[tokio::test]
async fn empty_today_response_is_retried_next_cycle() {
    let feed = Arc::new(ScriptedFeed::default());
    feed.script(date(2025, 10, 1), Ok(Vec::new()));
    feed.script(date(2025, 10, 1), Ok(oct1_records()));
    let mut coord = coordinator(feed.clone());

    let first = coord.refresh_at(utc(2025, 10, 1, 10, 0)).await;
    assert!(first.prices.is_empty());
    assert_eq!(first.current_price, None);
    assert_eq!(coord.fetch_state().last_fetch_date, None);

    let second = coord.refresh_at(utc(2025, 10, 1, 10, 1)).await;
    assert_eq!(second.prices.len(), 96);
    // 12:00 local is the 49th quarter-hour of the day
    assert_eq!(second.current_price, Some(98.0));
    assert_eq!(second.ecopower_price, Some(tariff::ecopower_price(98.0)));
    assert_eq!(
        second.ecopower_injection_tariff,
        Some(tariff::ecopower_injection_tariff(98.0))
    );
    assert_eq!(second.custom_price, None);
    assert_eq!(coord.fetch_state().last_fetch_date, Some(date(2025, 10, 1)));
    assert_eq!(second.last_fetch_time, Some(utc(2025, 10, 1, 10, 1)));
    assert_eq!(feed.calls(), vec![date(2025, 10, 1), date(2025, 10, 1)]);
}

#[tokio::test]
async fn today_is_fetched_once_per_day() {
    let feed = Arc::new(ScriptedFeed::default());
    feed.script(date(2025, 10, 1), Ok(oct1_records()));
    let mut coord = coordinator(feed.clone());

    coord.refresh_at(utc(2025, 10, 1, 8, 0)).await;
    let snap = coord.refresh_at(utc(2025, 10, 1, 8, 20)).await;

    assert_eq!(feed.calls(), vec![date(2025, 10, 1)]);
    assert_eq!(snap.prices.len(), 96);
    assert_eq!(snap.current_price, Some(50.0 + 41.0));
}

#[tokio::test]
async fn tomorrow_is_not_requested_before_publication_hour() {
    let feed = Arc::new(ScriptedFeed::default());
    feed.script(date(2025, 10, 1), Ok(oct1_records()));
    let mut coord = coordinator(feed.clone());

    coord.refresh_at(utc(2025, 10, 1, 10, 59)).await;

    assert_eq!(feed.calls(), vec![date(2025, 10, 1)]);
    assert_eq!(coord.fetch_state().last_tomorrow_attempt, None);
}

#[tokio::test]
async fn tomorrow_is_appended_after_publication_hour() {
    let feed = Arc::new(ScriptedFeed::default());
    feed.script(date(2025, 10, 1), Ok(oct1_records()));
    feed.script(date(2025, 10, 2), Ok(oct2_records()));
    let mut coord = coordinator(feed.clone());

    let snap = coord.refresh_at(utc(2025, 10, 1, 11, 5)).await;
    assert_eq!(snap.prices.len(), 192);
    assert!(coord.fetch_state().fetched_tomorrow);
    assert_eq!(snap.last_fetch_time, Some(utc(2025, 10, 1, 11, 5)));
    assert_eq!(feed.calls(), vec![date(2025, 10, 1), date(2025, 10, 2)]);

    // Both days are in; no further requests today
    coord.refresh_at(utc(2025, 10, 1, 11, 30)).await;
    assert_eq!(feed.calls().len(), 2);
}

#[tokio::test]
async fn tomorrow_attempts_are_spaced() {
    let feed = Arc::new(ScriptedFeed::default());
    feed.script(date(2025, 10, 1), Ok(oct1_records()));
    let mut coord = coordinator(feed.clone());

    coord.refresh_at(utc(2025, 10, 1, 11, 5)).await;
    coord.refresh_at(utc(2025, 10, 1, 11, 10)).await;
    assert_eq!(feed.calls(), vec![date(2025, 10, 1), date(2025, 10, 2)]);

    feed.script(date(2025, 10, 2), Ok(oct2_records()));
    let snap = coord.refresh_at(utc(2025, 10, 1, 11, 15)).await;
    assert_eq!(
        feed.calls(),
        vec![date(2025, 10, 1), date(2025, 10, 2), date(2025, 10, 2)]
    );
    assert_eq!(snap.prices.len(), 192);
    assert_eq!(
        coord.fetch_state().last_tomorrow_attempt,
        Some(utc(2025, 10, 1, 11, 15))
    );
}

#[tokio::test]
async fn duplicate_only_tomorrow_response_does_not_count_as_fetched() {
    let feed = Arc::new(ScriptedFeed::default());
    feed.script(date(2025, 10, 1), Ok(oct1_records()));
    feed.script(date(2025, 10, 2), Ok(oct1_records()));
    let mut coord = coordinator(feed.clone());

    let snap = coord.refresh_at(utc(2025, 10, 1, 11, 5)).await;

    assert_eq!(snap.prices.len(), 96);
    assert!(!coord.fetch_state().fetched_tomorrow);
    assert_eq!(coord.fetch_state().last_fetch_tomorrow, None);
}

#[tokio::test]
async fn new_day_drops_previous_prices() {
    let feed = Arc::new(ScriptedFeed::default());
    feed.script(date(2025, 10, 1), Ok(oct1_records()));
    feed.script(date(2025, 10, 2), Ok(oct2_records()));
    feed.script(date(2025, 10, 2), Ok(oct2_records()));
    let mut coord = coordinator(feed.clone());

    coord.refresh_at(utc(2025, 10, 1, 21, 0)).await;
    assert!(coord.fetch_state().fetched_tomorrow);

    // 00:05 local on October 2nd
    let snap = coord.refresh_at(utc(2025, 10, 1, 22, 5)).await;
    assert_eq!(snap.prices.len(), 96);
    assert_eq!(snap.prices[0].timestamp, utc(2025, 10, 1, 22, 0));
    assert_eq!(snap.current_price, Some(150.0));
    assert!(!coord.fetch_state().fetched_tomorrow);
    assert_eq!(coord.fetch_state().last_fetch_date, Some(date(2025, 10, 2)));
    assert_eq!(
        feed.calls(),
        vec![date(2025, 10, 1), date(2025, 10, 2), date(2025, 10, 2)]
    );
}

#[tokio::test]
async fn local_calendar_day_decides_today() {
    let feed = Arc::new(ScriptedFeed::default());
    let mut coord = coordinator(feed.clone());

    // Still September 30th in UTC
    coord.refresh_at(utc(2025, 9, 30, 22, 30)).await;

    assert_eq!(feed.calls(), vec![date(2025, 10, 1)]);
}

#[tokio::test]
async fn fetch_error_keeps_previous_snapshot() {
    let feed = Arc::new(ScriptedFeed::default());
    feed.script(date(2025, 10, 1), Ok(oct1_records()));
    feed.script(date(2025, 10, 2), Err(SdacError::fetch("HTTP 503")));
    let mut coord = coordinator(feed.clone());

    let before = coord.refresh_at(utc(2025, 10, 1, 10, 0)).await;
    let after = coord.refresh_at(utc(2025, 10, 1, 11, 5)).await;

    assert!(Arc::ptr_eq(&before, &after));
    assert!(Arc::ptr_eq(&before, &coord.snapshot()));
    assert!(!coord.fetch_state().fetched_tomorrow);
    assert_eq!(
        coord.fetch_state().last_tomorrow_attempt,
        Some(utc(2025, 10, 1, 11, 5))
    );
}

#[tokio::test]
async fn today_fetch_error_leaves_state_retryable() {
    let feed = Arc::new(ScriptedFeed::default());
    feed.script(date(2025, 10, 1), Err(SdacError::timeout("request timed out")));
    feed.script(date(2025, 10, 1), Ok(oct1_records()));
    let mut coord = coordinator(feed.clone());

    let first = coord.refresh_at(utc(2025, 10, 1, 10, 0)).await;
    assert_eq!(*first, PriceSnapshot::default());

    let second = coord.refresh_at(utc(2025, 10, 1, 10, 1)).await;
    assert_eq!(second.prices.len(), 96);
}

#[tokio::test]
async fn missing_quarter_hour_keeps_last_tariffs() {
    let feed = Arc::new(ScriptedFeed::default());
    feed.script(
        date(2025, 10, 1),
        Ok(vec![PriceRecord::new(utc(2025, 10, 1, 10, 0), 80.0)]),
    );
    let mut coord = coordinator(feed.clone());

    let hit = coord.refresh_at(utc(2025, 10, 1, 10, 7)).await;
    assert_eq!(hit.current_price, Some(80.0));

    let miss = coord.refresh_at(utc(2025, 10, 1, 10, 20)).await;
    assert_eq!(miss.current_price, None);
    assert_eq!(miss.ecopower_price, Some(tariff::ecopower_price(80.0)));
    assert_eq!(miss.prices.len(), 1);
}

#[tokio::test]
async fn enabled_custom_tariffs_are_published() {
    let mut config = Config::default();
    config.tariffs.custom_price_enabled = true;
    config.tariffs.custom_injection_enabled = true;
    config.tariffs.custom_price = Some(CustomPriceParams {
        price_factor: 0.001,
        fixed_price: 0.01,
    });
    config.tariffs.custom_injection_tariff = Some(CustomInjectionParams {
        injection_factor: 0.001,
        fixed_injection_price: 0.012,
    });
    let feed = Arc::new(ScriptedFeed::default());
    feed.script(date(2025, 10, 1), Ok(oct1_records()));
    let mut coord = PriceCoordinator::new(&config, feed).unwrap();

    let snap = coord.refresh_at(utc(2025, 10, 1, 10, 0)).await;

    assert_eq!(
        snap.custom_price,
        Some(tariff::custom_price(98.0, 0.001, 0.01))
    );
    assert_eq!(
        snap.custom_injection_tariff,
        Some(tariff::custom_injection_tariff(98.0, 0.001, 0.012))
    );
}

#[test]
fn enabled_custom_price_without_coefficients_is_rejected() {
    let mut config = Config::default();
    config.tariffs.custom_price_enabled = true;
    let err = PriceCoordinator::new(&config, Arc::new(ScriptedFeed::default()))
        .err()
        .unwrap();
    assert!(matches!(err, SdacError::Inconsistent { .. }));
}

#[test]
fn out_of_range_retry_spacing_is_rejected() {
    let mut config = Config::default();
    config.coordinator.tomorrow_retry_minutes = i64::MAX;
    let err = PriceCoordinator::new(&config, Arc::new(ScriptedFeed::default()))
        .err()
        .unwrap();
    assert!(matches!(err, SdacError::Validation { .. }));
}

#[tokio::test]
async fn run_publishes_then_stops_on_shutdown() {
    let feed = Arc::new(ScriptedFeed::default());
    let mut coord = coordinator(feed.clone());
    let mut updates = coord.subscribe();
    let (tx, rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move { coord.run(rx).await });

    tokio::time::timeout(std::time::Duration::from_secs(5), updates.changed())
        .await
        .unwrap()
        .unwrap();
    assert!(updates.borrow().updated_at.is_some());

    tx.send(()).unwrap();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
    assert!(!feed.calls().is_empty());
}

#[tokio::test]
async fn run_stops_when_shutdown_sender_is_dropped() {
    let mut coord = coordinator(Arc::new(ScriptedFeed::default()));
    let (tx, rx) = mpsc::unbounded_channel::<()>();
    drop(tx);

    let result = tokio::time::timeout(std::time::Duration::from_secs(5), coord.run(rx))
        .await
        .unwrap();
    assert!(result.is_ok());
}

/// Feed whose requests never complete until released
#[derive(Default)]
struct StalledFeed {
    release: tokio::sync::Notify,
    calls: Mutex<Vec<NaiveDate>>,
}

#[async_trait::async_trait]
impl PriceFeed for StalledFeed {
    async fn fetch(&self, date: NaiveDate) -> Result<Vec<PriceRecord>> {
        self.calls.lock().unwrap().push(date);
        self.release.notified().await;
        Ok(oct1_records())
    }
}

#[tokio::test]
async fn shutdown_mid_cycle_abandons_the_fetch() {
    let feed = Arc::new(StalledFeed::default());
    let mut coord = PriceCoordinator::new(&Config::default(), feed.clone()).unwrap();
    let updates = coord.subscribe();
    let (tx, rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        let result = coord.run(rx).await;
        (result, coord)
    });

    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while feed.calls.lock().unwrap().is_empty() {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    tx.send(()).unwrap();
    let (result, coord) = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();

    assert!(result.is_ok());
    assert_eq!(coord.fetch_state().last_fetch_date, None);
    assert!(coord.fetch_state().last_fetch_today.is_none());
    assert!(coord.snapshot().prices.is_empty());
    assert!(!updates.has_changed().unwrap());
    assert_eq!(feed.calls.lock().unwrap().len(), 1);
}
