//! Read-only price sensors
//!
//! A sensor is a named view on one field of the latest [`PriceSnapshot`].
//! All values are in EUR/MWh.

use crate::coordinator::PriceSnapshot;
use crate::tariff::TariffConfig;
use serde::Serialize;

pub const UNIT_EUR_PER_MWH: &str = "EUR/MWh";

pub const SDAC_CURRENT_PRICE: &str = "sdac_current_price";
pub const ECOPOWER_PRICE: &str = "ecopower_price";
pub const ECOPOWER_INJECTION_TARIFF: &str = "ecopower_injection_tariff";
pub const CUSTOM_PRICE: &str = "custom_price";
pub const CUSTOM_INJECTION_TARIFF: &str = "custom_injection_tariff";

/// One exposed value of the snapshot
#[derive(Debug, Clone, Copy)]
pub struct Sensor {
    pub key: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
    selector: fn(&PriceSnapshot) -> Option<f64>,
}

/// Serializable sensor reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorState {
    pub key: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Value>,
}

impl Sensor {
    pub const fn new(
        key: &'static str,
        name: &'static str,
        selector: fn(&PriceSnapshot) -> Option<f64>,
    ) -> Self {
        Self {
            key,
            name,
            unit: UNIT_EUR_PER_MWH,
            selector,
        }
    }

    /// Current value, `None` while unknown
    pub fn native_value(&self, snapshot: &PriceSnapshot) -> Option<f64> {
        (self.selector)(snapshot)
    }

    /// Extra attributes; only the SDAC price sensor carries any
    pub fn extra_state_attributes(&self, snapshot: &PriceSnapshot) -> Option<serde_json::Value> {
        if self.key != SDAC_CURRENT_PRICE {
            return None;
        }
        Some(serde_json::json!({
            "last_update": snapshot.last_fetch_time,
            "prices": snapshot.prices,
        }))
    }

    pub fn read(&self, snapshot: &PriceSnapshot) -> SensorState {
        SensorState {
            key: self.key,
            name: self.name,
            unit: self.unit,
            value: self.native_value(snapshot),
            attributes: self.extra_state_attributes(snapshot),
        }
    }
}

/// Sensors exposed for the given tariff configuration
///
/// Custom tariff sensors only exist when their formula is enabled.
pub fn default_sensors(tariffs: &TariffConfig) -> Vec<Sensor> {
    let mut sensors = vec![
        Sensor::new(SDAC_CURRENT_PRICE, "Elia SDAC current price", |s| {
            s.current_price
        }),
        Sensor::new(ECOPOWER_PRICE, "Ecopower electricity price", |s| {
            s.ecopower_price
        }),
        Sensor::new(ECOPOWER_INJECTION_TARIFF, "Ecopower injection tariff", |s| {
            s.ecopower_injection_tariff
        }),
    ];
    if tariffs.custom_price_enabled() {
        sensors.push(Sensor::new(CUSTOM_PRICE, "Custom electricity price", |s| {
            s.custom_price
        }));
    }
    if tariffs.custom_injection_enabled() {
        sensors.push(Sensor::new(
            CUSTOM_INJECTION_TARIFF,
            "Custom injection tariff",
            |s| s.custom_injection_tariff,
        ));
    }
    sensors
}
