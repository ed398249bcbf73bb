//! Tariff formulas derived from the SDAC price
//!
//! All functions take the base auction price in EUR/MWh. Results are rounded
//! to two decimals, half away from zero on the binary value.

use crate::config::{CustomInjectionParams, CustomPriceParams, TariffSettings};
use crate::error::{Result, SdacError};
use serde::Serialize;

/// Round to `decimals` places, half away from zero
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Ecopower electricity price: `1.02 * base + 4`
pub fn ecopower_price(base: f64) -> f64 {
    round_to(1.02 * base + 4.0, 2)
}

/// Ecopower injection tariff: `0.98 * base - 15`
pub fn ecopower_injection_tariff(base: f64) -> f64 {
    round_to(0.98 * base - 15.0, 2)
}

/// Custom price: `(factor * base + fixed) * 1000`
///
/// The coefficients are expressed per kWh, hence the scaling back to MWh.
pub fn custom_price(base: f64, factor: f64, fixed: f64) -> f64 {
    round_to((factor * base + fixed) * 1e3, 2)
}

/// Custom injection tariff: `(factor * base - fixed) * 1000`
pub fn custom_injection_tariff(base: f64, factor: f64, fixed: f64) -> f64 {
    round_to((factor * base - fixed) * 1e3, 2)
}

/// Validated, immutable tariff configuration
///
/// A custom formula is present exactly when it is enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TariffConfig {
    custom_price: Option<CustomPriceParams>,
    custom_injection: Option<CustomInjectionParams>,
}

impl TariffConfig {
    /// Build from the enabled flags and their coefficient groups
    ///
    /// Fails with [`SdacError::Inconsistent`] when a flag is set without its
    /// coefficients. Coefficients of a disabled formula are ignored.
    pub fn new(
        custom_price_enabled: bool,
        custom_injection_enabled: bool,
        custom_price: Option<CustomPriceParams>,
        custom_injection: Option<CustomInjectionParams>,
    ) -> Result<Self> {
        let custom_price = match (custom_price_enabled, custom_price) {
            (true, None) => {
                return Err(SdacError::inconsistent(
                    "tariffs.custom_price",
                    "custom price enabled without price_factor and fixed_price",
                ));
            }
            (true, params) => params,
            (false, _) => None,
        };
        let custom_injection = match (custom_injection_enabled, custom_injection) {
            (true, None) => {
                return Err(SdacError::inconsistent(
                    "tariffs.custom_injection_tariff",
                    "custom injection tariff enabled without injection_factor and fixed_injection_price",
                ));
            }
            (true, params) => params,
            (false, _) => None,
        };
        Ok(Self {
            custom_price,
            custom_injection,
        })
    }

    pub fn from_settings(settings: &TariffSettings) -> Result<Self> {
        Self::new(
            settings.custom_price_enabled,
            settings.custom_injection_enabled,
            settings.custom_price,
            settings.custom_injection_tariff,
        )
    }

    pub fn custom_price_enabled(&self) -> bool {
        self.custom_price.is_some()
    }

    pub fn custom_injection_enabled(&self) -> bool {
        self.custom_injection.is_some()
    }

    /// Every enabled tariff for the given base price
    pub fn derive(&self, base: f64) -> DerivedPrices {
        DerivedPrices {
            ecopower_price: ecopower_price(base),
            ecopower_injection_tariff: ecopower_injection_tariff(base),
            custom_price: self
                .custom_price
                .map(|p| custom_price(base, p.price_factor, p.fixed_price)),
            custom_injection_tariff: self.custom_injection.map(|p| {
                custom_injection_tariff(base, p.injection_factor, p.fixed_injection_price)
            }),
        }
    }
}

/// Tariffs computed from one resolved SDAC price
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedPrices {
    pub ecopower_price: f64,
    pub ecopower_injection_tariff: f64,
    pub custom_price: Option<f64>,
    pub custom_injection_tariff: Option<f64>,
}
