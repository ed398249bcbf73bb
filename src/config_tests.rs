#![cfg(test)]

use super::config::*;

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.feed.base_url, defaults_base_url());
    assert_eq!(config.feed.timeout_seconds, 10);
    assert_eq!(config.coordinator.tomorrow_retry_minutes, 10);
}

fn defaults_base_url() -> &'static str {
    "https://griddata.elia.be/eliabecontrols.prod"
}

#[test]
fn test_config_serialization() {
    let mut config = Config::default();
    config.tariffs.custom_price_enabled = true;
    config.tariffs.custom_price = Some(CustomPriceParams {
        price_factor: 0.0011,
        fixed_price: 0.012,
    });
    let yaml = serde_yaml::to_string(&config).unwrap();
    let deserialized: Config = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(deserialized.tariffs.custom_price, config.tariffs.custom_price);
    assert!(deserialized.tariffs.custom_price_enabled);
}

#[test]
fn test_partial_yaml_uses_defaults() {
    let config: Config = serde_yaml::from_str("timezone: UTC\n").unwrap();
    assert_eq!(config.timezone, "UTC");
    assert_eq!(config.coordinator.publication_hour, 13);
    assert_eq!(config.web.port, 8089);
}

#[test]
fn test_injection_flag_requires_coefficients() {
    let mut config = Config::default();
    config.tariffs.custom_injection_enabled = true;
    assert!(config.validate().is_err());

    config.tariffs.custom_injection_tariff = Some(CustomInjectionParams {
        injection_factor: 0.0009,
        fixed_injection_price: 0.01,
    });
    assert!(config.validate().is_ok());
}
