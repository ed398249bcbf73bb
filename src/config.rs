//! Configuration management for SDAC Elia
//!
//! This module handles loading, validation, and management of the application
//! configuration. The effective configuration is built once at startup by
//! overlaying built-in defaults, the stored data file and an optional stored
//! options file, later sources taking precedence.

use crate::error::{Result, SdacError};
use crate::tariff::TariffConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod defaults;

pub use defaults::DEFAULT_FEED_BASE_URL;

/// Upper bound on the poll interval: one day
pub const MAX_POLL_INTERVAL_SECONDS: u64 = 86_400;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// IANA timezone used to decide "today", "tomorrow" and the local hour
    pub timezone: String,

    /// Upstream feed connection
    pub feed: FeedConfig,

    /// Polling cadence and fetch decisions
    pub coordinator: CoordinatorConfig,

    /// Custom tariff formulas
    pub tariffs: TariffSettings,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Read-only web API binding
    pub web: WebConfig,
}

/// Elia feed connection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Base URL of the Elia grid data service
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

/// Coordinator cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Interval between update cycles in seconds
    pub poll_interval_seconds: u64,

    /// Local hour from which tomorrow's prices are requested
    pub publication_hour: u32,

    /// Minimum spacing between tomorrow-fetch attempts in minutes
    pub tomorrow_retry_minutes: i64,
}

/// Coefficients of the custom electricity price formula
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomPriceParams {
    /// Factor applied to the SDAC price
    pub price_factor: f64,

    /// Fixed amount added after scaling
    pub fixed_price: f64,
}

/// Coefficients of the custom injection tariff formula
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomInjectionParams {
    /// Factor applied to the SDAC price
    pub injection_factor: f64,

    /// Fixed amount subtracted after scaling
    pub fixed_injection_price: f64,
}

/// Tariff configuration as stored, before consistency checks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TariffSettings {
    /// Whether the custom price sensor is enabled
    pub custom_price_enabled: bool,

    /// Whether the custom injection tariff sensor is enabled
    pub custom_injection_enabled: bool,

    /// Custom price coefficients (required when enabled)
    pub custom_price: Option<CustomPriceParams>,

    /// Custom injection tariff coefficients (required when enabled)
    pub custom_injection_tariff: Option<CustomInjectionParams>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional console level override
    pub console_level: Option<String>,

    /// Optional file level override
    pub file_level: Option<String>,

    /// Path to log file
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Whether to serve the read-only API
    pub enabled: bool,

    /// Bind address
    pub host: String,

    /// TCP port
    pub port: u16,
}

impl Config {
    /// Load configuration from a single YAML file on top of the defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_layers(Some(path.as_ref()), None)
    }

    /// Build configuration from defaults, a data file and an options file
    ///
    /// Missing files are skipped. Mappings are merged key by key so an
    /// options file only needs to carry what it overrides.
    pub fn from_layers(data: Option<&Path>, options: Option<&Path>) -> Result<Self> {
        let mut merged = serde_yaml::to_value(Config::default())?;
        for path in [data, options].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            let contents = std::fs::read_to_string(path)?;
            let layer: serde_yaml::Value = serde_yaml::from_str(&contents)?;
            if layer.is_null() {
                continue;
            }
            merge_yaml(&mut merged, layer);
        }
        let config: Config = serde_yaml::from_value(merged)?;
        Ok(config)
    }

    /// Load configuration with validation
    pub fn load() -> Result<Self> {
        let data_path = std::env::var("SDAC_CONFIG").ok().or_else(|| {
            ["sdac_config.yaml", "/data/sdac_config.yaml", "/etc/sdac-elia/config.yaml"]
                .iter()
                .find(|p| Path::new(p).exists())
                .map(|p| (*p).to_string())
        });
        let options_path = std::env::var("SDAC_OPTIONS").ok().or_else(|| {
            data_path.as_ref().and_then(|p| {
                let candidate = Path::new(p).with_file_name("sdac_options.yaml");
                candidate
                    .exists()
                    .then(|| candidate.to_string_lossy().to_string())
            })
        });

        let config = Self::from_layers(
            data_path.as_deref().map(Path::new),
            options_path.as_deref().map(Path::new),
        )?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parsed timezone
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.timezone.parse::<chrono_tz::Tz>().map_err(|_| {
            SdacError::validation("timezone".to_string(), format!("Unknown timezone: {}", self.timezone))
        })
    }

    /// Minimum spacing between tomorrow-fetch attempts
    pub fn tomorrow_retry(&self) -> Result<chrono::TimeDelta> {
        let minutes = self.coordinator.tomorrow_retry_minutes;
        if minutes < 0 {
            return Err(SdacError::validation(
                "coordinator.tomorrow_retry_minutes",
                "Cannot be negative",
            ));
        }
        chrono::TimeDelta::try_minutes(minutes).ok_or_else(|| {
            SdacError::validation(
                "coordinator.tomorrow_retry_minutes".to_string(),
                format!("{} minutes is out of range", minutes),
            )
        })
    }

    /// Validate the configuration
    ///
    /// An enabled custom tariff without its coefficients is reported as
    /// [`SdacError::Inconsistent`].
    pub fn validate(&self) -> Result<()> {
        self.tz()?;
        TariffConfig::from_settings(&self.tariffs)?;
        self.tomorrow_retry()?;

        if self.feed.base_url.trim().is_empty() {
            return Err(SdacError::validation(
                "feed.base_url",
                "Base URL cannot be empty",
            ));
        }

        if self.feed.timeout_seconds == 0 {
            return Err(SdacError::validation(
                "feed.timeout_seconds",
                "Must be greater than 0",
            ));
        }

        if self.coordinator.poll_interval_seconds == 0
            || self.coordinator.poll_interval_seconds > MAX_POLL_INTERVAL_SECONDS
        {
            return Err(SdacError::validation(
                "coordinator.poll_interval_seconds".to_string(),
                format!("Must be between 1 and {}", MAX_POLL_INTERVAL_SECONDS),
            ));
        }

        if self.coordinator.publication_hour > 23 {
            return Err(SdacError::validation(
                "coordinator.publication_hour",
                "Must be between 0 and 23",
            ));
        }

        Ok(())
    }
}

/// Recursively overlay `overlay` onto `base`; non-mapping values replace
pub fn merge_yaml(base: &mut serde_yaml::Value, overlay: serde_yaml::Value) {
    match (base, overlay) {
        (serde_yaml::Value::Mapping(base_map), serde_yaml::Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_yaml(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
