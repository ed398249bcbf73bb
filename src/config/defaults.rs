use super::*;

/// Elia grid data service hosting the auction results
pub const DEFAULT_FEED_BASE_URL: &str = "https://griddata.elia.be/eliabecontrols.prod";

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FEED_BASE_URL.to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 60,
            publication_hour: 13,
            tomorrow_retry_minutes: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/sdac-elia.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 8089,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: "Europe/Brussels".to_string(),
            feed: FeedConfig::default(),
            coordinator: CoordinatorConfig::default(),
            tariffs: TariffSettings::default(),
            logging: LoggingConfig::default(),
            web: WebConfig::default(),
        }
    }
}
