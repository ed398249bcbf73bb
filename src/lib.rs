//! # SDAC Elia - day-ahead price coordinator
//!
//! Polls the Elia grid data service for the Single Day-Ahead Coupling (SDAC)
//! quarter-hour auction results of today and, once published, tomorrow. The
//! price of the current quarter-hour is resolved every cycle and turned into
//! Ecopower and optional custom supply and injection tariffs.
//!
//! ## Architecture
//!
//! - `config`: Layered YAML configuration and validation
//! - `logging`: Structured logging and tracing
//! - `prices`: Price records and the time-indexed price table
//! - `feed`: Elia auction results client
//! - `tariff`: Tariff formulas
//! - `coordinator`: Update cycle state machine and poll loop
//! - `sensor`: Named read-only views on the published snapshot
//! - `web`: Read-only HTTP API (feature `web`)

pub mod config;
pub mod coordinator;
pub mod error;
pub mod feed;
pub mod logging;
pub mod prices;
pub mod sensor;
pub mod tariff;
#[cfg(feature = "web")]
pub mod web;

#[cfg(test)]
mod config_tests;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::{PriceCoordinator, PriceSnapshot};
pub use error::{Result, SdacError};
pub use feed::{EliaFeedClient, PriceFeed};

/// Version string stamped at build time
pub const APP_VERSION: &str = env!("APP_VERSION");
