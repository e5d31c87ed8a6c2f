//! `weatherdb` - incrementally maintained forecast history
//!
//! Resolves place names through OpenWeatherMap geocoding, fetches their
//! 5 day / 3 hour forecasts and folds them into a [`Dataset`] that holds one
//! point per `(timestamp, city, country)`, sorted by time.

pub mod api;
pub mod config;
pub mod database;
pub mod dataset;
pub mod error;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod update;
pub mod weather;

// Re-export core types for public API
pub use api::OpenWeatherClient;
pub use config::WeatherDbConfig;
pub use database::WeatherDb;
pub use dataset::{Dataset, merge};
pub use error::WeatherDbError;
pub use location_resolver::GeoResolver;
pub use models::{ForecastPoint, Location, Units};
pub use update::{FailureKind, LocationFailure, UpdateReport, WeatherUpdater};
pub use weather::ForecastFetcher;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherDbError>;
