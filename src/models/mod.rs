//! Data models for weatherdb
//!
//! - Location: a geocoded place
//! - Forecast: single forecast slots and the units they are expressed in

pub mod forecast;
pub mod location;

pub use forecast::{ForecastPoint, SlotKey, Units};
pub use location::Location;
