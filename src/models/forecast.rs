//! Forecast point model and measurement units

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Location;

/// One forecast time slot for one location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastPoint {
    /// Start of the forecast slot
    pub timestamp: DateTime<Utc>,
    /// Temperature in the units the forecast was requested in
    pub temperature: f64,
    /// Primary weather category, e.g. "Rain"
    pub weather_main: String,
    /// Free-text condition, e.g. "light rain"
    pub weather_description: String,
    /// Wind speed (m/s for metric, mph for imperial)
    pub wind_speed: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    pub city: String,
    pub country: String,
}

/// Identity of a point inside a dataset
pub type SlotKey<'a> = (DateTime<Utc>, &'a str, &'a str);

impl ForecastPoint {
    #[must_use]
    pub fn key(&self) -> SlotKey<'_> {
        (self.timestamp, &self.city, &self.country)
    }

    /// Whether this point belongs to the given location
    #[must_use]
    pub fn is_for(&self, location: &Location) -> bool {
        self.city == location.name && self.country == location.country
    }
}

/// Measurement system requested from the provider
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Query parameter value understood by the provider
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Units {
    type Err = crate::WeatherDbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            other => Err(crate::WeatherDbError::validation(format!(
                "Unknown units '{other}'. Must be one of: metric, imperial"
            ))),
        }
    }
}
