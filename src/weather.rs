use crate::api::{ForecastEntry, ForecastResponse, OpenWeatherClient};
use crate::models::{ForecastPoint, Location, Units};
use crate::{Result, WeatherDbError};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::debug;

const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Retrieves the forecast series for a resolved location.
///
/// A fetch either yields every slot the provider returned or fails as a whole.
#[async_trait]
pub trait ForecastFetcher: Send + Sync {
    async fn fetch(&self, location: &Location, units: Units) -> Result<Vec<ForecastPoint>>;
}

#[async_trait]
impl<T: ForecastFetcher + ?Sized> ForecastFetcher for Arc<T> {
    async fn fetch(&self, location: &Location, units: Units) -> Result<Vec<ForecastPoint>> {
        (**self).fetch(location, units).await
    }
}

#[async_trait]
impl ForecastFetcher for OpenWeatherClient {
    async fn fetch(&self, location: &Location, units: Units) -> Result<Vec<ForecastPoint>> {
        let response = self
            .forecast(location.latitude, location.longitude, units)
            .await?;
        let points = into_points(response, location)?;
        debug!("Fetched {} forecast points for {}", points.len(), location);
        Ok(points)
    }
}

/// Convert a provider response into points stamped with `location`'s name and country.
pub fn into_points(response: ForecastResponse, location: &Location) -> Result<Vec<ForecastPoint>> {
    response
        .list
        .into_iter()
        .map(|entry| into_point(entry, location))
        .collect()
}

// `dt_txt` is taken to already be UTC: it is labelled, not converted.
fn into_point(entry: ForecastEntry, location: &Location) -> Result<ForecastPoint> {
    let timestamp = NaiveDateTime::parse_from_str(&entry.dt_txt, DT_TXT_FORMAT)
        .map_err(|e| {
            WeatherDbError::invalid_response(format!(
                "Invalid forecast timestamp '{}': {e}",
                entry.dt_txt
            ))
        })?
        .and_utc();

    let condition = entry.weather.into_iter().next().ok_or_else(|| {
        WeatherDbError::invalid_response(format!(
            "Forecast entry at {} has no weather condition",
            entry.dt_txt
        ))
    })?;

    Ok(ForecastPoint {
        timestamp,
        temperature: entry.main.temp,
        weather_main: condition.main,
        weather_description: condition.description,
        wind_speed: entry.wind.speed,
        humidity: entry.main.humidity,
        city: location.name.clone(),
        country: location.country.clone(),
    })
}
