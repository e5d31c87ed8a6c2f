//! Location Resolution Module
//!
//! Turns a free-text place name into a [`Location`] through the provider's
//! geocoding endpoint.

use crate::api::OpenWeatherClient;
use crate::models::Location;
use crate::{Result, WeatherDbError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Resolves place names to coordinates.
///
/// Implementations return the provider's first candidate as-is: relevance
/// ordering is trusted and no disambiguation is attempted. A name with no
/// candidates yields [`WeatherDbError::LocationNotFound`].
#[async_trait]
pub trait GeoResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<Location>;
}

#[async_trait]
impl<T: GeoResolver + ?Sized> GeoResolver for Arc<T> {
    async fn resolve(&self, name: &str) -> Result<Location> {
        (**self).resolve(name).await
    }
}

#[async_trait]
impl GeoResolver for OpenWeatherClient {
    async fn resolve(&self, name: &str) -> Result<Location> {
        debug!("Geocoding location name: {}", name);

        let geocoding = self
            .geocode(name)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| WeatherDbError::location_not_found(name))?;

        let location = Location::from(geocoding);
        debug!(
            "Resolved '{}' to {} ({})",
            name,
            location.name,
            location.format_coordinates()
        );

        Ok(location)
    }
}
