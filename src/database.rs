//! Caller-owned weather database handle

use chrono::{DateTime, Utc};

use crate::dataset::Dataset;
use crate::location_resolver::GeoResolver;
use crate::update::{LocationFailure, WeatherUpdater};
use crate::weather::ForecastFetcher;

/// Holds the current dataset between batch updates
#[derive(Debug, Clone, Default)]
pub struct WeatherDb {
    dataset: Dataset,
    last_updated: Option<DateTime<Utc>>,
}

impl WeatherDb {
    /// Empty database
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously collected points
    #[must_use]
    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            dataset,
            last_updated: None,
        }
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[must_use]
    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    /// Completion time of the last refresh, if any ran
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Run one batch over `locations` and keep its result.
    ///
    /// Returns the locations that contributed nothing.
    pub async fn refresh<G, F, S>(
        &mut self,
        updater: &WeatherUpdater<G, F>,
        locations: &[S],
    ) -> Vec<LocationFailure>
    where
        G: GeoResolver,
        F: ForecastFetcher,
        S: AsRef<str>,
    {
        let current = std::mem::take(&mut self.dataset);
        let report = updater.update_with_report(locations, Some(current)).await;
        self.dataset = report.dataset;
        self.last_updated = Some(Utc::now());
        report.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ForecastPoint, Location, Units};
    use crate::{Result, WeatherDbError};
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct FixedResolver;

    #[async_trait]
    impl GeoResolver for FixedResolver {
        async fn resolve(&self, name: &str) -> Result<Location> {
            match name {
                "Tokyo" => Ok(Location::new("Tokyo", "JP", 35.68, 139.69)),
                _ => Err(WeatherDbError::location_not_found(name)),
            }
        }
    }

    /// Returns one slot whose temperature is the request count so far
    struct CountingFetcher(std::sync::atomic::AtomicU32);

    #[async_trait]
    impl ForecastFetcher for CountingFetcher {
        async fn fetch(&self, location: &Location, _units: Units) -> Result<Vec<ForecastPoint>> {
            let n = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
            Ok(vec![ForecastPoint {
                timestamp: Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap(),
                temperature: f64::from(n),
                weather_main: "Clear".to_string(),
                weather_description: "clear sky".to_string(),
                wind_speed: 1.0,
                humidity: 70.0,
                city: location.name.clone(),
                country: location.country.clone(),
            }])
        }
    }

    #[tokio::test]
    async fn test_refresh_accumulates_across_batches() {
        let updater = WeatherUpdater::new(FixedResolver, CountingFetcher(0.into()));
        let mut db = WeatherDb::new();
        assert!(db.last_updated().is_none());

        let failures = db.refresh(&updater, &["Tokyo", "Atlantis"]).await;
        assert_eq!(failures.len(), 1);
        assert_eq!(db.dataset().len(), 1);
        assert!(db.last_updated().is_some());

        let failures = db.refresh(&updater, &["Tokyo"]).await;
        assert!(failures.is_empty());
        assert_eq!(db.dataset().len(), 1);
        assert_eq!(db.dataset().points()[0].temperature, 2.0);
    }

    #[test]
    fn test_with_dataset_keeps_points() {
        let dataset = Dataset::from_points(Vec::new());
        let db = WeatherDb::with_dataset(dataset.clone());
        assert_eq!(db.into_dataset(), dataset);
    }
}
