//! Batch update of a dataset from a list of place names.
//!
//! Each name is resolved, fetched and merged in input order, one at a time. A
//! name that fails to resolve or fetch is logged, recorded in the
//! [`UpdateReport`] and skipped; it never aborts the batch.

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::dataset::{Dataset, merge};
use crate::location_resolver::GeoResolver;
use crate::models::{Location, Units};
use crate::weather::ForecastFetcher;
use crate::WeatherDbError;

/// Stage at which a location dropped out of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Resolution,
    Fetch,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Resolution => f.write_str("resolution"),
            FailureKind::Fetch => f.write_str("fetch"),
        }
    }
}

/// A location that contributed nothing to the batch
#[derive(Debug, Error)]
#[error("{kind} failed for '{query}': {error}")]
pub struct LocationFailure {
    /// Name as it was requested
    pub query: String,
    pub kind: FailureKind,
    #[source]
    pub error: WeatherDbError,
}

/// Outcome of one batch
#[derive(Debug)]
pub struct UpdateReport {
    pub dataset: Dataset,
    /// Locations whose forecasts were merged, in processing order
    pub updated: Vec<Location>,
    pub failures: Vec<LocationFailure>,
}

impl UpdateReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives resolve → fetch → merge for a batch of place names
pub struct WeatherUpdater<G, F> {
    resolver: G,
    fetcher: F,
    units: Units,
}

impl<G: GeoResolver, F: ForecastFetcher> WeatherUpdater<G, F> {
    #[must_use]
    pub fn new(resolver: G, fetcher: F) -> Self {
        Self {
            resolver,
            fetcher,
            units: Units::default(),
        }
    }

    #[must_use]
    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    /// Run a batch and return only the resulting dataset.
    ///
    /// With no `current` dataset the batch starts from an empty one.
    pub async fn update<S: AsRef<str>>(&self, locations: &[S], current: Option<Dataset>) -> Dataset {
        self.update_with_report(locations, current).await.dataset
    }

    /// Run a batch and report which locations succeeded and which failed
    #[instrument(skip_all, fields(locations = locations.len(), units = %self.units))]
    pub async fn update_with_report<S: AsRef<str>>(
        &self,
        locations: &[S],
        current: Option<Dataset>,
    ) -> UpdateReport {
        let mut dataset = current.unwrap_or_default();
        let mut updated = Vec::new();
        let mut failures = Vec::new();

        for query in locations {
            let query = query.as_ref();

            let location = match self.resolver.resolve(query).await {
                Ok(location) => location,
                Err(error) => {
                    warn!(location = query, "Skipping location, resolution failed: {}", error);
                    failures.push(LocationFailure {
                        query: query.to_string(),
                        kind: FailureKind::Resolution,
                        error,
                    });
                    continue;
                }
            };

            let points = match self.fetcher.fetch(&location, self.units).await {
                Ok(points) => points,
                Err(error) => {
                    warn!(location = query, "Skipping location, forecast fetch failed: {}", error);
                    failures.push(LocationFailure {
                        query: query.to_string(),
                        kind: FailureKind::Fetch,
                        error,
                    });
                    continue;
                }
            };

            let before = dataset.len();
            let fetched = points.len();
            dataset = merge(dataset, points);
            info!(
                location = %location,
                fetched,
                added = dataset.len() - before,
                "Merged forecast"
            );
            updated.push(location);
        }

        let dataset = dataset.normalized();

        if let Some(latest) = dataset.latest_timestamp() {
            info!(
                points = dataset.len(),
                latest = %latest,
                "Weather database updated at {} UTC. Including updates till {} UTC",
                Utc::now().format("%Y-%m-%d %H:%M:%S"),
                latest.format("%Y-%m-%d %H:%M:%S")
            );
        }

        UpdateReport {
            dataset,
            updated,
            failures,
        }
    }
}
