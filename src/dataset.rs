//! The forecast dataset and its merge routine.
//!
//! A [`Dataset`] holds at most one [`ForecastPoint`] per `(timestamp, city, country)`
//! and keeps its points sorted ascending by `(timestamp, city)`. Every way of
//! building one goes through [`merge`], so those two properties hold for any value
//! of the type.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ForecastPoint, Location};

/// Deduplicated, time-ordered collection of forecast points
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ForecastPoint>", into = "Vec<ForecastPoint>")]
pub struct Dataset {
    points: Vec<ForecastPoint>,
}

/// Fold `incoming` into `current`.
///
/// When both sides hold a point for the same `(timestamp, city, country)`, the one
/// appearing last in `current ++ incoming` wins and keeps that position. The result
/// is then stable-sorted by `(timestamp, city)`, so points of same-named cities in
/// different countries keep their relative order.
#[must_use]
pub fn merge(current: Dataset, incoming: Vec<ForecastPoint>) -> Dataset {
    let combined: Vec<ForecastPoint> = current.points.into_iter().chain(incoming).collect();

    // Walking backwards lets the first sighting of a key be its last write.
    let mut keep = vec![false; combined.len()];
    let mut seen = HashSet::with_capacity(combined.len());
    for (index, point) in combined.iter().enumerate().rev() {
        keep[index] = seen.insert(point.key());
    }

    let mut points: Vec<ForecastPoint> = combined
        .into_iter()
        .zip(keep)
        .filter_map(|(point, kept)| kept.then_some(point))
        .collect();

    points.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.city.cmp(&b.city))
    });

    Dataset { points }
}

impl Dataset {
    /// Empty dataset
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from arbitrary points, dropping duplicates and sorting
    #[must_use]
    pub fn from_points(points: Vec<ForecastPoint>) -> Self {
        merge(Self::new(), points)
    }

    /// Re-apply deduplication and ordering
    #[must_use]
    pub fn normalized(self) -> Self {
        merge(self, Vec::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ForecastPoint> {
        self.points.iter()
    }

    #[must_use]
    pub fn into_points(self) -> Vec<ForecastPoint> {
        self.points
    }

    /// Most recent forecast slot present
    #[must_use]
    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.points.last().map(|point| point.timestamp)
    }

    /// Distinct `(city, country)` pairs in order of first appearance
    #[must_use]
    pub fn cities(&self) -> Vec<(&str, &str)> {
        let mut seen = HashSet::new();
        self.points
            .iter()
            .map(|point| (point.city.as_str(), point.country.as_str()))
            .filter(|pair| seen.insert(*pair))
            .collect()
    }

    /// All points belonging to a location, in dataset order
    #[must_use]
    pub fn for_city(&self, location: &Location) -> Vec<&ForecastPoint> {
        self.points.iter().filter(|point| point.is_for(location)).collect()
    }
}

impl From<Vec<ForecastPoint>> for Dataset {
    fn from(points: Vec<ForecastPoint>) -> Self {
        Self::from_points(points)
    }
}

impl From<Dataset> for Vec<ForecastPoint> {
    fn from(dataset: Dataset) -> Self {
        dataset.points
    }
}

impl IntoIterator for Dataset {
    type Item = ForecastPoint;
    type IntoIter = std::vec::IntoIter<ForecastPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a ForecastPoint;
    type IntoIter = std::slice::Iter<'a, ForecastPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
