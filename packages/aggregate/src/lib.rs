#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Per-municipality aggregation of air-quality readings.
//!
//! The two filters of an [`ObservationFilter`] act at different stages:
//! the municipality filter selects which *individual readings* are rolled
//! up, while the category filter is checked against each *aggregate's*
//! derived category after grouping. [`filter_observations`] applies the
//! same two filters to individual readings for the unaggregated views.
//!
//! Everything here is a pure function of its input snapshot. Group order
//! is the order in which each municipality is first seen, so repeated calls
//! on the same input always return the same sequence.

pub mod feed;

use std::collections::BTreeMap;

use air_quality_category_models::{Category, classify};
use air_quality_observation_models::{AggregateRecord, Observation, ObservationFilter};

/// Groups readings by municipality and classifies each group's mean.
///
/// Readings without a municipality or measurement are skipped. Returns an
/// empty vector when nothing survives filtering; a record never has a
/// `sensor_count` of zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(observations: &[Observation], filter: &ObservationFilter) -> Vec<AggregateRecord> {
    let mut groups: Vec<(&str, f64, u64)> = Vec::new();
    let mut index: BTreeMap<&str, usize> = BTreeMap::new();
    let mut skipped = 0_usize;

    for observation in observations.iter().filter(|o| filter.matches_locality(o)) {
        let (Some(locality), Some(value)) = (
            observation.non_empty_locality(),
            observation.measurement.filter(|v| !v.is_nan()),
        ) else {
            skipped += 1;
            continue;
        };

        let slot = *index.entry(locality).or_insert_with(|| {
            groups.push((locality, 0.0, 0));
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.1 += value;
        group.2 += 1;
    }

    if skipped > 0 {
        log::debug!("Skipped {skipped} readings without municipality or measurement");
    }

    groups
        .into_iter()
        .map(|(locality, sum, count)| {
            let mean_value = sum / count as f64;
            AggregateRecord {
                locality: locality.to_owned(),
                mean_value,
                sensor_count: count,
                category: classify(Some(mean_value)),
            }
        })
        .filter(|record| filter.matches_category(record.category))
        .collect()
}

/// Applies both filters to individual readings, in input order.
///
/// Unlike [`aggregate`], the category filter here is checked against each
/// reading's own category.
#[must_use]
pub fn filter_observations<'a>(
    observations: &'a [Observation],
    filter: &ObservationFilter,
) -> Vec<&'a Observation> {
    observations
        .iter()
        .filter(|o| filter.matches_locality(o))
        .filter(|o| filter.matches_category(o.category))
        .collect()
}

/// The most frequent category among the given readings.
///
/// Ties go to the more severe band, and real bands win over
/// [`Category::Unknown`]. Returns `None` for an empty slice.
#[must_use]
pub fn modal_category<'a>(observations: impl IntoIterator<Item = &'a Observation>) -> Option<Category> {
    let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
    for observation in observations {
        *counts.entry(observation.category).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|(category, count)| (*count, category.is_known(), *category))
        .map(|(category, _)| category)
}

/// Sorted, de-duplicated list of non-empty municipality names.
#[must_use]
pub fn municipalities(observations: &[Observation]) -> Vec<String> {
    let mut names: Vec<String> = observations
        .iter()
        .filter_map(Observation::non_empty_locality)
        .map(str::to_owned)
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Totals across a set of aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct Overall {
    /// Number of municipalities.
    pub locality_count: usize,
    /// Sensors across all municipalities.
    pub sensor_count: u64,
    /// Sensor-weighted mean, i.e. the mean of every contributing reading.
    pub mean_value: f64,
    /// Band of `mean_value`.
    pub category: Category,
}

/// Combines aggregates into one overall figure. `None` when empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn overall(records: &[AggregateRecord]) -> Option<Overall> {
    let sensor_count: u64 = records.iter().map(|r| r.sensor_count).sum();
    if sensor_count == 0 {
        return None;
    }
    let weighted: f64 = records
        .iter()
        .map(|r| r.mean_value * r.sensor_count as f64)
        .sum();
    let mean_value = weighted / sensor_count as f64;

    Some(Overall {
        locality_count: records.len(),
        sensor_count,
        mean_value,
        category: classify(Some(mean_value)),
    })
}
