#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Sensor observation, aggregate and map feed record types.
//!
//! An [`Observation`] is one row of the published sensor spreadsheet. Every
//! field except the category may be absent; which views a row takes part
//! in depends on which fields it has (see [`Observation::is_mappable`] and
//! [`Observation::is_aggregatable`]). Nothing here is mutated after
//! construction: each request builds these fresh from a snapshot.

use air_quality_category_models::{Category, classify};
use serde::{Deserialize, Serialize};

/// Placeholder shown when a row has no sensor name.
pub const UNKNOWN_SENSOR_NAME: &str = "Desconhecido";

/// A single sensor reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Municipality the sensor belongs to.
    pub locality: Option<String>,
    /// Sensor latitude.
    pub latitude: Option<f64>,
    /// Sensor longitude.
    pub longitude: Option<f64>,
    /// 24-hour PM2.5 concentration in µg/m³.
    pub measurement: Option<f64>,
    /// Severity band, either taken from the source row or derived from the
    /// measurement.
    pub category: Category,
    /// Sensor display name.
    pub sensor_name: Option<String>,
}

impl Observation {
    /// Creates an observation whose category is derived from the
    /// measurement.
    #[must_use]
    pub fn new(locality: Option<&str>, measurement: Option<f64>) -> Self {
        Self {
            locality: locality.map(str::to_owned),
            latitude: None,
            longitude: None,
            measurement,
            category: classify(measurement),
            sensor_name: None,
        }
    }

    /// Sets the sensor coordinates.
    #[must_use]
    pub const fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Overrides the derived category with a precomputed one.
    #[must_use]
    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Sets the sensor display name.
    #[must_use]
    pub fn with_sensor_name(mut self, name: &str) -> Self {
        self.sensor_name = Some(name.to_owned());
        self
    }

    /// Both coordinates, when present.
    #[must_use]
    pub const fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// Whether this reading can be placed on the map.
    #[must_use]
    pub const fn is_mappable(&self) -> bool {
        self.coordinates().is_some()
    }

    /// Whether this reading can contribute to a per-municipality aggregate.
    #[must_use]
    pub fn is_aggregatable(&self) -> bool {
        self.non_empty_locality().is_some() && self.measurement.is_some()
    }

    /// The locality, treating empty strings as absent.
    #[must_use]
    pub fn non_empty_locality(&self) -> Option<&str> {
        self.locality.as_deref().filter(|l| !l.trim().is_empty())
    }

    /// The sensor name, or [`UNKNOWN_SENSOR_NAME`].
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.sensor_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(UNKNOWN_SENSOR_NAME)
    }
}

/// Mean PM2.5 and sensor count for one municipality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRecord {
    /// Municipality (group key).
    pub locality: String,
    /// Arithmetic mean of the contributing measurements.
    pub mean_value: f64,
    /// Number of contributing readings, always at least 1.
    pub sensor_count: u64,
    /// Band of `mean_value`.
    pub category: Category,
}

/// Optional municipality and category filters, as chosen by the user.
///
/// Both comparisons are case-insensitive. Blank filter values are treated
/// as "no filter" since HTML forms submit empty fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationFilter {
    /// Municipality to keep.
    pub locality: Option<String>,
    /// Category label to keep.
    pub category: Option<String>,
}

impl ObservationFilter {
    /// Builds a filter, discarding blank values.
    #[must_use]
    pub fn new(locality: Option<&str>, category: Option<&str>) -> Self {
        let clean = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };
        Self {
            locality: clean(locality),
            category: clean(category),
        }
    }

    /// A filter that keeps everything.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether a municipality filter is active.
    #[must_use]
    pub const fn has_locality(&self) -> bool {
        self.locality.is_some()
    }

    /// Whether the observation passes the municipality filter.
    #[must_use]
    pub fn matches_locality(&self, observation: &Observation) -> bool {
        let Some(wanted) = &self.locality else {
            return true;
        };
        observation
            .locality
            .as_deref()
            .is_some_and(|l| l.to_lowercase() == wanted.to_lowercase())
    }

    /// Whether a category passes the category filter, compared by label.
    #[must_use]
    pub fn matches_category(&self, category: Category) -> bool {
        self.category
            .as_deref()
            .is_none_or(|wanted| category.label().to_lowercase() == wanted.to_lowercase())
    }
}

/// One unaggregated sensor marker for the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPoint {
    /// Municipality.
    pub locality: Option<String>,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Severity band of the individual reading.
    pub category: Category,
    /// Sensor display name.
    pub sensor_name: String,
    /// 24-hour PM2.5 value, when present.
    pub measurement: Option<f64>,
    /// Marker colour for `category`.
    pub color: String,
}

/// One municipality aggregate with its fill colour, for polygon display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonRecord {
    /// Municipality.
    pub locality: String,
    /// Mean 24-hour PM2.5.
    pub mean_value: f64,
    /// Number of contributing sensors.
    pub sensor_count: u64,
    /// Band of `mean_value`.
    pub category: Category,
    /// Fill colour for `category`.
    pub color: String,
}
