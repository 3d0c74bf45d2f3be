#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the air-quality server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the domain records so the API contract can evolve independently.

use air_quality_category_models::Category;
use air_quality_observation_models::{AggregateRecord, MapPoint, ObservationFilter, PolygonRecord};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error body returned alongside non-2xx statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Municipality and category filters, from the query string or the export
/// form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    /// Municipality name, case-insensitive.
    pub municipality: Option<String>,
    /// Category label, case-insensitive.
    pub category: Option<String>,
}

impl From<&FilterParams> for ObservationFilter {
    fn from(params: &FilterParams) -> Self {
        Self::new(params.municipality.as_deref(), params.category.as_deref())
    }
}

/// A sensor marker as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMapPoint {
    /// Municipality.
    pub locality: Option<String>,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Category label of the reading.
    pub category: Category,
    /// Sensor display name.
    pub sensor_name: String,
    /// 24-hour PM2.5 value.
    pub measurement: Option<f64>,
    /// Marker colour.
    pub color: String,
}

impl From<MapPoint> for ApiMapPoint {
    fn from(point: MapPoint) -> Self {
        Self {
            locality: point.locality,
            lat: point.lat,
            lon: point.lon,
            category: point.category,
            sensor_name: point.sensor_name,
            measurement: point.measurement,
            color: point.color,
        }
    }
}

/// A per-municipality aggregate as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAggregate {
    /// Municipality.
    pub locality: String,
    /// Mean 24-hour PM2.5.
    pub mean_value: f64,
    /// Number of contributing sensors.
    pub sensor_count: u64,
    /// Category label of the mean.
    pub category: Category,
}

impl From<AggregateRecord> for ApiAggregate {
    fn from(record: AggregateRecord) -> Self {
        Self {
            locality: record.locality,
            mean_value: record.mean_value,
            sensor_count: record.sensor_count,
            category: record.category,
        }
    }
}

/// A coloured municipality aggregate for polygon display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPolygon {
    /// Municipality.
    pub locality: String,
    /// Mean 24-hour PM2.5.
    pub mean_value: f64,
    /// Number of contributing sensors.
    pub sensor_count: u64,
    /// Category label of the mean.
    pub category: Category,
    /// Fill colour.
    pub color: String,
}

impl From<PolygonRecord> for ApiPolygon {
    fn from(record: PolygonRecord) -> Self {
        Self {
            locality: record.locality,
            mean_value: record.mean_value,
            sensor_count: record.sensor_count,
            category: record.category,
            color: record.color,
        }
    }
}
