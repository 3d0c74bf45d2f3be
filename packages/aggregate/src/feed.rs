//! Map feeds: unaggregated sensor markers and coloured municipality
//! aggregates.
//!
//! Colours come from [`air_quality_style::style_for`], the same lookup the
//! report uses for its block tints.

use air_quality_observation_models::{
    AggregateRecord, MapPoint, Observation, ObservationFilter, PolygonRecord,
};
use air_quality_style::style_for;

use crate::{aggregate, filter_observations};

/// Sensor markers passing both filters. Readings without both coordinates
/// are left out.
#[must_use]
pub fn map_points(observations: &[Observation], filter: &ObservationFilter) -> Vec<MapPoint> {
    filter_observations(observations, filter)
        .into_iter()
        .filter_map(|o| {
            let (lat, lon) = o.coordinates()?;
            Some(MapPoint {
                locality: o.locality.clone(),
                lat,
                lon,
                category: o.category,
                sensor_name: o.display_name().to_owned(),
                measurement: o.measurement,
                color: style_for(o.category).color.to_owned(),
            })
        })
        .collect()
}

/// Attaches the category colour to each aggregate.
#[must_use]
pub fn colored(records: Vec<AggregateRecord>) -> Vec<PolygonRecord> {
    records
        .into_iter()
        .map(|r| PolygonRecord {
            color: style_for(r.category).color.to_owned(),
            locality: r.locality,
            mean_value: r.mean_value,
            sensor_count: r.sensor_count,
            category: r.category,
        })
        .collect()
}

/// Aggregates every municipality, unfiltered, with fill colours.
#[must_use]
pub fn polygons(observations: &[Observation]) -> Vec<PolygonRecord> {
    colored(aggregate(observations, &ObservationFilter::none()))
}
