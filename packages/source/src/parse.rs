//! CSV rows to [`Observation`]s.

use air_quality_category_models::Category;
use air_quality_observation_models::Observation;

use crate::SourceError;
use crate::config::{ColumnNames, SourceConfig};

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    locality: usize,
    measurement: usize,
    latitude: Option<usize>,
    longitude: Option<usize>,
    category: Option<usize>,
    sensor_name: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord, names: &ColumnNames) -> Result<Self, SourceError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let required = |name: &str| {
            find(name).ok_or_else(|| SourceError::MissingColumn {
                column: name.to_owned(),
            })
        };

        Ok(Self {
            locality: required(&names.locality)?,
            measurement: required(&names.measurement)?,
            latitude: find(&names.latitude),
            longitude: find(&names.longitude),
            category: find(&names.category),
            sensor_name: find(&names.sensor_name),
        })
    }
}

/// Parses a number, accepting a comma as the decimal separator. Blank or
/// non-finite values are missing.
#[must_use]
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let normalized = if text.contains(',') && !text.contains('.') {
        text.replace(',', ".")
    } else {
        text.to_owned()
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses the CSV export into observations, in row order.
///
/// Cells are trimmed and blank cells are missing. The category comes from
/// the label column when it holds a known label, otherwise it is derived
/// from the measurement. Rows that cannot be decoded are skipped.
///
/// # Errors
///
/// * If the header row cannot be read
/// * If the municipality or measurement column is absent
/// * If the configured delimiter is invalid
pub fn parse_observations(bytes: &[u8], config: &SourceConfig) -> Result<Vec<Observation>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter_byte()?)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let index = ColumnIndex::resolve(&headers, &config.columns)?;

    let mut observations = Vec::new();
    let mut skipped = 0_usize;

    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::debug!("Skipping unreadable row {}: {e}", row + 2);
                skipped += 1;
                continue;
            }
        };
        observations.push(observation_from(&record, index));
    }

    let incomplete = observations.iter().filter(|o| !o.is_aggregatable()).count();
    log::info!(
        "Parsed {} observations ({incomplete} without municipality or value, {skipped} unreadable)",
        observations.len()
    );
    Ok(observations)
}

fn observation_from(record: &csv::StringRecord, index: ColumnIndex) -> Observation {
    let cell = |i: Option<usize>| {
        i.and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let measurement = cell(Some(index.measurement)).and_then(parse_number);
    let mut observation = Observation::new(cell(Some(index.locality)), measurement);

    if let Some(category) = cell(index.category).and_then(|l| Category::from_label(l).ok()) {
        observation = observation.with_category(category);
    }
    observation.latitude = cell(index.latitude).and_then(parse_number);
    observation.longitude = cell(index.longitude).and_then(parse_number);
    observation.sensor_name = cell(index.sensor_name).map(str::to_owned);

    observation
}
