#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Air-quality severity categories and threshold classification.
//!
//! Every reading and every per-municipality aggregate in the system is
//! placed into one of the five ordered [`Category`] bands defined here,
//! based on its 24-hour PM2.5 concentration (µg/m³). The map, the JSON
//! feeds and the PDF report all use this single enumeration.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// Ordered severity band for a PM2.5 concentration.
///
/// The display form is the Portuguese label shown to users on the map and
/// in the report. [`Category::Unknown`] is the sentinel for readings with
/// no usable value and renders as `"-"`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
)]
pub enum Category {
    /// Up to 25 µg/m³.
    #[serde(rename = "Boa")]
    #[strum(serialize = "Boa")]
    Good,
    /// Above 25, up to 50 µg/m³.
    #[serde(rename = "Moderada")]
    #[strum(serialize = "Moderada")]
    Moderate,
    /// Above 50, up to 75 µg/m³.
    #[serde(rename = "Ruim")]
    #[strum(serialize = "Ruim")]
    Bad,
    /// Above 75, up to 125 µg/m³.
    #[serde(rename = "Muito Ruim")]
    #[strum(serialize = "Muito Ruim")]
    VeryBad,
    /// Above 125 µg/m³.
    #[serde(rename = "Péssima")]
    #[strum(serialize = "Péssima")]
    Terrible,
    /// Missing or non-numeric measurement.
    #[serde(rename = "-")]
    #[strum(serialize = "-")]
    Unknown,
}

/// Inclusive upper bounds, evaluated low to high. Anything above the last
/// bound is [`Category::Terrible`].
const THRESHOLDS: &[(f64, Category)] = &[
    (25.0, Category::Good),
    (50.0, Category::Moderate),
    (75.0, Category::Bad),
    (125.0, Category::VeryBad),
];

impl Category {
    /// Returns the user-facing label (`"Boa"`, `"Muito Ruim"`, `"-"`, ...).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Boa",
            Self::Moderate => "Moderada",
            Self::Bad => "Ruim",
            Self::VeryBad => "Muito Ruim",
            Self::Terrible => "Péssima",
            Self::Unknown => "-",
        }
    }

    /// Whether this is one of the five real bands (not the sentinel).
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Looks up a category by its label, ignoring case and surrounding
    /// whitespace. The sentinel `"-"` maps to [`Category::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns [`CategoryParseError`] if the text is not one of the labels.
    pub fn from_label(text: &str) -> Result<Self, CategoryParseError> {
        let wanted = text.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .chain(std::iter::once(Self::Unknown))
            .find(|c| c.label().to_lowercase() == wanted)
            .ok_or_else(|| CategoryParseError {
                text: text.to_owned(),
            })
    }

    /// Returns the five real bands in ascending severity.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Good,
            Self::Moderate,
            Self::Bad,
            Self::VeryBad,
            Self::Terrible,
        ]
    }
}

impl std::str::FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

/// Error returned when text does not name any [`Category`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryParseError {
    /// The text that failed to parse.
    pub text: String,
}

impl std::fmt::Display for CategoryParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unrecognised air quality category '{}'", self.text)
    }
}

impl std::error::Error for CategoryParseError {}

/// Classifies a PM2.5 concentration into its severity band.
///
/// `None` and `NaN` yield [`Category::Unknown`]. Each bound belongs to the
/// lower band, so `classify(Some(25.0))` is [`Category::Good`].
#[must_use]
pub fn classify(value: Option<f64>) -> Category {
    let Some(v) = value.filter(|v| !v.is_nan()) else {
        return Category::Unknown;
    };

    THRESHOLDS
        .iter()
        .find(|(upper, _)| v <= *upper)
        .map_or(Category::Terrible, |(_, category)| *category)
}

/// Classifies a raw textual value, treating anything that does not parse
/// as a number as missing.
#[must_use]
pub fn classify_text(value: &str) -> Category {
    classify(value.trim().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_belong_to_lower_band() {
        assert_eq!(classify(Some(25.0)), Category::Good);
        assert_eq!(classify(Some(50.0)), Category::Moderate);
        assert_eq!(classify(Some(75.0)), Category::Bad);
        assert_eq!(classify(Some(125.0)), Category::VeryBad);
    }

    #[test]
    fn values_just_above_bounds_move_up() {
        assert_eq!(classify(Some(25.01)), Category::Moderate);
        assert_eq!(classify(Some(50.5)), Category::Bad);
        assert_eq!(classify(Some(75.1)), Category::VeryBad);
        assert_eq!(classify(Some(125.000_1)), Category::Terrible);
        assert_eq!(classify(Some(900.0)), Category::Terrible);
    }

    #[test]
    fn low_and_negative_values_are_good() {
        for v in [-10.0, 0.0, 3.2, 24.999] {
            assert_eq!(classify(Some(v)), Category::Good, "{v}");
        }
        assert_eq!(classify(Some(f64::NEG_INFINITY)), Category::Good);
    }

    #[test]
    fn missing_and_nan_are_unknown() {
        assert_eq!(classify(None), Category::Unknown);
        assert_eq!(classify(Some(f64::NAN)), Category::Unknown);
        assert_eq!(classify_text("n/a"), Category::Unknown);
        assert_eq!(classify_text(""), Category::Unknown);
        assert_eq!(classify_text(" 60 "), Category::Bad);
        assert_eq!(Category::Unknown.to_string(), "-");
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!(Category::from_label("muito ruim"), Ok(Category::VeryBad));
        assert_eq!(Category::from_label("PÉSSIMA"), Ok(Category::Terrible));
        assert_eq!(Category::from_label(" Boa "), Ok(Category::Good));
        assert_eq!("-".parse::<Category>(), Ok(Category::Unknown));
        assert!(Category::from_label("excelente").is_err());
    }

    #[test]
    fn display_matches_label() {
        for category in Category::all() {
            assert_eq!(category.to_string(), category.label());
            assert_eq!(category.as_ref(), category.label());
        }
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&Category::VeryBad).unwrap();
        assert_eq!(json, "\"Muito Ruim\"");
        let back: Category = serde_json::from_str("\"Péssima\"").unwrap();
        assert_eq!(back, Category::Terrible);
    }
}
