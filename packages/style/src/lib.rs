#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Category colour and report style resolution.
//!
//! [`style_for`] is the single authority mapping a [`Category`] to the
//! colours used on both output surfaces: map markers and polygons take
//! [`StyleRecord::color`], report content blocks take
//! [`StyleRecord::background_tint`]. Because both read the same record, a
//! category always looks the same on the map and in the PDF.
//!
//! The [`label`] module holds the separate text-based lookup used to colour
//! sensor names in the report.

pub mod color;
pub mod label;

use air_quality_category_models::Category;
use serde::Serialize;

pub use color::Rgb;

/// Display colours for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRecord {
    /// Marker / polygon colour, `#RRGGBB`.
    pub color: &'static str,
    /// Light tint behind report content blocks. `None` means no fill.
    pub background_tint: Option<&'static str>,
}

/// Neutral style for [`Category::Unknown`].
pub const FALLBACK_STYLE: StyleRecord = StyleRecord {
    color: "#CCCCCC",
    background_tint: None,
};

/// Returns the style for a category.
#[must_use]
pub const fn style_for(category: Category) -> StyleRecord {
    match category {
        Category::Good => StyleRecord {
            color: "#009966",
            background_tint: Some("#F2FAF7"),
        },
        Category::Moderate => StyleRecord {
            color: "#DDCA00",
            background_tint: Some("#FFFDED"),
        },
        Category::Bad => StyleRecord {
            color: "#F5BA09",
            background_tint: Some("#FFF6DA"),
        },
        Category::VeryBad => StyleRecord {
            color: "#EE3608",
            background_tint: Some("#FFF2EF"),
        },
        Category::Terrible => StyleRecord {
            color: "#660099",
            background_tint: Some("#F7F2FA"),
        },
        Category::Unknown => FALLBACK_STYLE,
    }
}

impl StyleRecord {
    /// The marker colour parsed for drawing.
    #[must_use]
    pub fn color_rgb(&self) -> Option<Rgb> {
        Rgb::from_hex(self.color)
    }

    /// The tint parsed for drawing, if the style has one.
    #[must_use]
    pub fn tint_rgb(&self) -> Option<Rgb> {
        self.background_tint.and_then(Rgb::from_hex)
    }
}
