//! Text-based category lookup for sensor name colouring.
//!
//! The report colours each sensor name by searching the rendered category
//! label text for a known label. Some labels contain others (`"muito ruim"`
//! contains `"ruim"`), so candidates are always tried longest first; a
//! shorter label can never shadow a more specific one.

use std::cmp::Reverse;

use air_quality_category_models::Category;

use crate::Rgb;

/// Colour for sensor names whose label is not recognised.
pub const FALLBACK_NAME_COLOR: &str = "#767575";

/// Known labels, lower-cased, ordered longest first.
#[must_use]
pub fn labels_by_specificity() -> Vec<(String, Category)> {
    let mut labels: Vec<(String, Category)> = Category::all()
        .iter()
        .map(|c| (c.label().to_lowercase(), *c))
        .collect();
    labels.sort_by_key(|(label, _)| Reverse(label.chars().count()));
    labels
}

/// Finds the most specific category label contained in `text`,
/// case-insensitively. Returns [`Category::Unknown`] if none matches.
#[must_use]
pub fn match_label(text: &str) -> Category {
    let haystack = text.to_lowercase();
    labels_by_specificity()
        .into_iter()
        .find(|(label, _)| haystack.contains(label.as_str()))
        .map_or_else(
            || {
                log::trace!("No category label found in '{text}'");
                Category::Unknown
            },
            |(_, category)| category,
        )
}

/// Colour of a sensor name for a given category.
#[must_use]
pub const fn name_color(category: Category) -> &'static str {
    match category {
        Category::Good => "#0F9D58",
        Category::Moderate => "#DDCA00",
        Category::Bad => "#F5BA09",
        Category::VeryBad => "#C62828",
        Category::Terrible => "#6A1B9A",
        Category::Unknown => FALLBACK_NAME_COLOR,
    }
}

/// Resolves the sensor name colour from rendered label text.
#[must_use]
pub fn name_color_for_text(text: &str) -> Rgb {
    let hex = name_color(match_label(text));
    Rgb::from_hex(hex).unwrap_or(Rgb {
        r: 0x76,
        g: 0x75,
        b: 0x75,
    })
}
