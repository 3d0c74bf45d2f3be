//! Per-sensor content blocks.
//!
//! Each reading becomes a short block of labelled lines. The block tint and
//! the sensor name colour are resolved from the rendered category label via
//! [`air_quality_style::label::match_label`], which tries the most specific
//! label first.

use air_quality_category_models::Category;
use air_quality_observation_models::Observation;
use air_quality_style::label::{match_label, name_color};
use air_quality_style::{Rgb, style_for};

use crate::canvas::{Span, spans_width};
use crate::fonts::Font;

/// Body text colour.
pub const TEXT_COLOR: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// Font size of block text.
pub const BLOCK_FONT_SIZE: f32 = 7.5;

/// Distance between baselines inside a block.
pub const BLOCK_LEADING: f32 = 12.0;

/// Space between the tint edge and the text.
pub const BLOCK_PADDING: f32 = 5.0;

/// Shown for coordinates or values that are missing.
const NOT_AVAILABLE: &str = "N/A";

/// One reading laid out as wrapped lines of styled text.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    /// Wrapped lines, top to bottom.
    pub lines: Vec<Vec<Span>>,
    /// Background fill, if the category has one.
    pub tint: Option<Rgb>,
    /// Category resolved from the rendered label.
    pub category: Category,
}

impl ContentBlock {
    /// Builds the block for `observation`, wrapping lines to `max_width`.
    ///
    /// The `MUNICÍPIO` line is left out when the report is already limited
    /// to a single municipality.
    #[must_use]
    pub fn for_observation(observation: &Observation, show_locality: bool, max_width: f32) -> Self {
        let label = observation.category.label();
        let category = match_label(label);
        let name_rgb = Rgb::from_hex(name_color(category)).unwrap_or(TEXT_COLOR);

        let mut paragraphs: Vec<Vec<Span>> = Vec::with_capacity(4);
        paragraphs.push(vec![
            bold("SENSOR: "),
            Span::new(observation.display_name(), Font::Bold, name_rgb),
        ]);
        if show_locality {
            paragraphs.push(vec![
                bold("MUNICÍPIO: "),
                regular(observation.locality.as_deref().unwrap_or(NOT_AVAILABLE)),
            ]);
        }
        paragraphs.push(vec![
            bold("LOCALIZAÇÃO: "),
            regular(&format!(
                "{}, {}",
                format_number(observation.latitude),
                format_number(observation.longitude)
            )),
        ]);
        paragraphs.push(vec![
            bold("REGISTRO: "),
            regular(&format!(
                "Índice de qualidade do ar de {} ug/m³, classificada como ",
                format_number(observation.measurement)
            )),
            bold(label),
            regular(" nas últimas 24 horas."),
        ]);

        let lines = paragraphs
            .iter()
            .flat_map(|p| wrap(p, max_width, BLOCK_FONT_SIZE))
            .collect();

        Self {
            lines,
            tint: style_for(category).tint_rgb(),
            category,
        }
    }

    /// Height of the block including padding.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn height(&self) -> f32 {
        (self.lines.len() as f32).mul_add(BLOCK_LEADING, 2.0 * BLOCK_PADDING)
    }
}

fn bold(text: &str) -> Span {
    Span::new(text, Font::Bold, TEXT_COLOR)
}

fn regular(text: &str) -> Span {
    Span::new(text, Font::Regular, TEXT_COLOR)
}

/// Formats a value the way spreadsheet exports show it: whole numbers keep
/// one decimal place (`10.0`), others print as-is.
#[must_use]
pub fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let text = v.to_string();
            if text.contains('.') {
                text
            } else {
                format!("{text}.0")
            }
        }
        _ => NOT_AVAILABLE.to_owned(),
    }
}

/// Word-wraps a line of spans to `max_width`. Words keep their span's face
/// and colour; a single word wider than the line is left to overflow.
#[must_use]
pub fn wrap(spans: &[Span], max_width: f32, size: f32) -> Vec<Vec<Span>> {
    let mut lines: Vec<Vec<Span>> = Vec::new();
    let mut current: Vec<Span> = Vec::new();

    for span in spans {
        for word in span.text.split_inclusive(' ') {
            let piece = Span::new(word, span.font, span.color);
            let fits = spans_width(&current, size) + piece.font.width(word.trim_end(), size)
                <= max_width;
            if !fits && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            push_merged(&mut current, piece);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn push_merged(line: &mut Vec<Span>, piece: Span) {
    if let Some(last) = line.last_mut()
        && last.font == piece.font
        && last.color == piece.color
    {
        last.text.push_str(&piece.text);
        return;
    }
    line.push(piece);
}

#[cfg(test)]
mod tests {
    use air_quality_style::label::FALLBACK_NAME_COLOR;

    use super::*;

    fn text_of(block: &ContentBlock) -> String {
        block
            .lines
            .iter()
            .map(|line| line.iter().map(|s| s.text.as_str()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn sample() -> Observation {
        Observation::new(Some("Natal"), Some(88.0))
            .with_coordinates(-5.79, -35.21)
            .with_sensor_name("PA-Ponta Negra")
    }

    #[test]
    fn block_lists_sensor_location_and_reading() {
        let block = ContentBlock::for_observation(&sample(), true, 1000.0);
        let text = text_of(&block);
        assert_eq!(
            text,
            "SENSOR: PA-Ponta Negra\n\
             MUNICÍPIO: Natal\n\
             LOCALIZAÇÃO: -5.79, -35.21\n\
             REGISTRO: Índice de qualidade do ar de 88.0 ug/m³, classificada como Muito Ruim nas últimas 24 horas."
        );
    }

    #[test]
    fn locality_line_hidden_when_filtered() {
        let block = ContentBlock::for_observation(&sample(), false, 1000.0);
        assert!(!text_of(&block).contains("MUNICÍPIO"));
        assert_eq!(block.lines.len(), 3);
    }

    #[test]
    fn very_bad_block_gets_its_own_tint_and_name_colour() {
        let block = ContentBlock::for_observation(&sample(), true, 1000.0);
        assert_eq!(block.category, Category::VeryBad);
        assert_eq!(block.tint, Rgb::from_hex("#FFF2EF"));
        assert_eq!(block.lines[0][1].color, Rgb::from_hex("#C62828").unwrap());
    }

    #[test]
    fn unknown_reading_has_no_tint_and_grey_name() {
        let obs = Observation::new(Some("Natal"), None);
        let block = ContentBlock::for_observation(&obs, true, 1000.0);
        assert_eq!(block.tint, None);
        assert_eq!(block.lines[0][1].color, Rgb::from_hex(FALLBACK_NAME_COLOR).unwrap());
        assert!(text_of(&block).contains("N/A, N/A"));
        assert!(text_of(&block).contains("como -"));
    }

    #[test]
    fn narrow_width_wraps_and_keeps_all_words() {
        let wide = ContentBlock::for_observation(&sample(), true, 1000.0);
        let narrow = ContentBlock::for_observation(&sample(), true, 150.0);
        assert!(narrow.lines.len() > wide.lines.len());
        assert!(narrow.height() > wide.height());
        let words = |b: &ContentBlock| {
            text_of(b)
                .split_whitespace()
                .map(str::to_owned)
                .collect::<Vec<_>>()
        };
        assert_eq!(words(&wide), words(&narrow));
        for line in &narrow.lines {
            let trimmed: f32 = spans_width(line, BLOCK_FONT_SIZE)
                - Font::Regular.width(" ", BLOCK_FONT_SIZE) * 2.0;
            assert!(trimmed <= 150.0 || line.len() == 1);
        }
    }

    #[test]
    fn numbers_format_like_spreadsheet() {
        assert_eq!(format_number(Some(10.0)), "10.0");
        assert_eq!(format_number(Some(12.5)), "12.5");
        assert_eq!(format_number(Some(-5.794)), "-5.794");
        assert_eq!(format_number(None), "N/A");
        assert_eq!(format_number(Some(f64::NAN)), "N/A");
    }
}
