//! The air-quality report page: header, sensor blocks and footer.

use air_quality_style::Rgb;

use crate::assets::{AssetKind, DecorativeImages};
use crate::canvas::{Canvas, Span};
use crate::content::{BLOCK_FONT_SIZE, BLOCK_LEADING, BLOCK_PADDING, ContentBlock, TEXT_COLOR};
use crate::engine::{PAGE_HEIGHT, PAGE_WIDTH, PageTemplate};
use crate::fonts::Font;
use crate::pagination::{Page, PaginationState};

/// Left and right page margin.
pub const MARGIN: f32 = 40.0;

/// Width available to sensor blocks.
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN - 30.0;

/// Vertical gap between sensor blocks.
const BLOCK_GAP: f32 = 10.0;

const TOP_BANNER: (f32, f32) = (600.0, 5.0);
const HEADER_TOP: f32 = PAGE_HEIGHT - 55.0;
const ICON_SIZE: f32 = 35.0;
const LEGEND: (f32, f32) = (282.0, 4.0);
const CONTENT_TOP: f32 = HEADER_TOP - 100.0;

const INFO_BOX_X: f32 = PAGE_WIDTH - 210.0;
const INFO_BOX_TOP: f32 = PAGE_HEIGHT - 28.0;
const INFO_BOX_WIDTH: f32 = 175.0;
const INFO_BOX_HEIGHT: f32 = 57.0;
const INFO_FONT_SIZE: f32 = 8.0;
const INFO_PADDING: f32 = 8.0;

const INFO_TEXT: Rgb = Rgb { r: 0x33, g: 0x33, b: 0x33 };
const NOTE_TEXT: Rgb = Rgb { r: 0x3C, g: 0x3C, b: 0x3C };
const BORDER: Rgb = Rgb { r: 0xD8, g: 0xD8, b: 0xD8 };
const COUNTER_TEXT: Rgb = Rgb { r: 0x66, g: 0x66, b: 0x66 };

const COUNTER_FONT_SIZE: f32 = 7.0;
const COUNTER_BASELINE: f32 = 30.0;

/// Values shown in the header of every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    /// Municipality shown in the info box, upper-cased, or `TODOS`.
    pub locality: String,
    /// Number of sensors listed in the report.
    pub sensor_count: usize,
    /// Category shown in the info box, upper-cased.
    pub quality: String,
    /// One-line aggregate summary, when any aggregate exists.
    pub summary: Option<String>,
    /// Creation timestamp, already formatted.
    pub created_at: String,
}

/// Draws air-quality report pages.
#[derive(Debug)]
pub struct ReportTemplate<'a> {
    header: &'a HeaderInfo,
    images: &'a DecorativeImages,
}

impl<'a> ReportTemplate<'a> {
    /// Creates a template for one document.
    #[must_use]
    pub const fn new(header: &'a HeaderInfo, images: &'a DecorativeImages) -> Self {
        Self { header, images }
    }

    fn draw_header(&self, canvas: &mut Canvas) {
        if self.images.get(AssetKind::TopBanner).is_some() {
            let (w, h) = TOP_BANNER;
            canvas.image(
                AssetKind::TopBanner.resource_name(),
                (PAGE_WIDTH - w) / 2.0,
                PAGE_HEIGHT - h - 2.0,
                w,
                h,
            );
        }

        let mut title_x = MARGIN;
        if self.images.get(AssetKind::TitleIcon).is_some() {
            canvas.image(
                AssetKind::TitleIcon.resource_name(),
                MARGIN,
                HEADER_TOP - ICON_SIZE,
                ICON_SIZE,
                ICON_SIZE,
            );
            title_x += ICON_SIZE + 10.0;
        }
        canvas.text(
            title_x,
            HEADER_TOP - 12.0,
            12.0,
            &Span::new("RELATÓRIO DE", Font::Regular, TEXT_COLOR),
        );
        canvas.text(
            title_x,
            HEADER_TOP - 32.0,
            18.0,
            &Span::new("Qualidade do ar", Font::Bold, TEXT_COLOR),
        );

        if self.images.get(AssetKind::Legend).is_some() {
            let (w, h) = LEGEND;
            canvas.image(
                AssetKind::Legend.resource_name(),
                MARGIN,
                HEADER_TOP - ICON_SIZE - 12.0 - h,
                w,
                h,
            );
        }

        if let Some(summary) = &self.header.summary {
            canvas.text(
                MARGIN,
                HEADER_TOP - ICON_SIZE - 30.0,
                7.0,
                &Span::new(summary.as_str(), Font::Regular, NOTE_TEXT),
            );
        }

        self.draw_info_box(canvas);
    }

    fn draw_info_box(&self, canvas: &mut Canvas) {
        let sensor_count = self.header.sensor_count.to_string();
        let rows = [
            ("Município:", self.header.locality.as_str(), Font::Bold),
            ("Quantidade de Sensores:", sensor_count.as_str(), Font::Regular),
            ("Qualidade do Ar:", self.header.quality.as_str(), Font::Regular),
        ];

        let left = INFO_BOX_X + INFO_PADDING;
        let right = INFO_BOX_X + INFO_BOX_WIDTH - INFO_PADDING;
        let mut baseline = INFO_BOX_TOP - 16.0;
        for (label, value, value_font) in rows {
            canvas.text(
                left,
                baseline,
                INFO_FONT_SIZE,
                &Span::new(label, Font::Regular, INFO_TEXT),
            );
            canvas.spans_right(
                right,
                baseline,
                INFO_FONT_SIZE,
                &[Span::new(value, value_font, INFO_TEXT)],
            );
            baseline -= 14.0;
        }

        canvas.text(
            INFO_BOX_X + 60.0,
            INFO_BOX_TOP - INFO_BOX_HEIGHT - 12.0,
            6.0,
            &Span::new(
                format!("| Criado em {}", self.header.created_at),
                Font::Regular,
                NOTE_TEXT,
            ),
        );
    }
}

/// Draws one sensor block with its top edge at `top` and returns its
/// height.
fn draw_block(canvas: &mut Canvas, block: &ContentBlock, top: f32) -> f32 {
    let height = block.height();
    if let Some(tint) = block.tint {
        canvas.fill_rect(MARGIN, top - height, CONTENT_WIDTH, height, tint);
    }
    let mut baseline = top - BLOCK_PADDING - BLOCK_FONT_SIZE;
    for line in &block.lines {
        canvas.spans(MARGIN + BLOCK_PADDING, baseline, BLOCK_FONT_SIZE, line);
        baseline -= BLOCK_LEADING;
    }
    height
}

/// The footer counter as styled spans; the numbers are bold.
#[must_use]
pub fn counter_spans(state: &PaginationState) -> Vec<Span> {
    vec![
        Span::new(state.cumulative_rendered.to_string(), Font::Bold, COUNTER_TEXT),
        Span::new(" de ", Font::Regular, COUNTER_TEXT),
        Span::new(state.total_items.to_string(), Font::Bold, COUNTER_TEXT),
        Span::new(" sensores | ", Font::Regular, COUNTER_TEXT),
        Span::new(format!("Página {}", state.page_number), Font::Regular, COUNTER_TEXT),
    ]
}

impl PageTemplate<ContentBlock> for ReportTemplate<'_> {
    fn draw_page(&self, canvas: &mut Canvas, page: &Page<'_, ContentBlock>) {
        self.draw_header(canvas);

        let mut top = CONTENT_TOP;
        for block in page.items {
            top -= draw_block(canvas, block, top) + BLOCK_GAP;
        }
    }

    fn draw_footer(&self, canvas: &mut Canvas, state: &PaginationState) {
        if let Some(banner) = self.images.get(AssetKind::FooterBanner) {
            let ratio = banner.aspect_ratio();
            let mut height = PAGE_HEIGHT / 2.0;
            let mut width = ratio * height;
            if width > PAGE_WIDTH {
                width = PAGE_WIDTH;
                height = width / ratio;
            }
            canvas.image(
                AssetKind::FooterBanner.resource_name(),
                (PAGE_WIDTH - width) / 2.0,
                0.0,
                width,
                height,
            );
        }

        canvas.stroke_round_rect(
            INFO_BOX_X,
            INFO_BOX_TOP - INFO_BOX_HEIGHT,
            INFO_BOX_WIDTH,
            INFO_BOX_HEIGHT,
            4.0,
            0.4,
            BORDER,
        );

        canvas.spans_right(
            PAGE_WIDTH - MARGIN,
            COUNTER_BASELINE,
            COUNTER_FONT_SIZE,
            &counter_spans(state),
        );
    }
}

#[cfg(test)]
mod tests {
    use air_quality_observation_models::Observation;

    use super::*;
    use crate::canvas::shown_text;
    use crate::fonts::encode;
    use crate::pagination::{PAGE_CAPACITY, paginate};

    fn header() -> HeaderInfo {
        HeaderInfo {
            locality: "NATAL".to_owned(),
            sensor_count: 9,
            quality: "MODERADA".to_owned(),
            summary: None,
            created_at: "01/02/2026 às 10:00:00".to_owned(),
        }
    }

    fn blocks(n: usize) -> Vec<ContentBlock> {
        (0..n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let value = (i as f64).mul_add(10.0, 20.0);
                let obs = Observation::new(Some("Natal"), Some(value)).with_coordinates(-5.8, -35.2);
                ContentBlock::for_observation(&obs, false, CONTENT_WIDTH - 2.0 * BLOCK_PADDING)
            })
            .collect()
    }

    fn contains(haystack: &[u8], needle: &str) -> bool {
        let needle = encode(needle);
        haystack.windows(needle.len()).any(|w| w == needle.as_slice())
    }

    #[test]
    fn counter_spans_read_as_footer_text() {
        let state = PaginationState::for_page(2, 15, PAGE_CAPACITY);
        let text: String = counter_spans(&state).iter().map(|s| s.text.as_str()).collect();
        assert_eq!(text, state.footer_text());
    }

    #[test]
    fn every_page_repeats_the_header() {
        let header = header();
        let images = DecorativeImages::default();
        let template = ReportTemplate::new(&header, &images);
        let items = blocks(9);

        for page in paginate(&items, PAGE_CAPACITY) {
            let mut canvas = Canvas::new();
            template.draw_page(&mut canvas, &page);
            let text = shown_text(canvas.operations());
            assert!(contains(&text, "RELATÓRIO DE"));
            assert!(contains(&text, "Quantidade de Sensores:"));
            assert!(contains(&text, "NATAL"));
            assert!(contains(&text, "| Criado em 01/02/2026 às 10:00:00"));
            assert_eq!(
                canvas
                    .operations()
                    .iter()
                    .filter(|o| o.operator == "Tj")
                    .filter(|o| matches!(&o.operands[0], lopdf::Object::String(s, _) if s == b"SENSOR: "))
                    .count(),
                page.items.len()
            );
        }
    }

    #[test]
    fn a_full_page_stays_above_the_counter() {
        let items = blocks(PAGE_CAPACITY);
        let used: f32 = items.iter().map(|b| b.height() + BLOCK_GAP).sum();
        assert!(CONTENT_TOP - used > COUNTER_BASELINE + 20.0);
    }

    #[test]
    fn footer_without_banner_draws_border_and_counter() {
        let header = header();
        let images = DecorativeImages::default();
        let template = ReportTemplate::new(&header, &images);
        let mut canvas = Canvas::new();
        template.draw_footer(&mut canvas, &PaginationState::for_page(1, 15, PAGE_CAPACITY));

        let ops = canvas.operations();
        assert!(ops.iter().all(|o| o.operator != "Do"));
        assert!(ops.iter().any(|o| o.operator == "S"));
        assert_eq!(
            shown_text(ops),
            encode("7 de 15 sensores | Página 1")
        );
    }
}
