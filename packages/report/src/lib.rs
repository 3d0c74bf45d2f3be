#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Paginated PDF report of air-quality readings.
//!
//! [`build`] filters the readings, lays out one styled block per sensor,
//! breaks pages every [`PAGE_CAPACITY`] blocks and writes an A4 PDF with a
//! repeating header and a footer carrying running sensor and page
//! counters. Decorative images are supplied by an [`AssetProvider`]; the
//! builder itself never performs I/O.

pub mod assets;
pub mod canvas;
pub mod content;
pub mod engine;
pub mod fonts;
pub mod pagination;
pub mod template;

use air_quality_aggregate::{aggregate, filter_observations, modal_category, overall};
use air_quality_observation_models::{Observation, ObservationFilter};
use chrono::NaiveDateTime;

pub use assets::{AssetProvider, AssetUrls, NoAssets, PrefetchedAssets};
pub use pagination::{PAGE_CAPACITY, PaginationState};

use crate::assets::DecorativeImages;
use crate::content::{BLOCK_PADDING, ContentBlock};
use crate::engine::RenderedPage;
use crate::pagination::{Page, paginate};
use crate::template::{CONTENT_WIDTH, HeaderInfo, ReportTemplate};

/// Document title written into the PDF metadata.
pub const REPORT_TITLE: &str = "Relatório de Qualidade do Ar";

/// Shown in place of a filter value when no filter is active.
const ALL: &str = "todos";

/// Errors that can occur while building a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// No reading survived the filters.
    #[error("No data for municipality {locality:?} and category {category:?}")]
    NoMatchingData {
        /// Municipality filter in effect.
        locality: Option<String>,
        /// Category filter in effect.
        category: Option<String>,
    },

    /// The PDF document could not be assembled.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Writing the document failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings for one report.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Timestamp printed in the header.
    pub created_at: NaiveDateTime,
    /// Decorative images to request from the [`AssetProvider`].
    pub asset_urls: AssetUrls,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            created_at: chrono::Local::now().naive_local(),
            asset_urls: AssetUrls::default(),
        }
    }
}

/// A report laid out into blocks, ready to paginate and render.
#[derive(Debug, Clone)]
pub struct ReportLayout {
    /// Header repeated on every page.
    pub header: HeaderInfo,
    /// One block per listed reading, in input order.
    pub blocks: Vec<ContentBlock>,
}

impl ReportLayout {
    /// Blocks split into pages.
    #[must_use]
    pub fn pages(&self) -> Vec<Page<'_, ContentBlock>> {
        paginate(&self.blocks, PAGE_CAPACITY)
    }

    /// Draws every page without writing a document.
    #[must_use]
    pub fn compose(&self, images: &DecorativeImages) -> Vec<RenderedPage> {
        let template = ReportTemplate::new(&self.header, images);
        engine::compose(&template, &self.pages())
    }

    /// Renders the PDF bytes.
    ///
    /// # Errors
    ///
    /// * If the PDF document fails to serialize
    pub fn render(&self, images: &DecorativeImages) -> Result<Vec<u8>, ReportError> {
        engine::write_pdf(self.compose(images), images, REPORT_TITLE)
    }
}

/// Filters the readings and lays out the header and sensor blocks.
///
/// # Errors
///
/// * [`ReportError::NoMatchingData`] if no reading passes the filters
pub fn layout(
    observations: &[Observation],
    filter: &ObservationFilter,
    created_at: NaiveDateTime,
) -> Result<ReportLayout, ReportError> {
    let selected = filter_observations(observations, filter);
    if selected.is_empty() {
        return Err(ReportError::NoMatchingData {
            locality: filter.locality.clone(),
            category: filter.category.clone(),
        });
    }

    let quality = filter.category.as_deref().map_or_else(
        || {
            modal_category(selected.iter().copied())
                .map(|c| c.label().to_uppercase())
                .unwrap_or_default()
        },
        str::to_uppercase,
    );

    let header = HeaderInfo {
        locality: filter
            .locality
            .as_deref()
            .unwrap_or(ALL)
            .to_uppercase(),
        sensor_count: selected.len(),
        quality,
        summary: summary_line(observations, filter),
        created_at: created_at.format("%d/%m/%Y às %H:%M:%S").to_string(),
    };

    let show_locality = !filter.has_locality();
    let max_width = 2.0f32.mul_add(-BLOCK_PADDING, CONTENT_WIDTH);
    let blocks = selected
        .iter()
        .map(|o| ContentBlock::for_observation(o, show_locality, max_width))
        .collect();

    Ok(ReportLayout { header, blocks })
}

fn summary_line(observations: &[Observation], filter: &ObservationFilter) -> Option<String> {
    let totals = overall(&aggregate(observations, filter))?;
    let plural = |n: u64, one: &str, many: &str| format!("{n} {}", if n == 1 { one } else { many });
    Some(format!(
        "Média geral de {:.1} ug/m³ ({}) em {}, {}",
        totals.mean_value,
        totals.category.label(),
        plural(totals.locality_count as u64, "município", "municípios"),
        plural(totals.sensor_count, "sensor", "sensores"),
    ))
}

/// Builds the PDF report for the readings that pass `filter`.
///
/// # Errors
///
/// * [`ReportError::NoMatchingData`] if no reading passes the filters
/// * If the PDF document fails to serialize
pub fn build(
    observations: &[Observation],
    filter: &ObservationFilter,
    assets: &dyn AssetProvider,
    options: &ReportOptions,
) -> Result<Vec<u8>, ReportError> {
    let layout = layout(observations, filter, options.created_at)?;
    let images = DecorativeImages::load(&options.asset_urls, assets);

    let bytes = layout.render(&images)?;
    log::info!(
        "Built report for {} sensors on {} pages ({} bytes)",
        layout.blocks.len(),
        layout.blocks.len().div_ceil(PAGE_CAPACITY),
        bytes.len()
    );
    Ok(bytes)
}

/// Download name encoding the active filters, e.g.
/// `relatorio_Natal_todos.pdf`.
#[must_use]
pub fn report_filename(filter: &ObservationFilter) -> String {
    let part = |v: Option<&str>| {
        v.unwrap_or(ALL)
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | '"') { '_' } else { c })
            .collect::<String>()
    };
    format!(
        "relatorio_{}_{}.pdf",
        part(filter.locality.as_deref()),
        part(filter.category.as_deref())
    )
}
