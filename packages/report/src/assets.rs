//! Decorative images (banners, title icon, legend).
//!
//! The report never performs I/O itself: images arrive through an
//! [`AssetProvider`]. A missing or undecodable image is logged and left
//! out, and the layout carries on without it.

use std::collections::BTreeMap;

use lopdf::{Object, Stream};
use serde::{Deserialize, Serialize};

/// Supplies raw image bytes by URL.
pub trait AssetProvider {
    /// Returns the image bytes, or `None` if they are unavailable.
    fn fetch_or_none(&self, url: &str) -> Option<Vec<u8>>;
}

/// Provider with no images at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl AssetProvider for NoAssets {
    fn fetch_or_none(&self, _url: &str) -> Option<Vec<u8>> {
        None
    }
}

/// Images fetched ahead of time, keyed by URL.
#[derive(Debug, Clone, Default)]
pub struct PrefetchedAssets {
    assets: BTreeMap<String, Vec<u8>>,
}

impl PrefetchedAssets {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the bytes for `url`.
    pub fn insert(&mut self, url: &str, bytes: Vec<u8>) {
        self.assets.insert(url.to_owned(), bytes);
    }

    /// Number of stored images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether no images are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetProvider for PrefetchedAssets {
    fn fetch_or_none(&self, url: &str) -> Option<Vec<u8>> {
        self.assets.get(url).cloned()
    }
}

/// Where each decorative image lives. Any of them may be left unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUrls {
    /// Thin coloured strip across the top of every page.
    #[serde(default)]
    pub top_banner: Option<String>,
    /// Icon beside the report title.
    #[serde(default)]
    pub title_icon: Option<String>,
    /// Colour scale legend under the title.
    #[serde(default)]
    pub legend: Option<String>,
    /// Artwork filling the lower half of every page.
    #[serde(default)]
    pub footer_banner: Option<String>,
}

impl AssetUrls {
    /// All configured URLs, in [`AssetKind::ALL`] order.
    #[must_use]
    pub fn configured(&self) -> Vec<&str> {
        AssetKind::ALL.iter().filter_map(|k| k.url(self)).collect()
    }
}

/// The decorative image slots of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetKind {
    /// See [`AssetUrls::top_banner`].
    TopBanner,
    /// See [`AssetUrls::title_icon`].
    TitleIcon,
    /// See [`AssetUrls::legend`].
    Legend,
    /// See [`AssetUrls::footer_banner`].
    FooterBanner,
}

impl AssetKind {
    /// Every slot.
    pub const ALL: &[Self] = &[
        Self::TopBanner,
        Self::TitleIcon,
        Self::Legend,
        Self::FooterBanner,
    ];

    /// `XObject` resource name used in page content.
    #[must_use]
    pub const fn resource_name(self) -> &'static str {
        match self {
            Self::TopBanner => "ImTop",
            Self::TitleIcon => "ImIcon",
            Self::Legend => "ImLegend",
            Self::FooterBanner => "ImFooter",
        }
    }

    /// The configured URL for this slot.
    #[must_use]
    pub fn url(self, urls: &AssetUrls) -> Option<&str> {
        match self {
            Self::TopBanner => urls.top_banner.as_deref(),
            Self::TitleIcon => urls.title_icon.as_deref(),
            Self::Legend => urls.legend.as_deref(),
            Self::FooterBanner => urls.footer_banner.as_deref(),
        }
        .filter(|u| !u.trim().is_empty())
    }
}

/// A decoded image ready to be placed in the PDF.
#[derive(Debug, Clone)]
pub struct DecorativeImage {
    /// Image `XObject` stream.
    pub stream: Stream,
    /// Pixel width.
    pub width_px: i64,
    /// Pixel height.
    pub height_px: i64,
}

impl DecorativeImage {
    /// Decodes raster bytes (PNG, JPEG, ...) into an image `XObject`.
    ///
    /// # Errors
    ///
    /// Returns [`lopdf::Error`] if the bytes are not a supported image.
    pub fn decode(bytes: Vec<u8>) -> Result<Self, lopdf::Error> {
        let stream = lopdf::xobject::image_from(bytes)?;
        let dimension = |key: &[u8]| {
            stream
                .dict
                .get(key)
                .and_then(Object::as_i64)
                .unwrap_or(1)
                .max(1)
        };
        let width_px = dimension(b"Width");
        let height_px = dimension(b"Height");
        Ok(Self {
            stream,
            width_px,
            height_px,
        })
    }

    /// Width divided by height.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> f32 {
        self.width_px as f32 / self.height_px as f32
    }
}

/// The images available for this report, by slot.
#[derive(Debug, Clone, Default)]
pub struct DecorativeImages {
    images: BTreeMap<AssetKind, DecorativeImage>,
}

impl DecorativeImages {
    /// Fetches and decodes every configured image. Failures are logged and
    /// skipped.
    #[must_use]
    pub fn load(urls: &AssetUrls, provider: &dyn AssetProvider) -> Self {
        let mut images = BTreeMap::new();

        for kind in AssetKind::ALL {
            let Some(url) = kind.url(urls) else {
                continue;
            };
            let Some(bytes) = provider.fetch_or_none(url) else {
                log::warn!("Decorative image {kind:?} unavailable from {url}, skipping");
                continue;
            };
            match DecorativeImage::decode(bytes) {
                Ok(image) => {
                    images.insert(*kind, image);
                }
                Err(e) => {
                    log::warn!("Failed to decode decorative image {kind:?} from {url}: {e}");
                }
            }
        }

        log::debug!("Loaded {} decorative images", images.len());
        Self { images }
    }

    /// The image for a slot, if it loaded.
    #[must_use]
    pub fn get(&self, kind: AssetKind) -> Option<&DecorativeImage> {
        self.images.get(&kind)
    }

    /// Loaded images with their slots.
    pub fn iter(&self) -> impl Iterator<Item = (AssetKind, &DecorativeImage)> {
        self.images.iter().map(|(k, v)| (*k, v))
    }

    /// Whether no image loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// A 4x2 RGB PNG.
#[cfg(test)]
pub(crate) const SAMPLE_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x02, 0x08, 0x02, 0x00, 0x00, 0x00, 0xF0, 0xCA, 0xEA,
    0x34, 0x00, 0x00, 0x00, 0x0F, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x60, 0x98, 0x99, 0x86,
    0x40, 0xC8, 0x1C, 0x00, 0x64, 0x82, 0x07, 0xF9, 0x97, 0xEF, 0xD3, 0x6B, 0x00, 0x00, 0x00, 0x00,
    0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];
