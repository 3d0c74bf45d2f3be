#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Observation and decorative asset sources.
//!
//! Observations are read from a CSV export of the published sensor
//! spreadsheet, fetched over HTTP or read from a local file. Decorative
//! report images are prefetched into a
//! [`PrefetchedAssets`](air_quality_report::PrefetchedAssets) so the
//! report builder can stay synchronous.

pub mod config;
pub mod parse;
pub mod retry;

use air_quality_observation_models::Observation;
use air_quality_report::{AssetUrls, PrefetchedAssets};

pub use config::SourceConfig;

/// Errors that can occur while loading observations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// CSV decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error (local file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A required column is absent from the header row.
    #[error("Missing column: {column}")]
    MissingColumn {
        /// Expected header name.
        column: String,
    },

    /// The configured delimiter is not a single ASCII character.
    #[error("Invalid delimiter: {delimiter:?}")]
    InvalidDelimiter {
        /// Configured delimiter.
        delimiter: char,
    },
}

/// Builds the HTTP client used for every fetch.
///
/// # Errors
///
/// * If the TLS backend fails to initialize
pub fn client(config: &SourceConfig) -> Result<reqwest::Client, SourceError> {
    Ok(reqwest::Client::builder()
        .timeout(config.timeout())
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Reads the bytes at an HTTP(S) URL or local path.
///
/// # Errors
///
/// * If the download fails after retries
/// * If the local file cannot be read
pub async fn fetch_bytes(client: &reqwest::Client, location: &str) -> Result<Vec<u8>, SourceError> {
    if is_remote(location) {
        retry::send_bytes(|| client.get(location)).await
    } else {
        Ok(tokio::fs::read(location).await?)
    }
}

/// Fetches and parses the configured observation spreadsheet.
///
/// # Errors
///
/// * If the spreadsheet cannot be fetched
/// * If its header row lacks a required column
pub async fn fetch_observations(
    client: &reqwest::Client,
    config: &SourceConfig,
) -> Result<Vec<Observation>, SourceError> {
    log::debug!("Fetching observations from {}", config.url);
    let bytes = fetch_bytes(client, &config.url).await?;
    log::info!("Fetched {} bytes of observations", bytes.len());
    parse::parse_observations(&bytes, config)
}

/// Fetches observations, treating any failure as an empty snapshot.
///
/// Read-only views use this so that a source outage shows an empty map
/// instead of an error.
pub async fn fetch_observations_or_empty(
    client: &reqwest::Client,
    config: &SourceConfig,
) -> Vec<Observation> {
    match fetch_observations(client, config).await {
        Ok(observations) => observations,
        Err(e) => {
            log::error!("Observation source unavailable: {e}");
            Vec::new()
        }
    }
}

/// Downloads every configured decorative image. Failures are logged and
/// the image is left out.
pub async fn fetch_assets(client: &reqwest::Client, urls: &AssetUrls) -> PrefetchedAssets {
    let mut assets = PrefetchedAssets::new();
    for url in urls.configured() {
        match fetch_bytes(client, url).await {
            Ok(bytes) => assets.insert(url, bytes),
            Err(e) => log::warn!("Decorative image unavailable from {url}: {e}"),
        }
    }
    log::debug!("Prefetched {} decorative images", assets.len());
    assets
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use air_quality_report::AssetProvider as _;

    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("air_quality_source_{}_{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn remote_locations_are_recognised() {
        assert!(is_remote("https://example.org/a.csv"));
        assert!(is_remote("HTTP://example.org/a.csv"));
        assert!(!is_remote("/srv/dados.csv"));
        assert!(!is_remote("dados.csv"));
    }

    #[tokio::test]
    async fn local_spreadsheet_is_read() {
        let path = temp_file(
            "dados.csv",
            "MUNICÍPIO,pm2.5_24hour\nNatal,10\nMossoró,30\n",
        );
        let config = SourceConfig::embedded()
            .unwrap()
            .with_url(&path.to_string_lossy());
        let client = client(&config).unwrap();

        let observations = fetch_observations(&client, &config).await.unwrap();
        assert_eq!(observations.len(), 2);

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn missing_file_degrades_to_empty() {
        let config = SourceConfig::embedded()
            .unwrap()
            .with_url("/nonexistent/air_quality/dados.csv");
        let client = client(&config).unwrap();

        assert!(matches!(
            fetch_observations(&client, &config).await,
            Err(SourceError::Io(_))
        ));
        assert!(fetch_observations_or_empty(&client, &config).await.is_empty());
    }

    #[tokio::test]
    async fn unreadable_assets_are_left_out() {
        let icon = temp_file("icon.png", "not really a png");
        let urls = AssetUrls {
            top_banner: Some("/nonexistent/air_quality/top.png".to_owned()),
            title_icon: Some(icon.to_string_lossy().into_owned()),
            legend: None,
            footer_banner: None,
        };
        let config = SourceConfig::embedded().unwrap();
        let assets = fetch_assets(&client(&config).unwrap(), &urls).await;

        assert_eq!(assets.len(), 1);
        assert!(assets.fetch_or_none(&icon.to_string_lossy()).is_some());

        std::fs::remove_file(icon).ok();
    }
}
