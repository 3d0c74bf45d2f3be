//! Source configuration.
//!
//! A default configuration is baked into the binary at compile time via
//! [`include_str!`]. A different TOML file can be supplied through
//! [`CONFIG_ENV`], and [`SOURCE_URL_ENV`] replaces just the spreadsheet
//! location.

use std::path::Path;
use std::time::Duration;

use air_quality_report::AssetUrls;
use serde::{Deserialize, Serialize};

use crate::SourceError;

/// The embedded default configuration.
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Environment variable naming a TOML configuration file.
pub const CONFIG_ENV: &str = "AIR_QUALITY_CONFIG";

/// Environment variable overriding [`SourceConfig::url`].
pub const SOURCE_URL_ENV: &str = "AIR_QUALITY_SOURCE_URL";

/// Where the observations come from and how to read them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// HTTP(S) URL or local path of the CSV export.
    pub url: String,
    /// Field delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Header names of the columns that are read.
    #[serde(default)]
    pub columns: ColumnNames,
    /// Decorative report images.
    #[serde(default)]
    pub assets: AssetUrls,
}

const fn default_delimiter() -> char {
    ','
}

const fn default_timeout_secs() -> u64 {
    30
}

/// Spreadsheet header for each observation field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Municipality name. Required.
    pub locality: String,
    /// Latitude.
    pub latitude: String,
    /// Longitude.
    pub longitude: String,
    /// 24-hour PM2.5 value. Required.
    pub measurement: String,
    /// Category label as published.
    pub category: String,
    /// Sensor display name.
    pub sensor_name: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            locality: "MUNICÍPIO".to_owned(),
            latitude: "latitude".to_owned(),
            longitude: "longitude".to_owned(),
            measurement: "pm2.5_24hour".to_owned(),
            category: "Valor".to_owned(),
            sensor_name: "name".to_owned(),
        }
    }
}

impl SourceConfig {
    /// Parses a TOML configuration.
    ///
    /// # Errors
    ///
    /// * If the TOML is invalid or missing the `url` key
    pub fn parse(text: &str) -> Result<Self, SourceError> {
        Ok(toml::from_str(text)?)
    }

    /// The configuration embedded at compile time.
    ///
    /// # Errors
    ///
    /// * If the embedded TOML fails to parse
    pub fn embedded() -> Result<Self, SourceError> {
        Self::parse(DEFAULT_CONFIG)
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// * If the file cannot be read
    /// * If its contents fail to parse
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Loads the configuration named by [`CONFIG_ENV`], or the embedded
    /// one, then applies [`SOURCE_URL_ENV`].
    ///
    /// # Errors
    ///
    /// * If the configured file cannot be read or parsed
    pub fn load() -> Result<Self, SourceError> {
        let config = match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                log::info!("Loading source configuration from {path}");
                Self::from_file(Path::new(&path))?
            }
            _ => Self::embedded()?,
        };

        Ok(match std::env::var(SOURCE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => config.with_url(url.trim()),
            _ => config,
        })
    }

    /// Replaces the spreadsheet location.
    #[must_use]
    pub fn with_url(mut self, url: &str) -> Self {
        url.clone_into(&mut self.url);
        self
    }

    /// The delimiter as a single byte.
    ///
    /// # Errors
    ///
    /// * If the delimiter is not an ASCII character
    pub fn delimiter_byte(&self) -> Result<u8, SourceError> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or(SourceError::InvalidDelimiter {
                delimiter: self.delimiter,
            })
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_parses() {
        let config = SourceConfig::embedded().unwrap();
        assert!(config.url.starts_with("https://"));
        assert_eq!(config.delimiter_byte().unwrap(), b',');
        assert_eq!(config.columns, ColumnNames::default());
        assert_eq!(config.assets.configured().len(), 4);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = SourceConfig::parse(r#"url = "dados.csv""#).unwrap();
        assert_eq!(config.delimiter, ',');
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.columns.measurement, "pm2.5_24hour");
        assert!(config.assets.configured().is_empty());
    }

    #[test]
    fn partial_column_table_keeps_other_defaults() {
        let config = SourceConfig::parse(
            r#"
url = "dados.csv"
delimiter = ";"

[columns]
measurement = "pm25"
"#,
        )
        .unwrap();
        assert_eq!(config.columns.measurement, "pm25");
        assert_eq!(config.columns.locality, "MUNICÍPIO");
        assert_eq!(config.delimiter_byte().unwrap(), b';');
    }

    #[test]
    fn missing_url_is_a_config_error() {
        assert!(matches!(
            SourceConfig::parse("delimiter = \",\""),
            Err(SourceError::Config(_))
        ));
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let config = SourceConfig::parse("url = \"x\"\ndelimiter = \"§\"").unwrap();
        assert!(matches!(
            config.delimiter_byte(),
            Err(SourceError::InvalidDelimiter { delimiter: '§' })
        ));
    }

    #[test]
    fn url_override_replaces_only_the_url() {
        let config = SourceConfig::embedded().unwrap().with_url("/tmp/dados.csv");
        assert_eq!(config.url, "/tmp/dados.csv");
        assert_eq!(config.columns, ColumnNames::default());
    }
}
