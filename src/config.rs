//! Server configuration module.
//!
//! Handles loading, validating, and merging the optional `config.toml`. Stock
//! defaults are the base layer; a user file passed with `--config` overrides
//! any subset of keys; command-line flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [server]
//! listen_addr = "127.0.0.1"  # Address or hostname to bind
//! port = 3000
//!
//! [thumbnails]
//! max_edge = 64              # Bounding box for the longer side, in pixels
//! quality = 75               # JPEG quality (1-100)
//!
//! [cache]
//! busy_timeout_ms = 5000     # How long a request waits on a locked database
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [server]
//! port = 8080
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! Changing thumbnail settings does not invalidate the artifact cache; only a
//! change to a file's modification time does. Delete the database to rebuild
//! every thumbnail.

use crate::cache::DEFAULT_BUSY_TIMEOUT;
use crate::imaging::{Quality, ThumbnailConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `config.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Where the HTTP server listens.
    pub server: ServerConfig,
    /// Thumbnail generation settings.
    pub thumbnails: ThumbnailsConfig,
    /// Artifact cache database settings.
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Longer side of a thumbnail, in pixels. Smaller images are not upscaled.
    pub max_edge: u32,
    /// JPEG encoding quality (1-100).
    pub quality: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            max_edge: 64,
            quality: 75,
        }
    }
}

impl ThumbnailsConfig {
    pub fn to_thumbnail_config(&self) -> ThumbnailConfig {
        ThumbnailConfig {
            max_edge: self.max_edge,
            quality: Quality::new(self.quality),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub busy_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT.as_millis() as u64,
        }
    }
}

impl CacheConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.listen_addr.trim().is_empty() {
            return Err(ConfigError::Validation(
                "server.listen_addr must not be empty".into(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port must be non-zero".into(),
            ));
        }
        if self.thumbnails.max_edge == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.max_edge must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.thumbnails.quality) {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        Ok(())
    }

    /// Apply command-line overrides on top of the loaded values, then
    /// validate the result.
    pub fn with_overrides(
        mut self,
        listen_addr: Option<String>,
        port: Option<u16>,
    ) -> Result<Self, ConfigError> {
        if let Some(addr) = listen_addr {
            self.server.listen_addr = addr;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        self.validate()?;
        Ok(self)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(GalleryConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the configuration: stock defaults, overridden by `path` if given.
pub fn load_config(path: Option<&Path>) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = path.map(load_raw_config).transpose()?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Media Gallery Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Pass this file with `media-gallery serve --config <path>`.
# Command-line flags (--listen-addr, --port) override it.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# HTTP server
# ---------------------------------------------------------------------------
[server]
# Address or hostname to bind.
listen_addr = "127.0.0.1"

# TCP port.
port = 3000

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Longer side of every thumbnail, in pixels. Aspect ratio is preserved and
# smaller images are never upscaled.
max_edge = 64

# JPEG encoding quality (1 = worst, 100 = best).
quality = 75

# ---------------------------------------------------------------------------
# Artifact cache
# ---------------------------------------------------------------------------
[cache]
# How long a request waits for another request's write to finish, in
# milliseconds, before failing.
busy_timeout_ms = 5000
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = GalleryConfig::default();
        assert_eq!(config.server.listen_addr, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.thumbnails.max_edge, 64);
        assert_eq!(config.thumbnails.quality, 75);
        assert_eq!(config.cache.busy_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[server]
port = 8080
"##;
        let config: GalleryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        // Default values preserved
        assert_eq!(config.server.listen_addr, "127.0.0.1");
        assert_eq!(config.thumbnails.max_edge, 64);
    }

    #[test]
    fn unknown_keys_rejected() {
        let toml = r##"
[server]
prot = 8080
"##;
        let result: Result<GalleryConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn thumbnail_config_conversion() {
        let thumbs = ThumbnailsConfig {
            max_edge: 128,
            quality: 90,
        };
        let converted = thumbs.to_thumbnail_config();
        assert_eq!(converted.max_edge, 128);
        assert_eq!(converted.quality.value(), 90);
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn default_config_is_valid() {
        assert!(GalleryConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_port_rejected() {
        let mut config = GalleryConfig::default();
        config.server.port = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn out_of_range_quality_rejected() {
        let mut config = GalleryConfig::default();
        config.thumbnails.quality = 0;
        assert!(config.validate().is_err());
        config.thumbnails.quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_max_edge_rejected() {
        let mut config = GalleryConfig::default();
        config.thumbnails.max_edge = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_listen_addr_rejected() {
        let mut config = GalleryConfig::default();
        config.server.listen_addr = "  ".into();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // Merging and loading
    // =========================================================================

    #[test]
    fn merge_toml_overrides_nested_keys() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn load_config_without_file_is_default() {
        let config = load_config(None).unwrap();
        assert_eq!(config, GalleryConfig::default());
    }

    #[test]
    fn load_config_merges_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[thumbnails]\nquality = 90\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.thumbnails.quality, 90);
        assert_eq!(config.thumbnails.max_edge, 64);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn load_config_validates_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[server]\nport = 0\n").unwrap();

        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn load_config_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("missing.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn cli_overrides_win() {
        let config = GalleryConfig::default()
            .with_overrides(Some("0.0.0.0".into()), Some(9000))
            .unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0");
        assert_eq!(config.server.port, 9000);

        let untouched = GalleryConfig::default().with_overrides(None, None).unwrap();
        assert_eq!(untouched, GalleryConfig::default());
    }

    #[test]
    fn cli_overrides_are_validated() {
        assert!(matches!(
            GalleryConfig::default().with_overrides(None, Some(0)),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            GalleryConfig::default().with_overrides(Some(String::new()), None),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: GalleryConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, GalleryConfig::default());
    }
}
