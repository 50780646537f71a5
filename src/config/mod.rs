//! Configuration management.

use crate::source::{DatasetSource, FileSource, HttpSource};
use crate::{Error, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Where the suggestion dataset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// A JSON file on the local filesystem.
    File(PathBuf),
    /// An HTTP(S) endpoint serving the JSON document.
    Url(String),
}

impl SourceLocation {
    /// Creates the dataset source backend for this location.
    #[must_use]
    pub fn build_source(&self) -> Arc<dyn DatasetSource> {
        match self {
            Self::File(path) => Arc::new(FileSource::new(path.clone())),
            Self::Url(url) => Arc::new(HttpSource::new(url.clone())),
        }
    }
}

/// Main configuration for suggestd.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestConfig {
    /// Dataset source location.
    pub source: SourceLocation,
    /// Seconds between the end of one reload cycle and the start of the next.
    pub reload_interval_secs: u64,
    /// Bound on a single dataset load, in seconds.
    pub load_timeout_secs: u64,
    /// Maximum number of suggestions returned per query (the K-cap).
    pub max_results: usize,
    /// Address and port the HTTP transport listens on.
    pub listen: SocketAddr,
    /// Emit logs as JSON instead of human-readable lines.
    pub log_json: bool,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            source: SourceLocation::File(PathBuf::from("suggestions.json")),
            reload_interval_secs: 900,
            load_timeout_secs: 30,
            max_results: 10,
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_json: false,
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Dataset source section.
    pub source: Option<ConfigFileSource>,
    /// Reload interval in seconds.
    pub reload_interval_secs: Option<u64>,
    /// Load timeout in seconds.
    pub load_timeout_secs: Option<u64>,
    /// Result cap.
    pub max_results: Option<usize>,
    /// Listen address, `host:port`.
    pub listen: Option<String>,
    /// JSON log output.
    pub log_json: Option<bool>,
}

/// Source section in the config file. Exactly one of `path`/`url` may be set.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileSource {
    /// Path to a local JSON dataset file.
    pub path: Option<String>,
    /// URL of a remote JSON dataset.
    pub url: Option<String>,
}

impl SuggestConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// parsed values fail validation.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: e.to_string(),
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/suggestd/` on macOS)
    /// 2. XDG config dir (`~/.config/suggestd/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        // Check platform-specific config dir first
        let platform_config = base_dirs.config_dir().join("suggestd").join("config.toml");
        if platform_config.exists() {
            if let Ok(config) = Self::load_from_file(&platform_config) {
                return config;
            }
        }

        // Fall back to XDG-style ~/.config/suggestd/ for Unix compatibility
        let xdg_config = base_dirs
            .home_dir()
            .join(".config")
            .join("suggestd")
            .join("config.toml");
        if xdg_config.exists() {
            if let Ok(config) = Self::load_from_file(&xdg_config) {
                return config;
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `SuggestConfig`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source section names both a path and a URL,
    /// if the listen address does not parse, or if validation fails.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(source) = file.source {
            config.source = match (source.path, source.url) {
                (Some(_), Some(_)) => {
                    return Err(Error::InvalidInput(
                        "source.path and source.url are mutually exclusive".to_string(),
                    ));
                }
                (None, Some(url)) => SourceLocation::Url(url),
                (Some(path), None) => SourceLocation::File(PathBuf::from(path)),
                (None, None) => config.source,
            };
        }
        if let Some(secs) = file.reload_interval_secs {
            config.reload_interval_secs = secs;
        }
        if let Some(secs) = file.load_timeout_secs {
            config.load_timeout_secs = secs;
        }
        if let Some(max_results) = file.max_results {
            config.max_results = max_results;
        }
        if let Some(listen) = file.listen {
            config.listen = listen.parse().map_err(|_| {
                Error::InvalidInput(format!("listen address '{listen}' is not host:port"))
            })?;
        }
        if let Some(log_json) = file.log_json {
            config.log_json = log_json;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks value-level invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_results` is zero or either duration is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(Error::InvalidInput(
                "max_results must be at least 1".to_string(),
            ));
        }
        if self.reload_interval_secs == 0 {
            return Err(Error::InvalidInput(
                "reload_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.load_timeout_secs == 0 {
            return Err(Error::InvalidInput(
                "load_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the scheduler timing derived from this configuration.
    #[must_use]
    pub const fn reload_config(&self) -> crate::service::ReloadConfig {
        crate::service::ReloadConfig {
            interval: Duration::from_secs(self.reload_interval_secs),
            load_timeout: Duration::from_secs(self.load_timeout_secs),
        }
    }

    /// Sets the dataset file path.
    #[must_use]
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = SourceLocation::File(path.into());
        self
    }

    /// Sets the dataset URL.
    #[must_use]
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source = SourceLocation::Url(url.into());
        self
    }

    /// Sets the listen address.
    #[must_use]
    pub const fn with_listen(mut self, listen: SocketAddr) -> Self {
        self.listen = listen;
        self
    }

    /// Sets the result cap.
    #[must_use]
    pub const fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_defaults_match_the_documented_surface() {
        let config = SuggestConfig::default();
        assert_eq!(
            config.source,
            SourceLocation::File(PathBuf::from("suggestions.json"))
        );
        assert_eq!(config.reload_interval_secs, 900);
        assert_eq!(config.load_timeout_secs, 30);
        assert_eq!(config.max_results, 10);
        assert_eq!(config.listen, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert!(!config.log_json);
    }

    #[test]
    fn test_file_source_section_parses() {
        let file: ConfigFile = toml::from_str(
            r#"
            max_results = 5
            listen = "127.0.0.1:9000"

            [source]
            path = "data/suggestions.json"
            "#,
        )
        .unwrap();
        let config = SuggestConfig::from_config_file(file).unwrap();
        assert_eq!(
            config.source,
            SourceLocation::File(PathBuf::from("data/suggestions.json"))
        );
        assert_eq!(config.max_results, 5);
        assert_eq!(config.listen, SocketAddr::from(([127, 0, 0, 1], 9000)));
    }

    #[test]
    fn test_url_source_section_parses() {
        let file: ConfigFile = toml::from_str(
            r#"
            [source]
            url = "https://example.com/suggestions.json"
            "#,
        )
        .unwrap();
        let config = SuggestConfig::from_config_file(file).unwrap();
        assert_eq!(
            config.source,
            SourceLocation::Url("https://example.com/suggestions.json".to_string())
        );
    }

    #[test]
    fn test_path_and_url_together_are_rejected() {
        let file: ConfigFile = toml::from_str(
            r#"
            [source]
            path = "a.json"
            url = "https://example.com/b.json"
            "#,
        )
        .unwrap();
        assert!(matches!(
            SuggestConfig::from_config_file(file),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_bad_listen_address_is_rejected() {
        let file: ConfigFile = toml::from_str(r#"listen = "not-an-addr""#).unwrap();
        assert!(matches!(
            SuggestConfig::from_config_file(file),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_zero_max_results_is_rejected() {
        let file: ConfigFile = toml::from_str("max_results = 0").unwrap();
        assert!(matches!(
            SuggestConfig::from_config_file(file),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_builders_override_fields() {
        let config = SuggestConfig::new()
            .with_source_url("https://example.com/s.json")
            .with_max_results(3);
        assert_eq!(
            config.source,
            SourceLocation::Url("https://example.com/s.json".to_string())
        );
        assert_eq!(config.max_results, 3);
    }

    #[test]
    fn test_reload_config_carries_durations() {
        let config = SuggestConfig::default();
        let reload = config.reload_config();
        assert_eq!(reload.interval, Duration::from_secs(900));
        assert_eq!(reload.load_timeout, Duration::from_secs(30));
    }
}
