//! Configuration management for mucluc.
//!
//! Handles loading, saving, and validating configuration from
//! platform-specific config directories.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application name used for config directory.
const APP_NAME: &str = "Mucluc";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Web scraping settings.
    pub scraping: ScrapingConfig,
}

/// Web scraping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Delay before each web request in seconds.
    pub delay_between_requests_sec: f64,

    /// Per-request timeout in seconds.
    pub timeout_sec: u64,

    /// Upper bound on TOC pages fetched per story. Caps both the resolved
    /// page count and the walk along "next" links.
    pub max_toc_pages: usize,

    /// Enable debug logging.
    pub debug: bool,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            delay_between_requests_sec: 1.0,
            timeout_sec: 30,
            max_toc_pages: 200,
            debug: false,
        }
    }
}

impl Config {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Loads configuration from the default location.
    ///
    /// If the config file doesn't exist, creates a default one.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scraping = &self.scraping;

        let delay = scraping.delay_between_requests_sec;
        if delay.is_nan() || delay < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "scraping.delay_between_requests_sec".to_string(),
                message: "must be zero or positive".to_string(),
            });
        }

        if scraping.timeout_sec == 0 {
            return Err(ConfigError::InvalidValue {
                key: "scraping.timeout_sec".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        if scraping.max_toc_pages == 0 {
            return Err(ConfigError::InvalidValue {
                key: "scraping.max_toc_pages".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scraping.delay_between_requests_sec, 1.0);
        assert_eq!(config.scraping.timeout_sec, 30);
        assert_eq!(config.scraping.max_toc_pages, 200);
        assert!(!config.scraping.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = Config::default();
        config.scraping.max_toc_pages = 12;
        config.scraping.debug = true;
        let file = NamedTempFile::new().unwrap();

        config.save_to(file.path()).unwrap();

        let loaded = Config::load_from(file.path()).unwrap();
        assert_eq!(loaded.scraping.max_toc_pages, 12);
        assert!(loaded.scraping.debug);
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILENAME);

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.scraping.timeout_sec, 30);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[scraping]\ndebug = true\n").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert!(config.scraping.debug);
        assert_eq!(config.scraping.max_toc_pages, 200);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.scraping.delay_between_requests_sec = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scraping.timeout_sec = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scraping.max_toc_pages = 0;
        assert!(config.validate().is_err());
    }
}
