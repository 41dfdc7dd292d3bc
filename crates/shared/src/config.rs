//! Configuration management for the club roster tools.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    /// Ranking site scraper settings
    pub scraper: ScraperConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file path (relative to data directory or absolute)
    pub path: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Scraper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Ranking site entry point, e.g. `https://www.swimrankings.net/index.php`
    pub base_url: String,

    /// Minimum time between two requests, in milliseconds
    pub min_interval_ms: u64,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Roster query settings
    pub roster: RosterQueryConfig,
}

/// Parameters of the club roster query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterQueryConfig {
    /// Club id on the ranking site
    pub club_id: u32,

    /// Season year
    pub season: u16,

    /// Course filter (`LCM` or `SCM`)
    pub course: String,

    /// Stroke filter
    pub stroke: u32,
}

impl Default for RosterQueryConfig {
    fn default() -> Self {
        Self {
            club_id: 73626,
            season: 2025,
            course: "LCM".to_string(),
            stroke: 9,
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.swimrankings.net/index.php".to_string(),
            min_interval_ms: 1000,
            timeout_secs: 30,
            user_agent: "swim-club-roster/0.1.0".to_string(),
            roster: RosterQueryConfig::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root_dir: "data".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "club.db".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: true,
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults. Sections and keys left out of
    /// the file keep their default values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))
            }
        };

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        tracing::info!(path = %path.display(), "Configuration loaded");

        Ok(config)
    }

    /// Reject settings the scraper cannot run with
    pub fn validate(&self) -> Result<()> {
        let scraper = &self.scraper;

        if scraper.base_url.trim().is_empty() {
            bail!("scraper.base_url must not be empty");
        }
        if scraper.timeout_secs == 0 {
            bail!("scraper.timeout_secs must be at least 1");
        }
        if !matches!(scraper.roster.course.as_str(), "LCM" | "SCM") {
            bail!(
                "scraper.roster.course must be LCM or SCM, got {:?}",
                scraper.roster.course
            );
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(path = %path.display(), "Configuration saved");

        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Database file, resolved against the data directory
    pub fn database_path(&self) -> PathBuf {
        self.resolve(&self.database.path)
    }

    /// Log directory, resolved against the data directory
    pub fn log_dir(&self) -> PathBuf {
        self.resolve(&self.logging.log_dir)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir().join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.root_dir, "data");
        assert_eq!(config.database.path, "club.db");
        assert_eq!(config.scraper.min_interval_ms, 1000);
        assert_eq!(config.scraper.roster.club_id, 73626);
        assert_eq!(config.scraper.roster.course, "LCM");
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let mut original_config = Config::default();
        original_config.scraper.min_interval_ms = 2500;
        original_config.save(&config_path)?;

        assert!(config_path.exists());

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config.data.root_dir, original_config.data.root_dir);
        assert_eq!(loaded_config.scraper.base_url, original_config.scraper.base_url);
        assert_eq!(loaded_config.scraper.min_interval_ms, 2500);

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() -> Result<()> {
        let config = Config::from_file("nonexistent.toml")?;
        // Should return default config without error
        assert_eq!(config.data.root_dir, "data");
        Ok(())
    }

    #[test]
    fn test_invalid_config_is_an_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "data = 5")?;

        assert!(Config::from_file(&config_path).is_err());
        Ok(())
    }

    #[test]
    fn test_partial_config_keeps_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[scraper]\nmin_interval_ms = 2000\n\n[scraper.roster]\nclub_id = 12345\n",
        )?;

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.scraper.min_interval_ms, 2000);
        assert_eq!(config.scraper.roster.club_id, 12345);
        assert_eq!(config.scraper.roster.course, "LCM");
        assert_eq!(config.scraper.timeout_secs, 30);
        assert_eq!(config.database.path, "club.db");
        Ok(())
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.scraper.roster.course = "25m".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scraper.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scraper.base_url = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_path_resolution() {
        let mut config = Config::default();

        assert!(config.database_path().ends_with("data/club.db"));
        assert!(config.log_dir().ends_with("data/logs"));

        config.database.path = "/var/lib/club/club.db".to_string();
        assert_eq!(config.database_path(), PathBuf::from("/var/lib/club/club.db"));
    }
}
