//! Configuration module for Rustible Inventory
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - System configuration (/etc/rustible/rustible.cfg)
//! - User configuration (~/.rustible.cfg)
//! - Project configuration (./rustible.cfg)
//! - Environment variables
//!
//! Command-line arguments are applied on top by the binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Log level used when neither config nor environment set one
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default settings
    pub defaults: Defaults,

    /// Colors and output settings
    pub colors: ColorsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Default configuration values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Default inventory path
    pub inventory: Option<PathBuf>,
}

/// Colors and output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// Enable colored output; unset means enabled
    pub enabled: Option<bool>,
}

/// Logging settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from all sources
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Config::default();

        for path in Self::get_config_paths(config_path) {
            if path.exists() {
                config = config.merge_from_file(&path)?;
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Get the list of configuration file paths to check
    fn get_config_paths(explicit_path: Option<&PathBuf>) -> Vec<PathBuf> {
        // Explicit path replaces the search
        if let Some(path) = explicit_path {
            return vec![path.clone()];
        }

        let mut paths = vec![PathBuf::from("/etc/rustible/rustible.cfg")];

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".rustible.cfg"));
        }

        paths.push(PathBuf::from("rustible.cfg"));
        paths
    }

    /// Merge configuration from a file
    fn merge_from_file(&self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let file_config: Config = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            _ => {
                // Try TOML first (for .cfg files), then YAML
                toml::from_str(&content)
                    .or_else(|_| serde_yaml::from_str(&content))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
        };

        Ok(self.merge(file_config))
    }

    /// Merge another config into this one; only fields set in `other` win
    fn merge(&self, other: Config) -> Config {
        Config {
            defaults: Defaults {
                inventory: other
                    .defaults
                    .inventory
                    .or_else(|| self.defaults.inventory.clone()),
            },
            colors: ColorsConfig {
                enabled: other.colors.enabled.or(self.colors.enabled),
            },
            logging: LoggingConfig {
                log_level: other
                    .logging
                    .log_level
                    .or_else(|| self.logging.log_level.clone()),
            },
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // RUSTIBLE_INVENTORY
        if let Ok(path) = std::env::var("RUSTIBLE_INVENTORY") {
            if !path.is_empty() {
                self.defaults.inventory = Some(PathBuf::from(path));
            }
        }

        // RUSTIBLE_LOG_LEVEL
        if let Ok(level) = std::env::var("RUSTIBLE_LOG_LEVEL") {
            self.logging.log_level = Some(level);
        }

        // NO_COLOR
        if std::env::var("NO_COLOR").is_ok() || std::env::var("RUSTIBLE_NO_COLOR").is_ok() {
            self.colors.enabled = Some(false);
        }
    }

    /// Get the effective inventory path
    pub fn inventory_path(&self) -> Option<&PathBuf> {
        self.defaults.inventory.as_ref()
    }

    /// Whether colored output is enabled
    pub fn colors_enabled(&self) -> bool {
        self.colors.enabled.unwrap_or(true)
    }

    /// The configured log level, or [`DEFAULT_LOG_LEVEL`]
    pub fn log_level(&self) -> &str {
        self.logging.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Load from a specific file, without the search path or environment
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Config::default().merge_from_file(path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.inventory_path().is_none());
        assert!(config.colors_enabled());
        assert_eq!(config.log_level(), "warn");
    }

    #[test]
    fn test_config_merge() {
        let base = Config {
            defaults: Defaults {
                inventory: Some(PathBuf::from("/etc/ansible/hosts")),
            },
            logging: LoggingConfig {
                log_level: Some("debug".to_string()),
            },
            ..Config::default()
        };

        let merged = base.merge(Config::default());
        assert_eq!(
            merged.inventory_path(),
            Some(&PathBuf::from("/etc/ansible/hosts"))
        );
        assert_eq!(merged.log_level(), "debug");
    }

    #[test]
    fn test_from_toml_and_yaml_files() {
        let dir = TempDir::new().unwrap();

        let toml_path = dir.path().join("rustible.cfg");
        std::fs::write(
            &toml_path,
            "[defaults]\ninventory = \"inventories/vagrant\"\n\n[colors]\nenabled = false\n",
        )
        .unwrap();
        let config = Config::from_file(&toml_path).unwrap();
        assert_eq!(
            config.inventory_path(),
            Some(&PathBuf::from("inventories/vagrant"))
        );
        assert!(!config.colors_enabled());

        let yaml_path = dir.path().join("rustible.yml");
        std::fs::write(&yaml_path, "logging:\n  log_level: trace\n").unwrap();
        let config = Config::from_file(&yaml_path).unwrap();
        assert_eq!(config.log_level(), "trace");
    }

    #[test]
    fn test_later_file_keeps_unset_sections() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.cfg");
        let second = dir.path().join("second.cfg");
        std::fs::write(&first, "[colors]\nenabled = false\n\n[logging]\nlog_level = \"debug\"\n")
            .unwrap();
        std::fs::write(&second, "[defaults]\ninventory = \"hosts\"\n").unwrap();

        let config = Config::default()
            .merge_from_file(&first)
            .unwrap()
            .merge_from_file(&second)
            .unwrap();
        assert!(!config.colors_enabled());
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.inventory_path(), Some(&PathBuf::from("hosts")));

        std::fs::write(&second, "[colors]\nenabled = true\n").unwrap();
        let config = Config::default()
            .merge_from_file(&first)
            .unwrap()
            .merge_from_file(&second)
            .unwrap();
        assert!(config.colors_enabled());
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rustible.cfg");
        std::fs::write(&path, "defaults: [unclosed\n").unwrap();
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    #[serial]
    fn test_env_override() {
        std::env::set_var("RUSTIBLE_INVENTORY", "/tmp/hosts");
        std::env::set_var("RUSTIBLE_LOG_LEVEL", "info");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.inventory_path(), Some(&PathBuf::from("/tmp/hosts")));
        assert_eq!(config.log_level(), "info");
        std::env::remove_var("RUSTIBLE_INVENTORY");
        std::env::remove_var("RUSTIBLE_LOG_LEVEL");
    }
}
