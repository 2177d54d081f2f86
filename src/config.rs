//! Application configuration management.
//!
//! Persists default detection thresholds in the platform config directory.
//! CLI flags override the config file, which overrides built-in defaults.

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::analysis::model::{DEFAULT_BLUR_THRESHOLD, DEFAULT_SIMILARITY_THRESHOLD};

/// Persisted application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default blur threshold when no CLI flag is given.
    #[serde(default = "default_blur")]
    pub blur_threshold: f64,
    /// Default similarity threshold (percent) when no CLI flag is given.
    #[serde(default = "default_similarity")]
    pub similarity_threshold: u8,
}

fn default_blur() -> f64 {
    DEFAULT_BLUR_THRESHOLD
}

fn default_similarity() -> u8 {
    DEFAULT_SIMILARITY_THRESHOLD
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blur_threshold: DEFAULT_BLUR_THRESHOLD,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl Config {
    /// Load the configuration from the default platform-specific path,
    /// falling back to defaults if missing or unreadable.
    #[must_use]
    pub fn load() -> Self {
        match Self::load_internal() {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    fn load_internal() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save the configuration to the default platform-specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined or
    /// the file cannot be written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "lumascan", "lumascan")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_defaults() {
        let config = Config::default();
        assert!((config.blur_threshold - 15.0).abs() < f64::EPSILON);
        assert_eq!(config.similarity_threshold, 70);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"blur_threshold": 30.0}"#).unwrap();
        assert!((config.blur_threshold - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.similarity_threshold, 70);
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            blur_threshold: 25.0,
            similarity_threshold: 85,
        };
        config.save_to(&path).unwrap();

        let loaded: Config = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!((loaded.blur_threshold - 25.0).abs() < f64::EPSILON);
        assert_eq!(loaded.similarity_threshold, 85);
    }
}
