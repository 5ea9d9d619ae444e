//! Layered configuration.
//!
//! Config is loaded with two layers of precedence (highest wins):
//! 1. Environment variables: `FLOWFIELD_API_KEY`, `FLOWFIELD_API_URL`
//! 2. Project-local: `flowfield.toml`
//!
//! A missing file falls back to defaults; a malformed file is an error.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};
use crate::field::PopulationTiers;

/// Project-local config file name.
pub const CONFIG_FILE: &str = "flowfield.toml";

const ENV_API_KEY: &str = "FLOWFIELD_API_KEY";
const ENV_API_URL: &str = "FLOWFIELD_API_URL";

/// Window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "flowfield".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Gesture classification settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub enabled: bool,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            enabled: true,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub vision: VisionConfig,
    pub population: PopulationTiers,
}

impl Config {
    /// Load config: defaults, overlaid by `flowfield.toml` if present, then
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::load_file(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load config from a specific file path only (env overrides still apply).
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| FlowError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            self.vision.api_key = Some(key);
        }
        if let Ok(url) = std::env::var(ENV_API_URL) {
            self.vision.api_url = url;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert!(config.vision.enabled);
        assert!(config.vision.api_key.is_none());
        assert_eq!(config.vision.model, "gemini-2.5-flash");
        assert_eq!(config.population, PopulationTiers::default());
    }

    #[test]
    fn test_parse_partial_file() {
        let config: Config = toml::from_str(
            r#"
[window]
title = "field demo"
width = 640

[vision]
api_key = "test-key-123"
enabled = false

[population]
narrow = 200
"#,
        )
        .unwrap();

        assert_eq!(config.window.title, "field demo");
        assert_eq!(config.window.width, 640);
        // Unspecified fields keep their defaults
        assert_eq!(config.window.height, 720);
        assert_eq!(config.vision.api_key.as_deref(), Some("test-key-123"));
        assert!(!config.vision.enabled);
        assert_eq!(config.population.narrow, 200);
        assert_eq!(config.population.wide, 1200);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = std::env::temp_dir().join("flowfield_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "[window\ntitle = ").unwrap();

        assert!(Config::load_file(&path).is_err());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_env_var_overrides() {
        std::env::set_var("FLOWFIELD_API_KEY", "env-key-override");
        std::env::set_var("FLOWFIELD_API_URL", "https://example.com/v1");

        let mut config = Config::default();
        config.vision.api_key = Some("file-key".to_string());
        config.apply_env_overrides();

        assert_eq!(config.vision.api_key.as_deref(), Some("env-key-override"));
        assert_eq!(config.vision.api_url, "https://example.com/v1");

        std::env::remove_var("FLOWFIELD_API_KEY");
        std::env::remove_var("FLOWFIELD_API_URL");
    }
}
