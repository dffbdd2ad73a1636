//! Configuration models.
//!
//! `SecretConfig` mirrors `secret.json` (API credentials). `ForgeConfig`
//! mirrors the optional `config.toml` (model selection and progress timing).

use crate::error::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
}

/// Model used for each backend operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub generation: String,
    pub refinement: String,
    pub critique: String,
    /// URL, text-file and hint analysis
    pub analysis: String,
    /// Image/video analysis
    pub media: String,
    /// Thinking budget for instruction generation (0 disables it)
    pub thinking_budget: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            generation: "gemini-3-pro-preview".to_string(),
            refinement: "gemini-3-pro-preview".to_string(),
            critique: "gemini-3-flash-preview".to_string(),
            analysis: "gemini-3-flash-preview".to_string(),
            media: "gemini-3-pro-preview".to_string(),
            thinking_budget: 32768,
        }
    }
}

/// Timing of the cosmetic progress console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Delay between emitted status lines
    pub interval_ms: u64,
    /// Pause after the success lines before the result is swapped in
    pub settle_ms: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            interval_ms: 600,
            settle_ms: 800,
        }
    }
}

impl ProgressConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Root structure of config.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    pub models: ModelConfig,
    pub progress: ProgressConfig,
}

impl ForgeConfig {
    /// Parses config.toml content.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file at `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("[Config] No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            ForgeError::config(format!(
                "Failed to read configuration file at {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml_str(&content).map_err(|e| {
            ForgeError::config(format!(
                "Failed to parse configuration file at {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Loads `path` if given, otherwise the default location.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match config_dir() {
                Some(dir) => Self::load(&dir.join("config.toml")),
                None => Ok(Self::default()),
            },
        }
    }

    fn validate(&self) -> Result<()> {
        let models = &self.models;
        for (field, value) in [
            ("models.generation", &models.generation),
            ("models.refinement", &models.refinement),
            ("models.critique", &models.critique),
            ("models.analysis", &models.analysis),
            ("models.media", &models.media),
        ] {
            if value.trim().is_empty() {
                return Err(ForgeError::config(format!("{field} must not be empty")));
            }
        }
        if self.progress.interval_ms == 0 {
            return Err(ForgeError::config("progress.interval_ms must be positive"));
        }
        Ok(())
    }
}

/// Returns `~/.config/promptforge`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("promptforge"))
}
