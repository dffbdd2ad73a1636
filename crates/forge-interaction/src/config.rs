//! Credential resolution for the Gemini backend.
//!
//! Looks at `GEMINI_API_KEY`, then `API_KEY`, then
//! `~/.config/promptforge/secret.json`.

use forge_core::config::{SecretConfig, config_dir};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variables checked for the API key, in priority order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Loads the secret configuration file from the given path.
pub fn load_secret_config(config_path: &Path) -> Result<SecretConfig, String> {
    if !config_path.exists() {
        return Err(format!(
            "Configuration file not found at: {}",
            config_path.display()
        ));
    }

    let content = fs::read_to_string(config_path).map_err(|e| {
        format!(
            "Failed to read configuration file at {}: {}",
            config_path.display(),
            e
        )
    })?;

    serde_json::from_str(&content).map_err(|e| {
        format!(
            "Failed to parse configuration file at {}: {}",
            config_path.display(),
            e
        )
    })
}

/// Returns the path to the secret file: ~/.config/promptforge/secret.json
pub fn secret_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("secret.json"))
}

/// Resolves the API key from the environment or the secret file.
///
/// Returns `None` when no source provides a non-blank key; the caller
/// decides when that becomes an error.
pub fn resolve_api_key() -> Option<String> {
    resolve_api_key_with(|name| std::env::var(name).ok(), secret_path().as_deref())
}

pub(crate) fn resolve_api_key_with<F>(env: F, secret_file: Option<&Path>) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| env(*name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .or_else(|| {
            let path = secret_file?;
            match load_secret_config(path) {
                Ok(secret) => secret
                    .gemini
                    .map(|gemini| gemini.api_key.trim().to_string())
                    .filter(|key| !key.is_empty()),
                Err(message) => {
                    tracing::debug!("[Config] {}", message);
                    None
                }
            }
        })
}
