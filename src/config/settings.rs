//! Layered tool settings.
//!
//! Settings are merged from three layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. User settings file (`$XDG_CONFIG_HOME/varspace/settings.toml`)
//! 3. Command-line overrides

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::definitions::{sha256_hex, toml_to_json};
use super::error::ConfigError;
use super::merge::merge_layers;

/// Log levels accepted by `log_level`.
const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// Output format of the command-line tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Human,
}

/// Effective settings values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Field kind used by declarations that do not name one.
    pub default_field: String,

    /// Log level for the command-line tool (`RUST_LOG` takes precedence).
    pub log_level: String,

    pub output: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_field: "typed".to_string(),
            log_level: "warn".to_string(),
            output: OutputFormat::Json,
        }
    }
}

/// Where a settings layer came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsOrigin {
    Builtin,
    User,
    Cli,
}

/// A contributing settings layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSource {
    pub origin: SettingsOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 of the raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Merged settings with the layers that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveSettings {
    pub settings: Settings,
    pub sources: Vec<SettingsSource>,
    pub created_at: DateTime<Utc>,
}

impl EffectiveSettings {
    /// Merge the built-in defaults, an optional user file and CLI overrides.
    ///
    /// A missing user file is skipped; an unreadable or invalid one is an error.
    pub fn build(user_path: Option<&Path>, cli_overrides: Option<Value>) -> Result<Self, ConfigError> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        let defaults = serde_json::to_value(Settings::default())
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        layers.push(defaults);
        sources.push(SettingsSource {
            origin: SettingsOrigin::Builtin,
            path: None,
            digest: None,
        });

        if let Some(path) = user_path {
            if path.exists() {
                let bytes = fs::read(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
                let digest = sha256_hex(&bytes);
                let contents = String::from_utf8(bytes)
                    .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;
                let table: toml::Value = toml::from_str(&contents)
                    .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;
                layers.push(toml_to_json(table)?);
                sources.push(SettingsSource {
                    origin: SettingsOrigin::User,
                    path: Some(path.to_string_lossy().to_string()),
                    digest: Some(digest),
                });
            }
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(SettingsSource {
                origin: SettingsOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        let settings: Settings = serde_json::from_value(merged)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        Self::validate(&settings)?;

        Ok(Self {
            settings,
            sources,
            created_at: Utc::now(),
        })
    }

    fn validate(settings: &Settings) -> Result<(), ConfigError> {
        if settings.default_field.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "default_field must not be empty".to_string(),
            ));
        }
        if !LOG_LEVELS.contains(&settings.log_level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}

/// Default location of the user settings file.
pub fn default_settings_path() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .map(|base| base.join("varspace").join("settings.toml"))
}
