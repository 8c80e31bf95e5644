//! Definition files and tool settings.
//!
//! Definitions are read from TOML files. Settings merge built-in defaults,
//! the user settings file and command-line overrides, later layers winning.

mod definitions;
mod error;
mod merge;
mod settings;

pub use definitions::{load_file, load_paths, parse_str, DefinitionSource, LoadedDefinitions};
pub use error::ConfigError;
pub use merge::{merge_into, merge_layers};
pub use settings::{
    default_settings_path, EffectiveSettings, OutputFormat, Settings, SettingsOrigin,
    SettingsSource,
};
