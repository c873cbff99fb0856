// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{RawSettingsFile, Settings};
use crate::errors::Result;

/// Environment variable naming a settings file when `--config` is absent.
pub const CONFIG_ENV_VAR: &str = "CACHER_CONFIG";

/// Read and deserialize a settings file without semantic validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawSettingsFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let settings: RawSettingsFile = toml::from_str(&contents)?;

    Ok(settings)
}

/// Load and validate a settings file. `None` yields the built-in defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading settings file");
            let raw = load_from_path(path)?;
            Settings::try_from(raw)
        }
        None => Ok(Settings::default()),
    }
}

/// Pick the settings file: the `--config` flag wins over `CACHER_CONFIG`.
pub fn settings_path(cli_path: Option<&str>) -> Option<PathBuf> {
    cli_path
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
        .filter(|p| !p.as_os_str().is_empty())
}
