// src/config/mod.rs

//! Configuration for a cache run.
//!
//! Layering: command-line flags, then the optional TOML settings file, then
//! built-in defaults. The result is an immutable [`CacheConfig`].

pub mod dirs;
pub mod loader;
pub mod model;
pub mod validate;

pub use dirs::{current_user, default_tmp_dir, prepare_dirs};
pub use loader::{load_settings, settings_path};
pub use model::{CacheConfig, PullToolSettings, RawSettingsFile, Settings};

use crate::cli::CliArgs;
use crate::errors::Result;

/// Combine parsed CLI arguments with loaded settings.
///
/// Paths are taken as given; [`prepare_dirs`] creates and resolves them.
pub fn build_config(args: &CliArgs, settings: Settings, user: Option<&str>) -> Result<CacheConfig> {
    let tmp_dir = match &args.tmp_dir {
        Some(dir) => dir.clone(),
        None => default_tmp_dir(user, &settings.tool)?,
    };

    Ok(CacheConfig {
        mode: args.mode,
        cache_dir: args.sif_cache.clone(),
        tmp_dir,
        images: args.image_uris.0.clone(),
        retry: settings.retry,
        tool: settings.tool,
    })
}
