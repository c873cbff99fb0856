// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::image::ImageRef;
use crate::retry::RetryPolicy;
use crate::types::SchedulerMode;

/// Optional settings file as read from TOML.
///
/// ```toml
/// [pull]
/// executable = "apptainer"
/// module = "apptainer/1.3"
/// ```
///
/// Every key is optional. The retry policy is fixed and has no section here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSettingsFile {
    #[serde(default)]
    pub pull: PullSection,
}

/// `[pull]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PullSection {
    /// Name or path of the container pull tool.
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Environment module to load when the executable is not on `PATH`.
    /// Defaults to the executable's file name.
    #[serde(default)]
    pub module: Option<String>,

    /// Variable pointing the tool at its internal cache. Derived from the
    /// executable name when omitted (`SINGULARITY_CACHEDIR`).
    #[serde(default)]
    pub cache_env: Option<String>,

    /// Shell that runs `module load`. Defaults to `bash`.
    #[serde(default)]
    pub module_shell: Option<String>,
}

fn default_executable() -> String {
    "singularity".to_string()
}

impl Default for PullSection {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            module: None,
            cache_env: None,
            module_shell: None,
        }
    }
}

/// Resolved pull tool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullToolSettings {
    pub executable: String,
    pub module: String,
    pub cache_env: String,
    pub module_shell: String,
}

/// Login shell used for `module load` unless configured otherwise.
pub const DEFAULT_MODULE_SHELL: &str = "bash";

impl PullToolSettings {
    /// Settings for the given executable with derived module and cache
    /// variable names.
    pub fn for_executable(executable: &str) -> Self {
        Self {
            executable: executable.to_string(),
            module: executable_name(executable).to_string(),
            cache_env: cache_env_for(executable),
            module_shell: DEFAULT_MODULE_SHELL.to_string(),
        }
    }

    /// File name of the executable, e.g. `singularity` for
    /// `/opt/singularity/bin/singularity`.
    pub fn executable_name(&self) -> &str {
        executable_name(&self.executable)
    }
}

impl Default for PullToolSettings {
    fn default() -> Self {
        Self::for_executable(&default_executable())
    }
}

fn executable_name(executable: &str) -> &str {
    Path::new(executable)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(executable)
}

/// `singularity` -> `SINGULARITY_CACHEDIR`.
pub(crate) fn cache_env_for(executable: &str) -> String {
    let name: String = executable_name(executable)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{name}_CACHEDIR")
}

/// Validated settings file.
///
/// Construct via `Settings::try_from(RawSettingsFile)` or
/// [`crate::config::loader::load_settings`]. `retry` is always the built-in
/// policy; only code (tests) may swap it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Settings {
    pub tool: PullToolSettings,
    pub retry: RetryPolicy,
}

/// Everything a cache run needs, fixed before any side effect happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub mode: SchedulerMode,
    /// Where pulled images land. Absolute and symlink-free once
    /// [`crate::config::prepare_dirs`] has run.
    pub cache_dir: PathBuf,
    /// The pull tool's own cache and scratch area.
    pub tmp_dir: PathBuf,
    /// Images in pull order.
    pub images: Vec<ImageRef>,
    pub retry: RetryPolicy,
    pub tool: PullToolSettings,
}
