// src/config/validate.rs

use crate::config::model::{cache_env_for, PullToolSettings, RawSettingsFile, Settings};
use crate::errors::{CacherError, Result};
use crate::retry::RetryPolicy;

impl TryFrom<RawSettingsFile> for Settings {
    type Error = CacherError;

    fn try_from(raw: RawSettingsFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_settings(&raw)?;

        let executable = raw.pull.executable.trim().to_string();
        let mut tool = PullToolSettings::for_executable(&executable);
        if let Some(module) = raw.pull.module {
            tool.module = module.trim().to_string();
        }
        if let Some(shell) = raw.pull.module_shell {
            tool.module_shell = shell.trim().to_string();
        }
        tool.cache_env = raw
            .pull
            .cache_env
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| cache_env_for(&executable));

        Ok(Settings {
            tool,
            retry: RetryPolicy::default(),
        })
    }
}

fn validate_raw_settings(raw: &RawSettingsFile) -> Result<()> {
    validate_pull_section(raw)?;
    Ok(())
}

fn validate_pull_section(raw: &RawSettingsFile) -> Result<()> {
    if raw.pull.executable.trim().is_empty() {
        return Err(CacherError::Config(
            "[pull].executable must not be empty".to_string(),
        ));
    }

    for (key, value) in [
        ("module", &raw.pull.module),
        ("module_shell", &raw.pull.module_shell),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(CacherError::Config(format!(
                "[pull].{key} must not be empty when set"
            )));
        }
    }

    if let Some(var) = &raw.pull.cache_env {
        let var = var.trim();
        let valid = !var.is_empty()
            && !var.starts_with(|c: char| c.is_ascii_digit())
            && var.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(CacherError::Config(format!(
                "[pull].cache_env '{var}' is not a valid environment variable name"
            )));
        }
    }

    Ok(())
}
