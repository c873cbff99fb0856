// src/exec/locate.rs

//! Discovery of the container pull tool.
//!
//! Lookup order:
//! 1. an explicit path (`executable` contains a `/`), or a `PATH` search;
//! 2. `module load <module>` in a login shell, asking the shell where the
//!    executable is afterwards.
//!
//! A tool found through a module is always invoked through the same
//! `module load` shell (`bash` unless `[pull].module_shell` says otherwise),
//! since the module may also set library paths.

use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::model::DEFAULT_MODULE_SHELL;
use crate::config::PullToolSettings;
use crate::errors::{CacherError, Result};
use crate::fs::FileSystem;

/// A located pull tool, ready to build commands from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullTool {
    pub executable: PathBuf,
    /// Environment module that must be loaded before running `executable`.
    pub module: Option<String>,
    /// Variable the tool reads its cache directory from.
    pub cache_env: String,
    /// Login shell that runs `module load`; unused without a module.
    pub module_shell: PathBuf,
}

impl PullTool {
    pub fn direct(executable: impl Into<PathBuf>, cache_env: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            module: None,
            cache_env: cache_env.into(),
            module_shell: PathBuf::from(DEFAULT_MODULE_SHELL),
        }
    }

    pub fn via_module(
        executable: impl Into<PathBuf>,
        module: impl Into<String>,
        cache_env: impl Into<String>,
    ) -> Self {
        Self {
            executable: executable.into(),
            module: Some(module.into()),
            cache_env: cache_env.into(),
            module_shell: PathBuf::from(DEFAULT_MODULE_SHELL),
        }
    }

    pub fn with_module_shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.module_shell = shell.into();
        self
    }
}

/// Asks the environment-module system for an executable.
pub trait ModuleProbe: Send + Sync {
    /// Load `module` and return the resolved path of `executable`, or `None`
    /// if the module or the executable is unavailable.
    fn probe<'a>(
        &'a self,
        module: &'a str,
        executable: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<PathBuf>> + Send + 'a>>;
}

/// Probe that runs `module load` in a login shell.
#[derive(Debug, Clone)]
pub struct ShellModuleProbe {
    shell: PathBuf,
}

impl ShellModuleProbe {
    pub fn new(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellModuleProbe {
    fn default() -> Self {
        Self::new(DEFAULT_MODULE_SHELL)
    }
}

impl ModuleProbe for ShellModuleProbe {
    fn probe<'a>(
        &'a self,
        module: &'a str,
        executable: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<PathBuf>> + Send + 'a>> {
        Box::pin(async move {
            let output = Command::new(&self.shell)
                .arg("-lc")
                .arg(r#"module load "$0" >/dev/null 2>&1 && command -v "$1""#)
                .arg(module)
                .arg(executable)
                .stdin(Stdio::null())
                .stderr(Stdio::null())
                .output()
                .await;

            match output {
                Ok(out) if out.status.success() => {
                    let found = String::from_utf8_lossy(&out.stdout).trim().to_string();
                    (!found.is_empty()).then(|| PathBuf::from(found))
                }
                Ok(out) => {
                    debug!(module, status = ?out.status.code(), "module probe failed");
                    None
                }
                Err(e) => {
                    debug!(module, error = %e, "could not run module probe shell");
                    None
                }
            }
        })
    }
}

/// Search `path_var` (a `PATH`-style list) for an executable named `name`.
pub fn find_in_path(fs: &dyn FileSystem, name: &str, path_var: Option<&OsString>) -> Option<PathBuf> {
    if name.contains('/') {
        let candidate = Path::new(name);
        return fs.is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let path_var = path_var?;
    std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| fs.is_executable(candidate))
}

/// Find the configured pull tool, falling back to environment modules.
pub async fn locate_pull_tool(
    fs: &dyn FileSystem,
    settings: &PullToolSettings,
    path_var: Option<OsString>,
    probe: &dyn ModuleProbe,
) -> Result<PullTool> {
    if let Some(found) = find_in_path(fs, &settings.executable, path_var.as_ref()) {
        debug!(executable = %found.display(), "pull tool found");
        return Ok(PullTool::direct(found, settings.cache_env.clone()));
    }

    warn!(
        executable = %settings.executable,
        module = %settings.module,
        "pull tool not found; trying environment module"
    );

    match probe.probe(&settings.module, settings.executable_name()).await {
        Some(found) => {
            info!(
                executable = %found.display(),
                module = %settings.module,
                "pull tool loaded from module"
            );
            Ok(PullTool::via_module(
                found,
                settings.module.clone(),
                settings.cache_env.clone(),
            )
            .with_module_shell(&settings.module_shell))
        }
        None => Err(CacherError::DependencyMissing(format!(
            "'{}' is not on PATH and could not be loaded with `module load {}`",
            settings.executable, settings.module
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    struct FixedProbe(Option<&'static str>);

    impl ModuleProbe for FixedProbe {
        fn probe<'a>(
            &'a self,
            _module: &'a str,
            _executable: &'a str,
        ) -> Pin<Box<dyn Future<Output = Option<PathBuf>> + Send + 'a>> {
            Box::pin(async move { self.0.map(PathBuf::from) })
        }
    }

    fn path_var(dirs: &[&str]) -> Option<OsString> {
        Some(std::env::join_paths(dirs).unwrap())
    }

    #[test]
    fn finds_first_executable_on_path() {
        let fs = MockFileSystem::new();
        fs.add_file("/usr/bin/singularity");
        fs.add_executable("/opt/sing/bin/singularity");
        fs.add_executable("/usr/local/bin/singularity");

        let found = find_in_path(
            &fs,
            "singularity",
            path_var(&["/usr/bin", "/opt/sing/bin", "/usr/local/bin"]).as_ref(),
        );
        assert_eq!(found, Some(PathBuf::from("/opt/sing/bin/singularity")));
    }

    #[test]
    fn explicit_path_skips_path_search() {
        let fs = MockFileSystem::new();
        fs.add_executable("/opt/apptainer/bin/apptainer");

        let found = find_in_path(&fs, "/opt/apptainer/bin/apptainer", None);
        assert_eq!(found, Some(PathBuf::from("/opt/apptainer/bin/apptainer")));
    }

    #[tokio::test]
    async fn falls_back_to_module() {
        let fs = MockFileSystem::new();
        let tool = locate_pull_tool(
            &fs,
            &PullToolSettings::default(),
            path_var(&["/usr/bin"]),
            &FixedProbe(Some("/apps/singularity/3.8/bin/singularity")),
        )
        .await
        .unwrap();

        assert_eq!(tool.module.as_deref(), Some("singularity"));
        assert_eq!(tool.module_shell, PathBuf::from("bash"));
        assert_eq!(tool.executable, PathBuf::from("/apps/singularity/3.8/bin/singularity"));
        assert_eq!(tool.cache_env, "SINGULARITY_CACHEDIR");
    }

    #[tokio::test]
    async fn missing_everywhere_is_dependency_error() {
        let fs = MockFileSystem::new();
        let err = locate_pull_tool(&fs, &PullToolSettings::default(), None, &FixedProbe(None))
            .await
            .unwrap_err();

        assert!(matches!(err, CacherError::DependencyMissing(_)));
    }
}
