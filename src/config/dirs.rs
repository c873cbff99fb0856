// src/config/dirs.rs

//! Directory defaults and preparation.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::model::{CacheConfig, PullToolSettings};
use crate::errors::{CacherError, Result};
use crate::fs::FileSystem;

/// Name used for the per-user scratch directory.
pub const APP_DIR_NAME: &str = "cacher";

/// Current login name from `USER`, falling back to `LOGNAME`.
pub fn current_user() -> Option<String> {
    ["USER", "LOGNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// `/tmp/<user>/cacher/.<tool>`, e.g. `/tmp/alice/cacher/.singularity`.
pub fn default_tmp_dir(user: Option<&str>, tool: &PullToolSettings) -> Result<PathBuf> {
    let user = user.filter(|u| !u.is_empty()).ok_or_else(|| {
        CacherError::Usage(
            "cannot derive a default temp dir: USER is not set; pass --tmp-dir".to_string(),
        )
    })?;

    Ok(Path::new("/tmp")
        .join(user)
        .join(APP_DIR_NAME)
        .join(format!(".{}", tool.executable_name())))
}

/// Create the cache and temp directories (with parents) and return a config
/// whose directories are absolute and symlink-resolved.
pub fn prepare_dirs(fs: &dyn FileSystem, config: CacheConfig) -> Result<CacheConfig> {
    let cache_dir = materialize(fs, &config.cache_dir, "cache")?;
    let tmp_dir = materialize(fs, &config.tmp_dir, "temp")?;

    info!(
        cache_dir = %cache_dir.display(),
        tmp_dir = %tmp_dir.display(),
        "directories prepared"
    );

    Ok(CacheConfig {
        cache_dir,
        tmp_dir,
        ..config
    })
}

fn materialize(fs: &dyn FileSystem, path: &Path, what: &str) -> Result<PathBuf> {
    if !fs.is_dir(path) {
        debug!(path = %path.display(), "creating {what} directory");
    }
    fs.create_dir_all(path)
        .map_err(|e| e.context(format!("preparing {what} directory")))?;
    let resolved = fs.canonicalize(path)?;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::image::ImageRef;
    use crate::retry::RetryPolicy;
    use crate::types::SchedulerMode;

    fn config(cache: &str, tmp: &str) -> CacheConfig {
        CacheConfig {
            mode: SchedulerMode::Slurm,
            cache_dir: PathBuf::from(cache),
            tmp_dir: PathBuf::from(tmp),
            images: vec![ImageRef::parse("docker://example/a:1.0").unwrap()],
            retry: RetryPolicy::default(),
            tool: PullToolSettings::default(),
        }
    }

    #[test]
    fn default_tmp_dir_includes_user_and_tool() {
        let dir = default_tmp_dir(Some("alice"), &PullToolSettings::default()).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/alice/cacher/.singularity"));

        let apptainer = PullToolSettings::for_executable("/opt/bin/apptainer");
        let dir = default_tmp_dir(Some("bob"), &apptainer).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/bob/cacher/.apptainer"));
    }

    #[test]
    fn default_tmp_dir_requires_user() {
        let err = default_tmp_dir(None, &PullToolSettings::default()).unwrap_err();
        assert!(matches!(err, CacherError::Usage(_)));
        assert!(default_tmp_dir(Some(""), &PullToolSettings::default()).is_err());
    }

    #[test]
    fn prepare_creates_missing_dirs() {
        let fs = MockFileSystem::new();
        let prepared = prepare_dirs(&fs, config("/data/cache", "/tmp/u/cacher/.singularity")).unwrap();

        assert_eq!(prepared.cache_dir, PathBuf::from("/data/cache"));
        assert!(fs.is_dir(Path::new("/data/cache")));
        assert!(fs.is_dir(Path::new("/tmp/u/cacher/.singularity")));
        assert!(fs.is_dir(Path::new("/tmp/u/cacher")));
    }

    #[test]
    fn prepare_resolves_symlinked_cache() {
        let fs = MockFileSystem::new();
        fs.add_dir("/scratch/real-cache");
        fs.add_symlink("/home/u/cache", "/scratch/real-cache");

        let prepared = prepare_dirs(&fs, config("/home/u/cache", "/tmp/u")).unwrap();
        assert_eq!(prepared.cache_dir, PathBuf::from("/scratch/real-cache"));
    }

    #[test]
    fn prepare_fails_when_cache_is_a_file() {
        let fs = MockFileSystem::new();
        fs.add_file("/data/cache");

        let err = prepare_dirs(&fs, config("/data/cache", "/tmp/u")).unwrap_err();
        assert!(matches!(err, CacherError::Other(_)));
    }
}
