#![allow(dead_code)]

use std::path::{Path, PathBuf};

use cacher::config::{CacheConfig, PullToolSettings};
use cacher::image::ImageRef;
use cacher::retry::RetryPolicy;
use cacher::types::SchedulerMode;

/// Builder for `CacheConfig` to simplify test setup.
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: CacheConfig {
                mode: SchedulerMode::Slurm,
                cache_dir: PathBuf::from("/data/sif-cache"),
                tmp_dir: PathBuf::from("/tmp/tester/cacher/.singularity"),
                images: Vec::new(),
                retry: RetryPolicy::default(),
                tool: PullToolSettings::default(),
            },
        }
    }

    pub fn image(mut self, uri: &str) -> Self {
        let image = ImageRef::parse(uri).expect("test image URI must be valid");
        self.config.images.push(image);
        self
    }

    pub fn cache_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.cache_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn tmp_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.tmp_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn retry(mut self, max_attempts: u32, base_delay_secs: u64) -> Self {
        self.config.retry = RetryPolicy::new(max_attempts, base_delay_secs);
        self
    }

    pub fn build(self) -> CacheConfig {
        assert!(
            !self.config.images.is_empty(),
            "CacheConfigBuilder needs at least one image"
        );
        self.config
    }
}

impl Default for CacheConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
