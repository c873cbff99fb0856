// src/pull.rs

//! Pull orchestration: one image at a time, in list order, each wrapped in
//! the retry policy. The first image that exhausts its attempts ends the run.

use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::config::CacheConfig;
use crate::errors::{CacherError, Result};
use crate::exec::{PullBackend, PullRequest};
use crate::image::ImageRef;
use crate::retry::{retry_with_backoff, Sleeper};
use crate::types::SchedulerMode;

/// Result of a successful pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullReport {
    pub image: ImageRef,
    pub attempts: u32,
    pub elapsed: Duration,
}

/// All images of a run, in pull order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullSummary {
    pub mode: SchedulerMode,
    pub reports: Vec<PullReport>,
}

impl PullSummary {
    /// Attempts across all images; equals the image count when nothing was
    /// retried.
    pub fn total_attempts(&self) -> u32 {
        self.reports.iter().map(|r| r.attempts).sum()
    }

    pub fn retried(&self) -> impl Iterator<Item = &PullReport> {
        self.reports.iter().filter(|r| r.attempts > 1)
    }
}

/// Pull every image in `config` using the backend for its scheduler mode.
pub async fn pull_all(
    config: &CacheConfig,
    backend: &dyn PullBackend,
    sleeper: &dyn Sleeper,
) -> Result<PullSummary> {
    match config.mode {
        SchedulerMode::Slurm => pull_sequentially(config, backend, sleeper).await,
    }
}

async fn pull_sequentially(
    config: &CacheConfig,
    backend: &dyn PullBackend,
    sleeper: &dyn Sleeper,
) -> Result<PullSummary> {
    let total = config.images.len();
    let mut reports = Vec::with_capacity(total);

    info!(
        mode = %config.mode,
        images = total,
        cache_dir = %config.cache_dir.display(),
        tmp_dir = %config.tmp_dir.display(),
        "pulling images"
    );

    for (idx, image) in config.images.iter().enumerate() {
        let request = PullRequest {
            image: image.clone(),
            cache_dir: config.cache_dir.clone(),
            tmp_dir: config.tmp_dir.clone(),
        };
        let request = &request;

        info!(image = %image, position = idx + 1, of = total, "pulling image");
        let started = Instant::now();

        let retried = retry_with_backoff(&config.retry, sleeper, image.uri(), move |attempt| {
            backend.pull(request, attempt)
        })
        .await;

        match retried {
            Ok(done) => {
                let elapsed = started.elapsed();
                info!(
                    image = %image,
                    attempts = done.attempts,
                    elapsed_secs = elapsed.as_secs(),
                    "image cached"
                );
                reports.push(PullReport {
                    image: image.clone(),
                    attempts: done.attempts,
                    elapsed,
                });
            }
            Err(exhausted) => {
                error!(
                    image = %image,
                    attempts = exhausted.attempts,
                    error = %exhausted.last_error,
                    skipped = total - idx - 1,
                    "giving up on image; aborting cache run"
                );
                return Err(CacherError::ExhaustedRetries {
                    image: image.uri().to_string(),
                    attempts: exhausted.attempts,
                });
            }
        }
    }

    Ok(PullSummary {
        mode: config.mode,
        reports,
    })
}
