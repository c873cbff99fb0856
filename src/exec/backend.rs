// src/exec/backend.rs

//! Pluggable pull backend abstraction.
//!
//! The orchestrator talks to a `PullBackend` instead of spawning processes
//! itself. Production uses [`RealPullBackend`], which runs the located pull
//! tool; tests swap in a fake that records requests and scripts failures.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use anyhow::Result;

use crate::image::ImageRef;

use super::command::run_pull;
use super::locate::PullTool;

/// One image to pull, plus where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub image: ImageRef,
    /// Working directory of the pull; the image file lands here.
    pub cache_dir: PathBuf,
    /// Exported to the tool as its internal cache directory.
    pub tmp_dir: PathBuf,
}

/// Trait abstracting how a single pull attempt is executed.
pub trait PullBackend: Send + Sync {
    /// Run one attempt. `Err` means the attempt failed and may be retried.
    fn pull<'a>(
        &'a self,
        request: &'a PullRequest,
        attempt: u32,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Backend that runs the real container pull tool.
#[derive(Debug, Clone)]
pub struct RealPullBackend {
    tool: PullTool,
}

impl RealPullBackend {
    pub fn new(tool: PullTool) -> Self {
        Self { tool }
    }
}

impl PullBackend for RealPullBackend {
    fn pull<'a>(
        &'a self,
        request: &'a PullRequest,
        attempt: u32,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(run_pull(&self.tool, request, attempt))
    }
}
