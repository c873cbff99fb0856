// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`locate`] finds the pull tool on `PATH` or through environment modules.
//! - [`command`] builds and runs a single `pull --force` child process.
//! - [`backend`] provides the `PullBackend` trait and the `RealPullBackend`
//!   used in production, which tests replace with a fake.

pub mod backend;
pub mod command;
pub mod locate;

pub use backend::{PullBackend, PullRequest, RealPullBackend};
pub use command::{build_pull_command, pull_argv, render_command, run_pull};
pub use locate::{locate_pull_tool, ModuleProbe, PullTool, ShellModuleProbe};
