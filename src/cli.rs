// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! clap exits with status 2 on usage errors; the cacher contract is 1, so
//! `main` uses [`try_parse`] and maps the error through [`exit_code_for`].

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, ValueEnum};

use crate::image::{parse_image_list, ImageRef};
use crate::types::SchedulerMode;

/// Command-line arguments for `cacher`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cacher",
    version,
    about = "Pull container images into a shared SIF cache for pipeline jobs.",
    long_about = None,
    arg_required_else_help = true
)]
pub struct CliArgs {
    /// Scheduler backend the cache job runs under.
    #[arg(value_enum, value_name = "MODE")]
    pub mode: SchedulerMode,

    /// Directory the pulled images are written to. Created if missing.
    #[arg(short = 's', long = "sif-cache", value_name = "PATH", value_parser = non_empty_path)]
    pub sif_cache: PathBuf,

    /// Comma-separated image URIs, pulled in the given order.
    #[arg(short = 'i', long = "image-uris", value_name = "URIS", value_parser = parse_image_uris)]
    pub image_uris: ImageList,

    /// Scratch directory for the pull tool's own cache.
    ///
    /// Default: `/tmp/$USER/cacher/.singularity`.
    #[arg(short = 't', long = "tmp-dir", value_name = "PATH", value_parser = non_empty_path)]
    pub tmp_dir: Option<PathBuf>,

    /// Optional TOML settings file (pull tool, retry policy).
    ///
    /// Falls back to `CACHER_CONFIG` when omitted.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CACHER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate arguments and print the pull plan without touching disk.
    #[arg(long)]
    pub dry_run: bool,
}

/// Ordered, non-empty list of images from `--image-uris`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageList(pub Vec<ImageRef>);

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn non_empty_path(s: &str) -> Result<PathBuf, String> {
    if s.trim().is_empty() {
        return Err("value must not be empty".to_string());
    }
    Ok(PathBuf::from(s))
}

fn parse_image_uris(s: &str) -> Result<ImageList, String> {
    parse_image_list(s).map(ImageList)
}

/// Parse the process arguments without exiting on error.
pub fn try_parse() -> Result<CliArgs, clap::Error> {
    CliArgs::try_parse()
}

/// Parse an explicit argument list (first item is the program name).
pub fn try_parse_from<I, T>(args: I) -> Result<CliArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CliArgs::try_parse_from(args)
}

/// The `Usage:` line clap prints, for usage errors found after parsing.
pub fn render_usage() -> String {
    CliArgs::command().render_usage().to_string()
}

/// Exit status for a parse failure: 0 for `--help`/`--version`, 1 otherwise.
pub fn exit_code_for(err: &clap::Error) -> i32 {
    if err.use_stderr() { 1 } else { 0 }
}
