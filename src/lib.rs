// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod image;
pub mod logging;
pub mod pull;
pub mod retry;
pub mod types;

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{build_config, current_user, load_settings, prepare_dirs, settings_path, CacheConfig};
use crate::errors::Result;
use crate::exec::{locate_pull_tool, pull_argv, render_command, PullTool, RealPullBackend, ShellModuleProbe};
use crate::fs::RealFileSystem;
use crate::pull::{pull_all, PullSummary};
use crate::retry::TokioSleeper;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings + CLI layering
/// - directory preparation
/// - pull tool discovery
/// - the sequential, retried pull of every image
pub async fn run(args: CliArgs) -> Result<()> {
    let settings = load_settings(settings_path(args.config.as_deref()).as_deref())?;
    let user = current_user();
    let config = build_config(&args, settings, user.as_deref())?;

    if args.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    let fs = RealFileSystem;
    let config = prepare_dirs(&fs, config)?;

    let tool = locate_pull_tool(
        &fs,
        &config.tool,
        std::env::var_os("PATH"),
        &ShellModuleProbe::new(&config.tool.module_shell),
    )
    .await?;
    let backend = RealPullBackend::new(tool);

    let summary = pull_all(&config, &backend, &TokioSleeper).await?;
    log_summary(&summary);
    Ok(())
}

fn log_summary(summary: &PullSummary) {
    for report in summary.retried() {
        info!(
            image = %report.image,
            attempts = report.attempts,
            "image needed retries"
        );
    }
    info!(
        mode = %summary.mode,
        images = summary.reports.len(),
        attempts = summary.total_attempts(),
        "cache run complete"
    );
}

/// Print the pull plan: settings, and per image the command and target file.
fn print_dry_run(cfg: &CacheConfig) {
    println!("cacher dry-run");
    println!("  mode = {}", cfg.mode);
    println!("  sif_cache = {}", cfg.cache_dir.display());
    println!("  tmp_dir = {}", cfg.tmp_dir.display());
    println!(
        "  retry = {} attempts, backoff {}^n seconds",
        cfg.retry.max_attempts, cfg.retry.base_delay_secs
    );
    println!("  {} = {}", cfg.tool.cache_env, cfg.tmp_dir.display());
    println!(
        "  module fallback = {} -lc 'module load {}'",
        cfg.tool.module_shell, cfg.tool.module
    );
    println!();

    // The tool is not located in dry-run mode; show the configured name.
    let tool = PullTool::direct(&cfg.tool.executable, cfg.tool.cache_env.clone());

    println!("images ({}):", cfg.images.len());
    for (idx, image) in cfg.images.iter().enumerate() {
        let (program, args) = pull_argv(&tool, image);
        println!("  {}. {image}", idx + 1);
        println!("      cmd: {}", render_command(&program, &args));
        println!(
            "      file: {}",
            cfg.cache_dir.join(image.sif_file_name()).display()
        );
    }

    debug!("dry-run complete (no pull executed)");
}
