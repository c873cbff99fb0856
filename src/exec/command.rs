// src/exec/command.rs

//! Building and running a single `pull --force` invocation.

use std::ffi::OsString;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use super::backend::PullRequest;
use super::locate::PullTool;
use crate::image::ImageRef;

/// Variable cleared for the pull child; the tool warns when it points to a
/// directory owned by another session.
pub const RUNTIME_DIR_ENV: &str = "XDG_RUNTIME_DIR";

/// Program and arguments for pulling `image` with `tool`, without the
/// environment and working directory.
pub fn pull_argv(tool: &PullTool, image: &ImageRef) -> (OsString, Vec<OsString>) {
    let pull_args = [
        OsString::from("pull"),
        OsString::from("--force"),
        OsString::from(image.uri()),
    ];

    match &tool.module {
        None => (tool.executable.clone().into_os_string(), pull_args.to_vec()),
        Some(module) => {
            let mut args = vec![
                OsString::from("-lc"),
                OsString::from(r#"module load "$0" >/dev/null 2>&1 && exec "$@""#),
                OsString::from(module),
                tool.executable.clone().into_os_string(),
            ];
            args.extend(pull_args);
            (tool.module_shell.clone().into_os_string(), args)
        }
    }
}

/// Human-readable command line, used for logs and `--dry-run`.
pub fn render_command(program: &OsString, args: &[OsString]) -> String {
    std::iter::once(program)
        .chain(args)
        .map(|a| {
            let s = a.to_string_lossy();
            if s.is_empty() || s.contains(|c: char| c.is_whitespace() || c == '"' || c == '$') {
                format!("'{}'", s.replace('\'', r"'\''"))
            } else {
                s.into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Full command for one pull: runs in the cache dir, with the tool's cache
/// variable pointing at the temp dir and `XDG_RUNTIME_DIR` removed.
pub fn build_pull_command(tool: &PullTool, request: &PullRequest) -> Command {
    let (program, args) = pull_argv(tool, &request.image);

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(&request.cache_dir)
        .env(&tool.cache_env, &request.tmp_dir)
        .env_remove(RUNTIME_DIR_ENV)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Run one pull attempt to completion. A non-zero exit is an error.
pub async fn run_pull(tool: &PullTool, request: &PullRequest, attempt: u32) -> Result<()> {
    let image = request.image.uri();
    let (program, args) = pull_argv(tool, &request.image);
    info!(
        image,
        attempt,
        cmd = %render_command(&program, &args),
        "starting pull"
    );

    let mut child = build_pull_command(tool, request)
        .spawn()
        .with_context(|| format!("spawning {} for '{image}'", tool.executable.display()))?;

    // Always consume both pipes so the tool never blocks on a full buffer.
    let stdout = child.stdout.take().map(|s| relay_lines(s, image.to_string(), "stdout"));
    let stderr = child.stderr.take().map(|s| relay_lines(s, image.to_string(), "stderr"));

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for pull of '{image}'"))?;

    for relay in [stdout, stderr].into_iter().flatten() {
        let _ = relay.await;
    }

    let code = status.code().unwrap_or(-1);
    debug!(image, attempt, exit_code = code, "pull process exited");

    if !status.success() {
        bail!("pull of '{image}' exited with status {code}");
    }
    Ok(())
}

fn relay_lines<R>(stream: R, image: String, name: &'static str) -> tokio::task::JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(image = %image, stream = name, "{}", line);
        }
    })
}
