//! # Command Execution Module / 命令执行模块
//!
//! Runs one external command to completion, bounded by a timeout and
//! cancellable through a token. This is the only place in the pipeline where
//! time bounds or cancellation apply.
//!
//! 运行一个外部命令直至完成，受超时限制并可通过令牌取消。
//! 这是流水线中唯一应用时间限制或取消的地方。

use std::path::Path;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    core::{error::PipelineError, models::CommandOutput},
    infra::command,
};

/// Executes a command line in `working_dir`.
///
/// # Arguments
/// * `command_line` - Shell-expanded and split into program and arguments
/// * `working_dir` - Directory the command runs in
/// * `timeout` - Upper bound on the run time
/// * `cancel` - Cancels the run (e.g. on Ctrl-C)
///
/// # Errors
/// * [`PipelineError::Execution`] if the command line is invalid, the
///   program cannot be started, or the run is cancelled.
/// * [`PipelineError::Timeout`] if the command exceeds `timeout`. The child
///   is killed and none of its output is returned.
pub async fn execute(
    command_line: &str,
    working_dir: &Path,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<CommandOutput, PipelineError> {
    let parts = command::split_command(command_line).map_err(|e| PipelineError::Execution {
        command: command_line.to_string(),
        reason: format!("{:#}", e),
    })?;
    execute_argv(&parts[0], &parts[1..], working_dir, timeout, cancel).await
}

/// Executes `program` with `args` without any shell processing.
///
/// Same contract as [`execute`].
pub async fn execute_argv<S: AsRef<str>>(
    program: &str,
    args: &[S],
    working_dir: &Path,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<CommandOutput, PipelineError> {
    let display_cmd = std::iter::once(program)
        .chain(args.iter().map(|a| a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ");
    tracing::info!(command = %display_cmd, dir = %working_dir.display(), "executing");

    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args.iter().map(|a| a.as_ref()))
        .kill_on_drop(true)
        .current_dir(working_dir);

    let start_time = Instant::now();
    let captured = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return Err(PipelineError::Execution {
                command: display_cmd.clone(),
                reason: "cancelled".to_string(),
            });
        }
        res = tokio::time::timeout(timeout, command::spawn_and_capture(cmd)) => res,
    };

    let (status_res, stdout, stderr) = captured.map_err(|_| PipelineError::Timeout {
        command: display_cmd.clone(),
        timeout_secs: timeout.as_secs(),
    })?;
    let status = status_res.map_err(|e| PipelineError::Execution {
        command: display_cmd.clone(),
        reason: e.to_string(),
    })?;
    let duration = start_time.elapsed();

    tracing::debug!(command = %display_cmd, code = ?status.code(), elapsed = ?duration, "finished");

    Ok(CommandOutput {
        code: status.code(),
        success: status.success(),
        stdout,
        stderr,
        duration,
    })
}
