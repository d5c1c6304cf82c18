use anyhow::{Context, Result, anyhow};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Expands `~` and environment variables in a command line, then splits it
/// into program and arguments with POSIX shell-word rules.
///
/// # Errors
/// Fails on an undefined variable, unbalanced quotes, or an empty command.
///
/// 展开命令行中的 `~` 和环境变量，然后按 POSIX shell 规则拆分为程序和参数。
pub fn split_command(command_line: &str) -> Result<Vec<String>> {
    let expanded = shellexpand::full(command_line)
        .with_context(|| format!("Failed to expand command: {command_line}"))?
        .to_string();

    let parts = shlex::split(&expanded)
        .ok_or_else(|| anyhow!("Failed to parse command: {}", expanded))?;

    if parts.is_empty() {
        return Err(anyhow!("Empty command after parsing."));
    }
    Ok(parts)
}

/// Expands a leading `~` and environment variables in a single program path.
pub fn expand_program(program: &str) -> String {
    shellexpand::full(program)
        .map(|expanded| expanded.to_string())
        .unwrap_or_else(|_| program.to_string())
}

/// Spawns a command and captures stdout and stderr separately.
/// Both streams are drained concurrently with waiting on the process, so a
/// chatty child cannot block on a full pipe.
///
/// # Arguments
/// * `cmd` - The `tokio::process::Command` to execute.
///
/// # Returns
/// A tuple containing:
/// - The `ExitStatus` of the process wrapped in an `io::Result`.
/// - The captured stdout.
/// - The captured stderr.
///
/// 派生一个命令，分别捕获其 stdout 和 stderr。
/// 两个输出流与等待进程并发读取，避免子进程因管道写满而阻塞。
pub async fn spawn_and_capture(
    mut cmd: tokio::process::Command,
) -> (std::io::Result<std::process::ExitStatus>, String, String) {
    let mut child = match cmd
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            // If spawning fails, we return the error and empty output.
            // 如果派生失败，我们返回错误和空输出。
            return (Err(e), String::new(), String::new());
        }
    };

    let Some(stdout) = child.stdout.take() else {
        return (
            Err(std::io::Error::other("failed to capture stdout")),
            String::new(),
            String::new(),
        );
    };
    let Some(stderr) = child.stderr.take() else {
        return (
            Err(std::io::Error::other("failed to capture stderr")),
            String::new(),
            String::new(),
        );
    };

    let (status, stdout, stderr) =
        tokio::join!(child.wait(), read_stream(stdout), read_stream(stderr));

    (status, stdout, stderr)
}

/// Reads a stream to its end; invalid UTF-8 is replaced rather than dropped.
async fn read_stream<R: AsyncRead + Unpin>(mut reader: R) -> String {
    let mut buf = Vec::new();
    if let Err(e) = reader.read_to_end(&mut buf).await {
        tracing::debug!(error = %e, "output stream closed early");
    }
    String::from_utf8_lossy(&buf).into_owned()
}
