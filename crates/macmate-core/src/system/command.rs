//! Subprocess execution with a wall-clock timeout

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Run an external command and capture stdout.
///
/// A non-zero exit status is an error carrying stderr; exceeding `timeout`
/// abandons the process and reports the budget. The timed-out process is not
/// awaited further - its eventual output is discarded.
pub async fn run_command(program: &str, args: &[&str], timeout: Duration) -> Result<String> {
    debug!(program, ?args, "executing command");

    let output = tokio::time::timeout(
        timeout,
        Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output(),
    )
    .await
    .map_err(|_| {
        Error::PackageManager(format!(
            "command timed out after {}s: {} {}",
            timeout.as_secs(),
            program,
            args.join(" ")
        ))
    })?
    .map_err(Error::Io)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(Error::PackageManager(format!(
            "command failed ({}): {}",
            program, stderr
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout() {
        let out = run_command("echo", &["hello"], Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_error() {
        let result = run_command("sh", &["-c", "exit 3"], Duration::from_secs(5)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let result = run_command("sleep", &["5"], Duration::from_millis(50)).await;
        let err = result.unwrap_err().to_string();
        assert!(err.contains("timed out"), "unexpected error: {}", err);
    }
}
