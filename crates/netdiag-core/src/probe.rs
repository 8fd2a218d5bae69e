// SPDX-License-Identifier: Apache-2.0

//! Host probing (the ProcessInvocation collaborator seam).
//!
//! The launcher receives a program name and a discrete argument vector. No
//! shell or other interpreter ever parses a combined command line, so an
//! argument value cannot introduce additional arguments, pipes, redirections
//! or command chaining: the child's argv arity is exactly what the caller
//! passed.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::DiagError;

/// Launches external processes with a bounded execution time.
///
/// The handler consumes this as `&dyn ProcessLauncher`, so tests can
/// substitute a recording launcher and assert on the exact argv.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Runs `program` with `argv` as discrete argument elements and returns
    /// its stdout split into lines.
    async fn run(
        &self,
        program: &str,
        argv: &[String],
        timeout: Duration,
    ) -> Result<Vec<String>, DiagError>;
}

/// Process launcher backed by `tokio::process`.
///
/// The child inherits nothing: stdin is null, stdout and stderr are piped.
/// `kill_on_drop` terminates the child if the request is cancelled or the
/// timeout elapses, so nothing is left running past the handler's return.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLauncher;

#[async_trait]
impl ProcessLauncher for TokioLauncher {
    async fn run(
        &self,
        program: &str,
        argv: &[String],
        timeout: Duration,
    ) -> Result<Vec<String>, DiagError> {
        let child = Command::new(program)
            .args(argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DiagError::Process {
                message: format!("failed to launch {program}: {e}"),
            })?;

        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| DiagError::Process {
                message: format!("{program} timed out after {}s", timeout.as_secs()),
            })?
            .map_err(|e| DiagError::Process {
                message: format!("failed to collect {program} output: {e}"),
            })?;

        if !output.status.success() {
            return Err(DiagError::Process {
                message: format!("{program} exited with {}", output.status),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_owned)
            .collect())
    }
}
