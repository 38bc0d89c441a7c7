//! Async command execution with timeout.

use super::find_executable;
use crate::{EnvironmentMap, ProbeError};
use std::future::Future;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// How a command should be run.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Complete environment of the child. The parent's environment is not inherited.
    pub env: EnvironmentMap,
    /// Append stderr to stdout instead of returning it separately.
    pub merge_std_out_err: bool,
    /// Treat any stderr output as a failure.
    pub throw_on_std_err: bool,
    /// Time limit for this command, overriding the executor's default.
    pub timeout: Option<Duration>,
}

/// Captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Standard output, with stderr appended when streams were merged.
    pub stdout: String,
    /// Standard error, `None` when it was merged into stdout.
    pub stderr: Option<String>,
}

/// Capability to run an external command and capture its output.
///
/// A non-zero exit status is not an error; only failing to run the command
/// (or stderr output with `throw_on_std_err`) is.
pub trait ProcessExecutor: Send + Sync {
    /// Run `program` with `args` and wait for it to finish.
    fn exec(
        &self,
        program: &str,
        args: &[&str],
        options: ExecOptions,
    ) -> impl Future<Output = Result<ExecOutput, ProbeError>> + Send;
}

impl<T: ProcessExecutor + ?Sized> ProcessExecutor for Arc<T> {
    fn exec(
        &self,
        program: &str,
        args: &[&str],
        options: ExecOptions,
    ) -> impl Future<Output = Result<ExecOutput, ProbeError>> + Send {
        (**self).exec(program, args, options)
    }
}

/// [`ProcessExecutor`] backed by `tokio::process`.
///
/// Every command is wrapped in a timeout and killed if it does not finish,
/// so an interpreter stuck on startup cannot hold a probe forever.
#[derive(Debug, Clone)]
pub struct TokioProcessExecutor {
    timeout: Duration,
}

impl TokioProcessExecutor {
    /// Create an executor that gives each command `timeout` to finish,
    /// unless [`ExecOptions::timeout`] says otherwise.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TokioProcessExecutor {
    fn default() -> Self {
        Self::new(crate::ProbeOptions::default().timeout)
    }
}

impl ProcessExecutor for TokioProcessExecutor {
    async fn exec(
        &self,
        program: &str,
        args: &[&str],
        options: ExecOptions,
    ) -> Result<ExecOutput, ProbeError> {
        let spawn_failure = |message: String| ProbeError::SpawnFailure {
            program: program.to_string(),
            message,
        };

        let resolved = find_executable(program, &options.env)
            .ok_or_else(|| spawn_failure("executable not found".to_string()))?;

        let limit = options.timeout.unwrap_or(self.timeout);
        let output = timeout(
            limit,
            Command::new(&resolved)
                .args(args)
                .env_clear()
                .envs(&options.env)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| ProbeError::Timeout(limit))?
        .map_err(|e| spawn_failure(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if options.throw_on_std_err && !stderr.trim().is_empty() {
            return Err(ProbeError::StdErr(stderr));
        }

        if options.merge_std_out_err {
            let mut merged = stdout;
            if !merged.is_empty() && !merged.ends_with('\n') && !stderr.is_empty() {
                merged.push('\n');
            }
            merged.push_str(&stderr);
            Ok(ExecOutput {
                stdout: merged,
                stderr: None,
            })
        } else {
            Ok(ExecOutput {
                stdout,
                stderr: Some(stderr),
            })
        }
    }
}
