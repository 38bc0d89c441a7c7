//! Terminal shell environment capture.

use super::EnvironmentMap;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Kind of shell an environment was captured from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[non_exhaustive]
pub enum ShellType {
    /// Bourne Again Shell.
    Bash,
    /// Z shell.
    Zsh,
    /// fish.
    Fish,
    /// POSIX `sh`.
    Sh,
    /// KornShell.
    Ksh,
    /// tcsh.
    Tcsh,
    /// C shell.
    Csh,
    /// Nushell (`nu`).
    Nushell,
    /// PowerShell, Windows or Core (`pwsh`).
    #[strum(to_string = "powershell", serialize = "pwsh")]
    PowerShell,
    /// Windows `cmd.exe`.
    Cmd,
    /// Windows Subsystem for Linux.
    Wsl,
    /// Git for Windows bash.
    GitBash,
    /// Unrecognised shell.
    Other,
}

impl ShellType {
    /// Classify a shell from its executable path (`/bin/zsh`, `C:\...\pwsh.exe`).
    ///
    /// ```rust
    /// use jupyter_detection::ShellType;
    ///
    /// assert_eq!(ShellType::from_shell_path("/usr/bin/zsh"), ShellType::Zsh);
    /// assert_eq!(ShellType::from_shell_path("/opt/unknown-shell"), ShellType::Other);
    /// ```
    pub fn from_shell_path(path: impl AsRef<Path>) -> Self {
        let stem = path
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match stem.as_str() {
            "nu" => Self::Nushell,
            "git-bash" => Self::GitBash,
            _ => stem.parse().unwrap_or(Self::Other),
        }
    }
}

/// Environment captured from a terminal, with the shell it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellEnvironment {
    /// Exported variables.
    pub env: EnvironmentMap,
    /// Shell that produced them, if known.
    pub shell: Option<ShellType>,
}

/// Source of the environment a user's terminal would give them.
pub trait TerminalEnvironment: Send + Sync {
    /// Capture the environment, or `None` if it cannot be determined.
    fn environment(&self) -> impl Future<Output = Option<ShellEnvironment>> + Send;
}

/// A fixed snapshot, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment(pub Option<ShellEnvironment>);

impl TerminalEnvironment for StaticEnvironment {
    async fn environment(&self) -> Option<ShellEnvironment> {
        self.0.clone()
    }
}

/// Captures the environment of the user's login shell.
///
/// Runs `$SHELL -l -c "env -0"` and parses the NUL-separated output, so
/// profile scripts (conda init, pyenv, nvm, ...) have applied their PATH
/// changes. Not supported on Windows.
#[derive(Debug, Clone)]
pub struct LoginShellEnvironment {
    shell: Option<PathBuf>,
    timeout: Duration,
}

impl LoginShellEnvironment {
    /// Use the shell named by `$SHELL`.
    pub fn new() -> Self {
        Self {
            shell: std::env::var_os("SHELL").map(PathBuf::from),
            timeout: Duration::from_secs(10),
        }
    }

    /// Use a specific shell executable.
    pub fn with_shell(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: Some(shell.into()),
            ..Self::new()
        }
    }

    /// Override how long the shell may take to start.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[cfg(unix)]
    async fn capture(&self, shell: &Path) -> Option<EnvironmentMap> {
        use std::process::Stdio;
        use tokio::process::Command;

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(shell)
                .args(["-l", "-c", "env -0"])
                .stdin(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match output {
            Ok(Ok(output)) if output.status.success() => Some(parse_env_block(&output.stdout)),
            Ok(Ok(output)) => {
                tracing::debug!(shell = %shell.display(), status = ?output.status, "shell environment capture exited unsuccessfully");
                None
            }
            Ok(Err(e)) => {
                tracing::debug!(shell = %shell.display(), error = %e, "failed to start shell");
                None
            }
            Err(_) => {
                tracing::debug!(shell = %shell.display(), timeout = ?self.timeout, "shell environment capture timed out");
                None
            }
        }
    }

    #[cfg(not(unix))]
    async fn capture(&self, _shell: &Path) -> Option<EnvironmentMap> {
        None
    }
}

impl Default for LoginShellEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalEnvironment for LoginShellEnvironment {
    async fn environment(&self) -> Option<ShellEnvironment> {
        let shell = self.shell.as_deref()?;
        let env = self.capture(shell).await?;
        if env.is_empty() {
            return None;
        }

        Some(ShellEnvironment {
            env,
            shell: Some(ShellType::from_shell_path(shell)),
        })
    }
}

/// Parse `env -0` output: `KEY=VALUE` entries separated by NUL bytes.
fn parse_env_block(bytes: &[u8]) -> EnvironmentMap {
    String::from_utf8_lossy(bytes)
        .split('\0')
        .filter_map(|entry| entry.split_once('='))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_type_from_path() {
        assert_eq!(ShellType::from_shell_path("/bin/bash"), ShellType::Bash);
        assert_eq!(ShellType::from_shell_path("/usr/local/bin/fish"), ShellType::Fish);
        assert_eq!(ShellType::from_shell_path("/usr/bin/nu"), ShellType::Nushell);
        assert_eq!(ShellType::from_shell_path("pwsh.exe"), ShellType::PowerShell);
        assert_eq!(ShellType::from_shell_path("PowerShell.exe"), ShellType::PowerShell);
        assert_eq!(ShellType::from_shell_path("cmd.exe"), ShellType::Cmd);
        assert_eq!(ShellType::from_shell_path(""), ShellType::Other);
    }

    #[test]
    fn test_shell_type_display() {
        assert_eq!(ShellType::PowerShell.to_string(), "powershell");
        assert_eq!(ShellType::GitBash.to_string(), "gitbash");
        assert_eq!(serde_json::to_string(&ShellType::Zsh).unwrap(), "\"zsh\"");
    }

    #[test]
    fn test_parse_env_block() {
        let block = b"PATH=/usr/bin:/bin\0MULTI=line one\nline two\0EQ=a=b\0=skipped\0junk\0";
        let env = parse_env_block(block);

        assert_eq!(env.len(), 3);
        assert_eq!(env["PATH"], "/usr/bin:/bin");
        assert_eq!(env["MULTI"], "line one\nline two");
        assert_eq!(env["EQ"], "a=b");
    }

    #[tokio::test]
    async fn test_static_environment() {
        let snapshot = ShellEnvironment {
            env: EnvironmentMap::from([("A".to_string(), "1".to_string())]),
            shell: Some(ShellType::Bash),
        };
        let source = StaticEnvironment(Some(snapshot.clone()));
        assert_eq!(source.environment().await, Some(snapshot));
        assert_eq!(StaticEnvironment::default().environment().await, None);
    }

    #[tokio::test]
    async fn test_missing_shell_yields_none() {
        let source = LoginShellEnvironment::with_shell("/nonexistent/shell/xyz123")
            .timeout(Duration::from_secs(1));
        assert!(source.environment().await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_capture_from_sh() {
        let source = LoginShellEnvironment::with_shell("/bin/sh").timeout(Duration::from_secs(5));
        // env -0 is a GNU/BSD extension; only check the shape when it worked
        if let Some(captured) = source.environment().await {
            assert_eq!(captured.shell, Some(ShellType::Sh));
            assert!(!captured.env.is_empty());
        }
    }
}
