//! Probe result types and the errors that feed into them.

use crate::{FrontEnd, ShellType};
use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;
use thiserror::Error;

/// Version reported by a front-end's `--version` output.
///
/// Only the major and minor components are guaranteed numeric; everything
/// after the second dot is kept verbatim in `patch_suffix` (e.g. `"4"`,
/// `"0rc1"`, `"2.dev0"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontEndVersion {
    /// Leading numeric component.
    pub major: u64,
    /// Second numeric component.
    pub minor: u64,
    /// Remainder of the version line after `major.minor.`.
    pub patch_suffix: String,
}

impl FrontEndVersion {
    /// The `major.minor` value as a float, the shape telemetry reports.
    ///
    /// ```rust
    /// use jupyter_detection::FrontEndVersion;
    ///
    /// let version = FrontEndVersion { major: 6, minor: 5, patch_suffix: "4".into() };
    /// assert_eq!(version.telemetry_version(), 6.5);
    /// ```
    pub fn telemetry_version(&self) -> f64 {
        format!("{}.{}", self.major, self.minor)
            .parse()
            .unwrap_or(self.major as f64)
    }

    /// Interpret the full version as semver, if the suffix allows it.
    pub fn to_semver(&self) -> Option<Version> {
        Version::parse(&format!(
            "{}.{}.{}",
            self.major, self.minor, self.patch_suffix
        ))
        .ok()
    }
}

/// Which environment a probe ran under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DetectionSource {
    /// Environment captured from the user's terminal shell.
    Shell,
    /// The current process environment.
    Process,
}

/// Reason attached to a failed probe in telemetry.
///
/// Execution failures and a missing installation are reported with the same
/// reason; [`ProbeError`] keeps the distinction for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub enum FailureReason {
    /// The front-end could not be run.
    NotInstalled,
}

impl FailureReason {
    /// The wire spelling of this reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInstalled => "notInstalled",
        }
    }
}

/// Errors raised while running or interpreting a version probe.
///
/// None of these reach the caller of the top-level routine; they are logged
/// and folded into a [`ProbeResult`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ProbeError {
    /// The executable is missing or the OS refused to start it.
    #[error("failed to run {program}: {message}")]
    SpawnFailure {
        /// Program that was being started.
        program: String,
        /// Underlying error text.
        message: String,
    },

    /// The child process outlived the configured timeout.
    #[error("version check timed out after {0:?}")]
    Timeout(Duration),

    /// The process wrote to stderr while stderr output was configured as fatal.
    #[error("process wrote to stderr: {0}")]
    StdErr(String),

    /// The process produced no output at all.
    #[error("no output from version check")]
    NoOutput,

    /// Output was present but no line looked like a version.
    #[error("no version found in line {line:?}")]
    ParseMiss {
        /// The candidate line that failed to match (empty if none survived filtering).
        line: String,
    },
}

impl ProbeError {
    /// Whether the error came from running the process rather than reading its output.
    pub fn is_execution_failure(&self) -> bool {
        matches!(
            self,
            Self::SpawnFailure { .. } | Self::Timeout(_) | Self::StdErr(_)
        )
    }
}

/// Outcome of a single front-end probe.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProbeResult {
    /// A version line was found.
    Detected {
        /// Front-end that was probed.
        front_end: FrontEnd,
        /// Parsed version.
        version: FrontEndVersion,
        /// Environment the probe ran under.
        source: DetectionSource,
        /// Shell the environment came from, for shell-sourced probes.
        shell: Option<ShellType>,
    },

    /// The command ran but printed nothing that looked like a version.
    NotInstalled {
        /// Front-end that was probed.
        front_end: FrontEnd,
    },

    /// The command could not be run.
    Failed {
        /// Front-end that was probed.
        front_end: FrontEnd,
        /// Reason reported to telemetry.
        reason: FailureReason,
    },
}

impl ProbeResult {
    /// The front-end this result belongs to.
    pub fn front_end(&self) -> FrontEnd {
        match self {
            Self::Detected { front_end, .. }
            | Self::NotInstalled { front_end }
            | Self::Failed { front_end, .. } => *front_end,
        }
    }

    /// Returns `true` only for `Detected`.
    pub fn is_detected(&self) -> bool {
        matches!(self, Self::Detected { .. })
    }

    /// The parsed version, if one was detected.
    pub fn version(&self) -> Option<&FrontEndVersion> {
        match self {
            Self::Detected { version, .. } => Some(version),
            _ => None,
        }
    }

    /// Property bag sent with the telemetry event.
    ///
    /// `NotInstalled` and `Failed` produce the same bag.
    pub fn telemetry_properties(&self) -> Map<String, Value> {
        let value = match self {
            Self::Detected {
                front_end,
                version,
                source,
                shell,
            } => {
                let mut props = json!({
                    "frontEnd": front_end,
                    "frontEndVersion": version.telemetry_version(),
                    "detection": source,
                });
                if let (DetectionSource::Shell, Some(shell)) = (source, shell) {
                    props["shellType"] = json!(shell);
                }
                props
            }
            Self::NotInstalled { front_end } => json!({
                "failed": true,
                "reason": FailureReason::NotInstalled,
                "frontEnd": front_end,
            }),
            Self::Failed { front_end, reason } => json!({
                "failed": true,
                "reason": reason,
                "frontEnd": front_end,
            }),
        };

        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(major: u64, minor: u64, suffix: &str) -> FrontEndVersion {
        FrontEndVersion {
            major,
            minor,
            patch_suffix: suffix.to_string(),
        }
    }

    #[test]
    fn test_telemetry_version() {
        assert_eq!(version(6, 5, "4").telemetry_version(), 6.5);
        assert_eq!(version(4, 0, "11").telemetry_version(), 4.0);
        assert_eq!(version(7, 12, "0").telemetry_version(), 7.12);
    }

    #[test]
    fn test_to_semver() {
        assert_eq!(version(6, 5, "4").to_semver(), Some(Version::new(6, 5, 4)));
        assert!(version(7, 0, "0rc1").to_semver().is_none());
        assert!(version(7, 0, "0-rc.1").to_semver().is_some());
    }

    #[test]
    fn test_detected_process_properties() {
        let result = ProbeResult::Detected {
            front_end: FrontEnd::Lab,
            version: version(4, 1, "2"),
            source: DetectionSource::Process,
            shell: None,
        };
        let props = result.telemetry_properties();

        assert_eq!(props["frontEnd"], "lab");
        assert_eq!(props["frontEndVersion"], 4.1);
        assert_eq!(props["detection"], "process");
        assert!(!props.contains_key("shellType"));
        assert!(!props.contains_key("failed"));
    }

    #[test]
    fn test_detected_shell_properties() {
        let result = ProbeResult::Detected {
            front_end: FrontEnd::Notebook,
            version: version(6, 5, "4"),
            source: DetectionSource::Shell,
            shell: Some(ShellType::Zsh),
        };
        let props = result.telemetry_properties();

        assert_eq!(props["detection"], "shell");
        assert_eq!(props["shellType"], "zsh");
    }

    #[test]
    fn test_not_installed_and_failed_share_properties() {
        let not_installed = ProbeResult::NotInstalled {
            front_end: FrontEnd::Notebook,
        };
        let failed = ProbeResult::Failed {
            front_end: FrontEnd::Notebook,
            reason: FailureReason::NotInstalled,
        };

        let props = not_installed.telemetry_properties();
        assert_eq!(props, failed.telemetry_properties());
        assert_eq!(props["failed"], true);
        assert_eq!(props["reason"], "notInstalled");
        assert_eq!(props["frontEnd"], "notebook");
    }

    #[test]
    fn test_result_accessors() {
        let detected = ProbeResult::Detected {
            front_end: FrontEnd::Lab,
            version: version(3, 6, "1"),
            source: DetectionSource::Process,
            shell: None,
        };
        assert!(detected.is_detected());
        assert_eq!(detected.front_end(), FrontEnd::Lab);
        assert_eq!(detected.version().map(|v| v.major), Some(3));

        let failed = ProbeResult::Failed {
            front_end: FrontEnd::Notebook,
            reason: FailureReason::NotInstalled,
        };
        assert!(!failed.is_detected());
        assert!(failed.version().is_none());
        assert_eq!(failed.front_end(), FrontEnd::Notebook);
    }

    #[test]
    fn test_probe_error_classification() {
        assert!(ProbeError::Timeout(Duration::from_secs(1)).is_execution_failure());
        assert!(ProbeError::SpawnFailure {
            program: "jupyter".into(),
            message: "not found".into(),
        }
        .is_execution_failure());
        assert!(!ProbeError::NoOutput.is_execution_failure());
        assert!(!ProbeError::ParseMiss { line: String::new() }.is_execution_failure());
    }

    #[test]
    fn test_probe_error_display() {
        let error = ProbeError::SpawnFailure {
            program: "jupyter".into(),
            message: "No such file or directory".into(),
        };
        assert_eq!(
            error.to_string(),
            "failed to run jupyter: No such file or directory"
        );
        assert_eq!(FailureReason::NotInstalled.as_str(), "notInstalled");
    }
}
