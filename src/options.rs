//! Probe options configuration.
//!
//! This module provides the [`ProbeOptions`] struct for configuring the
//! detection routine: which executable to run, how long to wait for it and
//! which flag marks the routine as done.

use std::time::Duration;

/// Flag key recording that detection telemetry was sent for this installation.
pub const DEFAULT_FLAG_KEY: &str = "jupyter_detection_telemetry_sent";

/// Configuration options for front-end probing.
///
/// # Example
///
/// ```rust
/// use jupyter_detection::ProbeOptions;
/// use std::time::Duration;
///
/// // Defaults: `jupyter`, 5 second timeout
/// let opts = ProbeOptions::default();
///
/// // Use a specific interpreter-bundled executable and a longer timeout
/// let opts = ProbeOptions {
///     program: "/opt/conda/bin/jupyter".to_string(),
///     timeout: Duration::from_secs(10),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Executable invoked as `<program> <front-end> --version`.
    ///
    /// Bare names are resolved against the PATH of the probe's environment.
    ///
    /// Default: `"jupyter"`
    pub program: String,

    /// Maximum time to wait for a single version check.
    ///
    /// Slow interpreters on first start (cold conda environments, network
    /// home directories) can take several seconds.
    ///
    /// Default: 5 seconds
    pub timeout: Duration,

    /// Key of the persisted flag guarding the one-time run.
    ///
    /// Default: [`DEFAULT_FLAG_KEY`]
    pub flag_key: String,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            program: "jupyter".to_string(),
            timeout: Duration::from_secs(5),
            flag_key: DEFAULT_FLAG_KEY.to_string(),
        }
    }
}
