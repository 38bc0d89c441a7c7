//! # jupyter-detection
//!
//! One-shot detection of the Jupyter front-ends (`notebook`, `lab`) available
//! to a user, reported to a telemetry sink.
//!
//! Each front-end is probed by running `jupyter <front-end> --version` twice:
//! once with the current process environment and once with the user's
//! terminal environment merged on top of it, since shells often put conda or
//! virtualenv directories on PATH that a GUI-launched process never sees.
//!
//! ## Features
//!
//! - `FrontEnd` enum identifying probed front-ends
//! - `ProbeResult` enum with the tri-state outcome of a probe
//! - `FrontEndVersion` with the reported float version and a `semver` view
//! - `merge_environments()` for PATH-aware environment merging
//! - `probe()` async function probing a single front-end
//! - `DetectionTelemetry` running the whole routine at most once per installation
//!
//! ## Example
//!
//! ```rust,no_run
//! use jupyter_detection::{
//!     probe, process_environment, FrontEnd, MemorySink, ProbeOptions, TokioProcessExecutor,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let sink = MemorySink::new();
//!     let result = probe(
//!         FrontEnd::Lab,
//!         process_environment(),
//!         None,
//!         &TokioProcessExecutor::default(),
//!         &sink,
//!         &ProbeOptions::default(),
//!     )
//!     .await;
//!
//!     if let Some(version) = result.version() {
//!         println!("JupyterLab {}.{}", version.major, version.minor);
//!     }
//! }
//! ```

mod detect;
mod detection;
mod environment;
mod flag_store;
mod front_end;
mod options;
mod probe_result;
mod telemetry;

pub use detect::{probe, DetectionTelemetry, ProbeBatch};
pub use detection::{
    parse_version_output, ExecOptions, ExecOutput, ProcessExecutor, TokioProcessExecutor,
};
pub use environment::{
    is_path_key, merge_environments, merge_with_platform_delimiter, process_environment,
    EnvironmentMap, LoginShellEnvironment, ShellEnvironment, ShellType, StaticEnvironment,
    TerminalEnvironment, PATH_DELIMITER,
};
pub use flag_store::{FileFlagStore, FlagStore, MemoryFlagStore, StoreError};
pub use front_end::FrontEnd;
pub use options::{ProbeOptions, DEFAULT_FLAG_KEY};
pub use probe_result::{DetectionSource, FailureReason, FrontEndVersion, ProbeError, ProbeResult};
pub use telemetry::{
    MemorySink, RecordedEvent, TelemetryProperties, TelemetrySink, TracingSink,
    JUPYTER_INSTALLED_EVENT,
};
