//! Front-end probing and the one-time detection routine.

use crate::detection::{parse_version_output, ExecOptions, ProcessExecutor};
use crate::environment::{
    merge_with_platform_delimiter, process_environment, ShellEnvironment, TerminalEnvironment,
};
use crate::telemetry::{TelemetrySink, JUPYTER_INSTALLED_EVENT};
use crate::{
    DetectionSource, EnvironmentMap, FailureReason, FlagStore, FrontEnd, ProbeOptions, ProbeResult,
    ShellType,
};
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Probe a single front-end and report the outcome.
///
/// Runs `<program> <front-end> --version` with `env` as the complete child
/// environment, stdout and stderr merged, a non-zero exit tolerated and
/// `options.timeout` as the time limit.
///
/// # Detection Process
///
/// 1. Execute the version command through `executor`
/// 2. Pick the first line starting with a digit and match `major.minor.rest`
/// 3. Map the outcome to a [`ProbeResult`]
/// 4. Send exactly one telemetry event to `sink`
///
/// # Returns
///
/// - `Detected` - a version line was found; the source is `Shell` when
///   `shell` is given and `Process` otherwise
/// - `NotInstalled` - the command ran but printed no version
/// - `Failed` - the command could not be run (missing executable, spawn
///   error, timeout)
///
/// Errors are logged, never returned.
pub async fn probe<E, S>(
    front_end: FrontEnd,
    env: EnvironmentMap,
    shell: Option<ShellType>,
    executor: &E,
    sink: &S,
    options: &ProbeOptions,
) -> ProbeResult
where
    E: ProcessExecutor + ?Sized,
    S: TelemetrySink + ?Sized,
{
    let exec_options = ExecOptions {
        env,
        merge_std_out_err: true,
        throw_on_std_err: false,
        timeout: Some(options.timeout),
    };

    let result = match executor
        .exec(
            &options.program,
            &[front_end.subcommand(), "--version"],
            exec_options,
        )
        .await
    {
        Ok(output) => match parse_version_output(&output.stdout) {
            Ok(version) => {
                let source = if shell.is_some() {
                    DetectionSource::Shell
                } else {
                    DetectionSource::Process
                };
                match version.to_semver() {
                    Some(semver) => {
                        tracing::debug!(%front_end, %source, version = %semver, "front-end detected")
                    }
                    None => tracing::debug!(%front_end, %source, ?version, "front-end detected"),
                }
                ProbeResult::Detected {
                    front_end,
                    version,
                    source,
                    shell,
                }
            }
            Err(e) => {
                tracing::debug!(%front_end, error = %e, "front-end not installed");
                ProbeResult::NotInstalled { front_end }
            }
        },
        Err(e) => {
            tracing::warn!(%front_end, program = %options.program, error = %e, "version check failed");
            ProbeResult::Failed {
                front_end,
                reason: FailureReason::NotInstalled,
            }
        }
    };

    sink.send_event(JUPYTER_INSTALLED_EVENT, result.telemetry_properties());
    result
}

/// Probes spawned by one run of [`DetectionTelemetry::initialize`].
///
/// Dropping the batch detaches the probes; they still run to completion and
/// report telemetry.
#[derive(Debug, Default)]
pub struct ProbeBatch {
    handles: Vec<JoinHandle<ProbeResult>>,
}

impl ProbeBatch {
    /// Number of probes spawned.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the run was skipped.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every probe, returning results in spawn order.
    ///
    /// A probe task that panicked is logged and left out.
    pub async fn join(self) -> Vec<ProbeResult> {
        join_all(self.handles)
            .await
            .into_iter()
            .filter_map(|joined| match joined {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!(error = %e, "probe task did not complete");
                    None
                }
            })
            .collect()
    }
}

/// One-shot Jupyter detection reported to telemetry.
///
/// On its first run for an installation this probes every [`FrontEnd`]
/// twice: once with the process environment and once with the terminal's
/// shell environment merged on top of it. A persisted flag, written before
/// any probe starts, stops later runs from probing again.
///
/// # Example
///
/// ```rust,no_run
/// use jupyter_detection::{
///     DetectionTelemetry, FileFlagStore, LoginShellEnvironment, TokioProcessExecutor, TracingSink,
/// };
/// use std::sync::Arc;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let detection = Arc::new(DetectionTelemetry::new(
///         TokioProcessExecutor::default(),
///         LoginShellEnvironment::new(),
///         TracingSink,
///         FileFlagStore::new("/tmp/jupyter-detection/flags.json"),
///     ));
///
///     // Returns immediately; probes run in the background.
///     let run = detection.activate();
///
///     // Optionally wait for them.
///     if let Ok(batch) = run.await {
///         for result in batch.join().await {
///             println!("{:?}", result);
///         }
///     }
/// }
/// ```
pub struct DetectionTelemetry<E, T, S, F> {
    executor: Arc<E>,
    terminal: T,
    sink: Arc<S>,
    flags: F,
    options: Arc<ProbeOptions>,
    base_env: EnvironmentMap,
    started: AtomicBool,
}

impl<E, T, S, F> DetectionTelemetry<E, T, S, F>
where
    E: ProcessExecutor + 'static,
    T: TerminalEnvironment,
    S: TelemetrySink + 'static,
    F: FlagStore,
{
    /// Create the routine with default options and the current process environment.
    pub fn new(executor: E, terminal: T, sink: S, flags: F) -> Self {
        Self {
            executor: Arc::new(executor),
            terminal,
            sink: Arc::new(sink),
            flags,
            options: Arc::new(ProbeOptions::default()),
            base_env: process_environment(),
            started: AtomicBool::new(false),
        }
    }

    /// Replace the probe options.
    pub fn with_options(mut self, options: ProbeOptions) -> Self {
        self.options = Arc::new(options);
        self
    }

    /// Replace the environment used for process-sourced probes and as the merge base.
    pub fn with_base_env(mut self, env: EnvironmentMap) -> Self {
        self.base_env = env;
        self
    }

    /// Start [`initialize`](Self::initialize) in the background and return at once.
    ///
    /// Must be called from within a tokio runtime.
    pub fn activate(self: Arc<Self>) -> JoinHandle<ProbeBatch>
    where
        T: 'static,
        F: 'static,
    {
        tokio::spawn(async move { self.initialize().await })
    }

    /// Run the detection routine once.
    ///
    /// Returns as soon as all probes are spawned, without waiting for them.
    /// The batch is empty when the routine already ran, either in an earlier
    /// process (persisted flag) or concurrently in this one.
    pub async fn initialize(&self) -> ProbeBatch {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("detection already started in this process");
            return ProbeBatch::default();
        }

        let key = self.options.flag_key.as_str();
        match self.flags.get(key) {
            Ok(false) => {}
            Ok(true) => {
                tracing::debug!(key, "detection telemetry already sent");
                return ProbeBatch::default();
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "cannot read detection flag, skipping detection");
                return ProbeBatch::default();
            }
        }

        // Written before probing so a crash or a racing process cannot report twice.
        if let Err(e) = self.flags.set(key, true) {
            tracing::warn!(key, error = %e, "failed to persist detection flag");
        }

        let mut batch = ProbeBatch::default();
        for front_end in FrontEnd::all() {
            batch
                .handles
                .push(self.spawn_probe(front_end, self.base_env.clone(), None));
        }

        let Some(ShellEnvironment { env, shell }) = self.terminal.environment().await else {
            tracing::debug!("no terminal environment, skipping shell probes");
            return batch;
        };

        let merged = merge_with_platform_delimiter(&self.base_env, &env);
        for front_end in FrontEnd::all() {
            batch
                .handles
                .push(self.spawn_probe(front_end, merged.clone(), shell));
        }

        batch
    }

    fn spawn_probe(
        &self,
        front_end: FrontEnd,
        env: EnvironmentMap,
        shell: Option<ShellType>,
    ) -> JoinHandle<ProbeResult> {
        let executor = Arc::clone(&self.executor);
        let sink = Arc::clone(&self.sink);
        let options = Arc::clone(&self.options);

        tokio::spawn(async move {
            probe(front_end, env, shell, &*executor, &*sink, &options).await
        })
    }
}
