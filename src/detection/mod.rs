//! Detection implementation submodule.
//!
//! This module contains the pieces a version probe is built from:
//!
//! - `find_executable`: PATH lookup against the probe's own environment
//! - `ProcessExecutor`: runs the version command with a timeout
//! - `parse_version_output`: picks the version line out of combined output

mod parser;
mod path_finder;
mod version;

pub use parser::parse_version_output;
pub(crate) use path_finder::find_executable;
pub use version::{ExecOptions, ExecOutput, ProcessExecutor, TokioProcessExecutor};
