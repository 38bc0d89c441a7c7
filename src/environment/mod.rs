//! Environment snapshots and merging.
//!
//! - `merge_environments`: overlay one environment on another with PATH concatenation
//! - `TerminalEnvironment`: source of the user's shell environment
//! - `LoginShellEnvironment`: captures the environment of a login shell

mod merge;
mod terminal;

use std::collections::BTreeMap;

pub use merge::{is_path_key, merge_environments, merge_with_platform_delimiter, PATH_DELIMITER};
pub use terminal::{
    LoginShellEnvironment, ShellEnvironment, ShellType, StaticEnvironment, TerminalEnvironment,
};

/// Environment variables by name, in key order.
pub type EnvironmentMap = BTreeMap<String, String>;

/// Snapshot of the current process environment.
///
/// Variables whose name or value is not valid unicode are skipped.
pub fn process_environment() -> EnvironmentMap {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_environment_has_path() {
        let env = process_environment();
        assert!(env.keys().any(|k| is_path_key(k)));
    }
}
