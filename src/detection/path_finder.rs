//! PATH-based executable lookup within a given environment.

use crate::environment::{is_path_key, EnvironmentMap};
use std::path::{Path, PathBuf};

/// Find an executable the way a child spawned with `env` would.
///
/// Names containing a path separator are taken as-is and only checked for
/// existence. Bare names are resolved with the `which` crate against the
/// PATH-like variable of `env` rather than the current process, so a probe
/// with a shell-derived PATH finds what that shell would find.
///
/// # Returns
///
/// `Some(PathBuf)` if the executable is found, `None` otherwise.
pub(crate) fn find_executable(name: &str, env: &EnvironmentMap) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return candidate.exists().then(|| candidate.to_path_buf());
    }

    let search_path = env
        .iter()
        .find(|(key, _)| is_path_key(key))
        .map(|(_, value)| value.as_str())?;
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    which::which_in(name, Some(search_path), cwd).ok()
}
