//! Environment map merging with PATH concatenation.

use super::EnvironmentMap;

/// Path-list separator of the current platform.
#[cfg(windows)]
pub const PATH_DELIMITER: &str = ";";
/// Path-list separator of the current platform.
#[cfg(not(windows))]
pub const PATH_DELIMITER: &str = ":";

/// Whether `key` names the search path, ignoring case (`PATH`, `Path`, ...).
pub fn is_path_key(key: &str) -> bool {
    key.eq_ignore_ascii_case("path")
}

/// Merge `overlay` on top of `base`.
///
/// Keys already in `base` keep their value. New keys from `overlay` are
/// added. PATH-like keys are concatenated instead, base first, joined by
/// `delimiter` unless the base already ends with it, the overlay already
/// starts with it, or either side is empty.
///
/// Only one PATH-like key of each side takes part (`PATH`, then `Path`, then
/// any other casing). The result is stored under the base's spelling when it
/// has one, else the overlay's, so the merged map never carries both `PATH`
/// and `Path`.
///
/// ```rust
/// use jupyter_detection::{merge_environments, EnvironmentMap};
///
/// let base = EnvironmentMap::from([("PATH".to_string(), "/a".to_string())]);
/// let overlay = EnvironmentMap::from([("PATH".to_string(), "/b".to_string())]);
///
/// let merged = merge_environments(&base, &overlay, ":");
/// assert_eq!(merged["PATH"], "/a:/b");
/// ```
pub fn merge_environments(
    base: &EnvironmentMap,
    overlay: &EnvironmentMap,
    delimiter: &str,
) -> EnvironmentMap {
    let mut merged = base.clone();

    for (key, value) in overlay {
        if !is_path_key(key) && !base.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }

    if let Some((overlay_key, overlay_path)) = path_entry(overlay) {
        let (target, base_path) = path_entry(base).unwrap_or((overlay_key, ""));
        let joined = join_paths(base_path, overlay_path, delimiter);
        merged.insert(target.to_string(), joined);
    }

    merged
}

/// [`merge_environments`] with the platform's [`PATH_DELIMITER`].
pub fn merge_with_platform_delimiter(
    base: &EnvironmentMap,
    overlay: &EnvironmentMap,
) -> EnvironmentMap {
    merge_environments(base, overlay, PATH_DELIMITER)
}

/// The PATH-like entry of `env`, preferring `PATH`, then `Path`, then any other casing.
fn path_entry(env: &EnvironmentMap) -> Option<(&str, &str)> {
    ["PATH", "Path"]
        .iter()
        .find_map(|k| env.get_key_value(*k))
        .or_else(|| env.iter().find(|(k, _)| is_path_key(k)))
        .map(|(k, v)| (k.as_str(), v.as_str()))
}

fn join_paths(base: &str, overlay: &str, delimiter: &str) -> String {
    let base = base.trim();
    let overlay = overlay.trim();

    let delimiter = if base.is_empty()
        || overlay.is_empty()
        || base.ends_with(delimiter)
        || overlay.starts_with(delimiter)
    {
        ""
    } else {
        delimiter
    };

    format!("{}{}{}", base, delimiter, overlay)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> EnvironmentMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_disjoint_keys_union() {
        let base = env(&[("HOME", "/home/me"), ("LANG", "C")]);
        let overlay = env(&[("CONDA_PREFIX", "/opt/conda"), ("VIRTUAL_ENV", "/venv")]);

        let merged = merge_environments(&base, &overlay, ":");

        assert_eq!(merged.len(), 4);
        assert_eq!(merged["HOME"], "/home/me");
        assert_eq!(merged["CONDA_PREFIX"], "/opt/conda");
        assert_eq!(merged["VIRTUAL_ENV"], "/venv");
    }

    #[test]
    fn test_shared_key_keeps_base() {
        let base = env(&[("HOME", "/home/me")]);
        let overlay = env(&[("HOME", "/home/other")]);

        let merged = merge_environments(&base, &overlay, ":");
        assert_eq!(merged["HOME"], "/home/me");
    }

    #[test]
    fn test_key_match_is_case_sensitive() {
        let base = env(&[("Home", "/a")]);
        let overlay = env(&[("HOME", "/b")]);

        let merged = merge_environments(&base, &overlay, ":");
        assert_eq!(merged["Home"], "/a");
        assert_eq!(merged["HOME"], "/b");
    }

    #[test]
    fn test_path_concatenated() {
        let merged = merge_environments(&env(&[("PATH", "/a")]), &env(&[("PATH", "/b")]), ":");
        assert_eq!(merged["PATH"], "/a:/b");
    }

    #[test]
    fn test_path_values_are_trimmed() {
        let merged = merge_environments(
            &env(&[("PATH", "  /a \n")]),
            &env(&[("PATH", " /b ")]),
            ":",
        );
        assert_eq!(merged["PATH"], "/a:/b");
    }

    #[test]
    fn test_path_trailing_delimiter_not_doubled() {
        let merged = merge_environments(&env(&[("PATH", "/a:")]), &env(&[("PATH", "/b")]), ":");
        assert_eq!(merged["PATH"], "/a:/b");
    }

    #[test]
    fn test_path_leading_delimiter_not_doubled() {
        let merged = merge_environments(&env(&[("PATH", "/a")]), &env(&[("PATH", ":/b")]), ":");
        assert_eq!(merged["PATH"], "/a:/b");
    }

    #[test]
    fn test_path_trailing_slash_is_not_a_delimiter() {
        let merged = merge_environments(&env(&[("PATH", "/a/")]), &env(&[("PATH", "/b")]), ":");
        assert_eq!(merged["PATH"], "/a/:/b");
    }

    #[test]
    fn test_path_empty_sides_leave_no_dangling_delimiter() {
        let merged = merge_environments(&env(&[]), &env(&[("PATH", "/b")]), ":");
        assert_eq!(merged["PATH"], "/b");

        let merged = merge_environments(&env(&[("PATH", "/a")]), &env(&[("PATH", "")]), ":");
        assert_eq!(merged["PATH"], "/a");
    }

    #[test]
    fn test_windows_path_spelling_uses_base_key() {
        let merged = merge_environments(
            &env(&[("Path", r"C:\Windows")]),
            &env(&[("PATH", r"C:\tools")]),
            ";",
        );

        assert_eq!(merged["Path"], r"C:\Windows;C:\tools");
        assert!(!merged.contains_key("PATH"));
    }

    #[test]
    fn test_path_added_under_overlay_key_when_base_has_none() {
        let merged = merge_environments(&env(&[("HOME", "/h")]), &env(&[("Path", "/b")]), ":");
        assert_eq!(merged["Path"], "/b");
    }

    #[test]
    fn test_overlay_with_two_path_spellings_yields_one_key() {
        let merged = merge_environments(
            &env(&[("HOME", "/h")]),
            &env(&[("PATH", "/b"), ("Path", "/c")]),
            ":",
        );

        let path_keys: Vec<_> = merged.keys().filter(|k| is_path_key(k)).collect();
        assert_eq!(path_keys, ["PATH"]);
        assert_eq!(merged["PATH"], "/b");
        assert_eq!(merged["HOME"], "/h");
    }

    #[test]
    fn test_extra_overlay_path_spelling_is_not_added_to_base() {
        let merged = merge_environments(
            &env(&[("Path", "/a")]),
            &env(&[("PATH", "/b"), ("path", "/c")]),
            ":",
        );

        assert_eq!(merged.len(), 1);
        assert_eq!(merged["Path"], "/a:/b");
    }

    #[test]
    fn test_base_path_kept_when_overlay_has_none() {
        let merged = merge_environments(&env(&[("PATH", "/a")]), &env(&[("X", "1")]), ":");
        assert_eq!(merged["PATH"], "/a");
        assert_eq!(merged["X"], "1");
    }

    #[test]
    fn test_inputs_are_not_modified() {
        let base = env(&[("PATH", "/a")]);
        let overlay = env(&[("PATH", "/b"), ("X", "1")]);

        let _ = merge_environments(&base, &overlay, ":");
        assert_eq!(base, env(&[("PATH", "/a")]));
        assert_eq!(overlay.len(), 2);
    }

    #[test]
    fn test_is_path_key() {
        assert!(is_path_key("PATH"));
        assert!(is_path_key("Path"));
        assert!(is_path_key("path"));
        assert!(!is_path_key("PYTHONPATH"));
    }
}
