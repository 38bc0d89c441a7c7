//! Version output parsing with regex extraction.

use crate::{FrontEndVersion, ProbeError};
use regex::Regex;
use std::sync::OnceLock;

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d+)\.(\d+)\.(.+)\s*$").expect("Invalid regex pattern"))
}

/// Parse a front-end version from `--version` output.
///
/// Front-ends often print deprecation warnings or banners before the version,
/// so the output is filtered first:
///
/// 1. Split into lines, trim each and drop empty ones
/// 2. Drop lines that do not start with a digit
/// 3. Match the first remaining line against `major.minor.rest`
///
/// # Returns
///
/// `Ok(FrontEndVersion)` if the first numeric line is a version,
/// `Err(ProbeError::NoOutput)` if the output is blank, or
/// `Err(ProbeError::ParseMiss)` otherwise.
///
/// ```rust
/// use jupyter_detection::parse_version_output;
///
/// let version = parse_version_output("Selector is deprecated\n6.5.4\n").unwrap();
/// assert_eq!((version.major, version.minor), (6, 5));
/// ```
pub fn parse_version_output(output: &str) -> Result<FrontEndVersion, ProbeError> {
    let mut lines = output.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();
    if lines.peek().is_none() {
        return Err(ProbeError::NoOutput);
    }

    let line = lines
        .find(|l| l.starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or("");

    let miss = || ProbeError::ParseMiss {
        line: line.to_string(),
    };
    let caps = version_regex().captures(line).ok_or_else(miss)?;

    // Digit runs too long for u64 are treated like any other unparseable line.
    let major = caps[1].parse().map_err(|_| miss())?;
    let minor = caps[2].parse().map_err(|_| miss())?;

    Ok(FrontEndVersion {
        major,
        minor,
        patch_suffix: caps[3].to_string(),
    })
}
