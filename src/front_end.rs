//! Front-end enum identifying the probed Jupyter entry points.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// A Jupyter front-end that can be probed.
///
/// Each variant corresponds to a `jupyter` subcommand whose `--version`
/// output is inspected.
///
/// # Example
///
/// ```rust
/// use jupyter_detection::FrontEnd;
///
/// for front_end in FrontEnd::all() {
///     println!("jupyter {} --version", front_end.subcommand());
/// }
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FrontEnd {
    /// The classic notebook server (`jupyter notebook`).
    Notebook,
    /// JupyterLab (`jupyter lab`).
    Lab,
}

impl FrontEnd {
    /// The `jupyter` subcommand for this front-end.
    ///
    /// ```rust
    /// use jupyter_detection::FrontEnd;
    ///
    /// assert_eq!(FrontEnd::Notebook.subcommand(), "notebook");
    /// assert_eq!(FrontEnd::Lab.subcommand(), "lab");
    /// ```
    pub fn subcommand(&self) -> &'static str {
        match self {
            Self::Notebook => "notebook",
            Self::Lab => "lab",
        }
    }

    /// Iterator over all front-ends, in probing order.
    pub fn all() -> impl Iterator<Item = Self> {
        <Self as IntoEnumIterator>::iter()
    }
}
