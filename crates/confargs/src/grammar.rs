//! grammar declarations: tables of `(pattern, template)` [Entry]s
//!
//! A grammar can be written in code with [entries!](crate::entries) or loaded from YAML:
//!
//! ```yaml
//! strict: false
//! entries:
//!   - pattern: "Name (<any*>)"
//!     template: "--name=$0"
//!   - pattern: "Bell? <bool>"
//!     template: "--bell"
//!   - pattern: "!Include <any*>"
//!     template: "$*"
//! ```
use std::path::Path;

/// One rule mapping a configuration line to an argument
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Entry {
    pub pattern: String,
    pub template: String,
}

impl Entry {
    pub fn new(pattern: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            template: template.into(),
        }
    }
}

impl<P: Into<String>, T: Into<String>> From<(P, T)> for Entry {
    fn from((pattern, template): (P, T)) -> Self {
        Self::new(pattern, template)
    }
}

/// An entry table with its settings, as found in a grammar file
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Grammar {
    /// reject lines that match no entry
    #[serde(default)]
    pub strict: bool,
    pub entries: Vec<Entry>,
}

impl Grammar {
    pub fn from_yaml(text: &str) -> Result<Self, GrammarError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load_file(file_path: &Path) -> Result<Self, GrammarError> {
        let file_path = file_path.canonicalize()?;
        tracing::info!(path=%file_path.display(), "loading grammar");

        let file_contents = std::fs::read_to_string(&file_path)?;
        Self::from_yaml(&file_contents)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum GrammarError {
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse grammar file")]
    YamlParseFailed(#[from] serde_yaml::Error),
}

/// Utility macro to create a `Vec<Entry>`
///
/// ```
/// # use confargs::entries;
/// let entries = entries! {
///     "Name (<any*>)" => "--name=$0",
///     "Bell? <bool>" => "--bell",
/// };
/// assert_eq!(entries.len(), 2);
/// ```
#[macro_export]
macro_rules! entries {
    { $($pattern:expr => $template:expr),* $(,)? } => {
        vec![$($crate::grammar::Entry::new($pattern, $template)),*]
    };
}
