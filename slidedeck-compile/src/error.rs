use serde::Serialize;

/// Result type for loading and compiling decks.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Errors that can occur while loading a deck.
///
/// Rendering itself never fails: unknown elements degrade to empty output.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Malformed section '{section}': {reason}")]
    MalformedDocument { section: String, reason: String },
}

impl CompileError {
    pub(crate) fn malformed(section: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            section: section.into(),
            reason: reason.into(),
        }
    }
}

/// A diagnostic produced by [`crate::validate::validate`].
///
/// Diagnostics are non-fatal: a deck with warnings still compiles, and the
/// flagged elements render exactly as described in their message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Dotted path of the section (and subsection) the diagnostic refers to.
    pub section: String,
    pub code: String,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}
