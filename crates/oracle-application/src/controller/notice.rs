use oracle_core::error::OracleError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Inline validation message; nothing changed.
    Warning,
    /// The collaborator could not be reached or did not answer.
    Error,
}

/// A message for the user about an operation that did not happen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    /// Intent or event that produced the notice
    pub source: String,
    pub message: String,
    /// Whether repeating the same action may succeed
    pub retryable: bool,
}

impl Notice {
    pub fn from_error(source: impl Into<String>, error: &OracleError) -> Self {
        let level = if error.is_validation() {
            NoticeLevel::Warning
        } else {
            NoticeLevel::Error
        };
        Self {
            level,
            source: source.into(),
            message: error.to_string(),
            retryable: error.is_retryable(),
        }
    }
}
