//! Error types for the ORACLE core.

use serde::Serialize;
use thiserror::Error;

use crate::interrogation::Dimension;
use crate::session::Phase;

/// A shared error type for the ORACLE workspace.
///
/// The first group of variants are the synchronous validation errors raised
/// by the ledger, history log, branch manager and map validator. The
/// controller turns them into non-fatal notices without touching state.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum OracleError {
    /// Dimension name outside the fixed five-member set
    #[error("Invalid dimension: '{0}'")]
    InvalidDimension(String),

    /// History index that does not exist on the given timeline
    #[error("Index {index} out of range for timeline '{timeline}' (length {len})")]
    IndexOutOfRange {
        timeline: String,
        index: usize,
        len: usize,
    },

    /// Branch id that is neither "main" nor an existing fork
    #[error("Unknown branch: '{0}'")]
    UnknownBranch(String),

    /// A fork already exists and only one is allowed
    #[error("A fork already exists: '{branch_id}'")]
    AlreadyForked { branch_id: String },

    /// Map state that violates the tree invariants
    #[error("Invalid map state: {}", .0.join("; "))]
    InvalidMapState(Vec<String>),

    /// Collaborator push that failed validation outside the map itself
    #[error("Malformed inbound push: {0}")]
    MalformedPush(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Operation issued in the wrong phase
    #[error("Operation requires phase '{expected}', session is in '{actual}'")]
    InvalidPhase { expected: Phase, actual: Phase },

    /// Phase change that is not exactly one step forward
    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidPhaseTransition { from: Phase, to: Phase },

    #[error("Problem statement is empty")]
    EmptyProblem,

    #[error("Problem statement has already been set")]
    ProblemAlreadySet,

    /// Confirmation attempted before every dimension was answered
    #[error("Interrogation incomplete, missing: {}", format_dimensions(.missing))]
    InterrogationIncomplete { missing: Vec<Dimension> },

    /// The agent collaborator could not accept the request
    #[error("Agent unavailable: {0}")]
    AgentUnavailable(String),

    /// No reply arrived for a request within the configured timeout
    #[error("No reply for request #{seq} after {waited_ms}ms")]
    ReplyTimeout { seq: u64, waited_ms: u64 },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_dimensions(dimensions: &[Dimension]) -> String {
    dimensions
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl OracleError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IndexOutOfRange error
    pub fn out_of_range(timeline: impl Into<String>, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            timeline: timeline.into(),
            index,
            len,
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is one of the synchronous validation errors.
    ///
    /// Validation errors never leave partial state behind and are surfaced
    /// to the user as inline notices.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidDimension(_)
                | Self::IndexOutOfRange { .. }
                | Self::UnknownBranch(_)
                | Self::AlreadyForked { .. }
                | Self::InvalidMapState(_)
                | Self::MalformedPush(_)
                | Self::NotFound { .. }
                | Self::InvalidPhase { .. }
                | Self::InvalidPhaseTransition { .. }
                | Self::EmptyProblem
                | Self::ProblemAlreadySet
                | Self::InterrogationIncomplete { .. }
        )
    }

    /// Check if the failed operation can simply be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AgentUnavailable(_) | Self::ReplyTimeout { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for OracleError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for OracleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for OracleError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for OracleError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, OracleError>`.
pub type Result<T> = std::result::Result<T, OracleError>;
