//! Core domain for the ORACLE strategic advisor.
//!
//! The crate models the client-side exploration state: the constraint
//! ledger filled during interrogation, the solution map, the per-timeline
//! exploration history with its snapshots, and the main/fork branch
//! manager. Everything is synchronous and free of I/O; the application
//! crate drives it from UI intents and collaborator pushes.

pub mod branch;
pub mod config;
pub mod error;
pub mod history;
pub mod interrogation;
pub mod map;
pub mod session;

// Re-export common error type
pub use error::{OracleError, Result};
