//! Application layer for ORACLE.
//!
//! Hosts the session controller that turns UI intents into core
//! operations and outbound requests, applies collaborator pushes, and
//! loads configuration.

pub mod collaborator;
pub mod config_service;
pub mod controller;

pub use collaborator::{AgentCollaborator, ChannelCollaborator};
pub use config_service::ConfigService;
pub use controller::{Notice, NoticeLevel, PushDisposition, SessionController};
