//! Session domain module.
//!
//! This module contains the session record shared with the agent
//! collaborator, its phase machine, and the message types that cross the
//! boundary in both directions.
//!
//! # Module Structure
//!
//! - `phase`: Forward-only phase machine (`Phase`)
//! - `model`: The owned session record (`Session`)
//! - `command`: Outbound requests and transient command fields (`AgentCommand`, `OutboundRequest`)
//! - `patch`: Inbound partial state pushes (`SessionPatch`, `AgentPush`)
//! - `intent`: UI intents routed through the controller (`UiIntent`)

mod command;
mod intent;
mod model;
mod patch;
mod phase;

pub use command::{AgentCommand, CommandFields, OutboundRequest};
pub use intent::UiIntent;
pub use model::Session;
pub use patch::{AgentPush, PatchOutcome, SessionPatch};
pub use phase::Phase;
