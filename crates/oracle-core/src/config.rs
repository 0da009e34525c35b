//! Configuration model.
//!
//! Loaded from `config.toml` by the application layer; every field has a
//! default so a missing or partial file is valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::interrogation::ConstraintType;

/// Phrase sent when the user confirms the interrogation.
pub const DEFAULT_CONFIRMATION_PHRASE: &str = "I'm ready. Generate the map.";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct OracleConfig {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub replies: ReplyConfig,
    #[serde(default)]
    pub interrogation: InterrogationConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AgentConfig {
    #[serde(default = "default_confirmation_phrase")]
    pub confirmation_phrase: String,
    /// Unset means wait indefinitely
    #[serde(default)]
    pub reply_timeout_ms: Option<u64>,
}

fn default_confirmation_phrase() -> String {
    DEFAULT_CONFIRMATION_PHRASE.to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            confirmation_phrase: default_confirmation_phrase(),
            reply_timeout_ms: None,
        }
    }
}

impl AgentConfig {
    pub fn reply_timeout(&self) -> Option<Duration> {
        self.reply_timeout_ms.map(Duration::from_millis)
    }
}

/// How inbound pushes are ordered against outbound requests.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReplyOrdering {
    /// Drop tagged pushes older than the newest tagged push already applied.
    #[default]
    Sequenced,
    /// Apply every push in arrival order.
    LastWriteWins,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ReplyConfig {
    #[serde(default)]
    pub ordering: ReplyOrdering,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct InterrogationConfig {
    #[serde(default)]
    pub default_constraint_type: ConstraintType,
}
