//! Outbound requests to the agent collaborator.

use serde::{Deserialize, Serialize};

use crate::interrogation::Dimension;

/// Structured command accompanying an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentCommand {
    /// Generate children for a clicked node.
    Expand { node_id: String },
    /// Regenerate the map with one answer changed.
    Fork {
        fork_index: usize,
        new_answer: String,
        original_answer: String,
        dimension: Dimension,
    },
}

impl AgentCommand {
    /// Free-text utterance the collaborator receives for this command.
    pub fn message(&self) -> String {
        match self {
            Self::Expand { node_id } => format!("Expand node: {}", node_id),
            Self::Fork {
                fork_index,
                new_answer,
                original_answer,
                ..
            } => format!(
                "Fork at constraint {}: \"{}\" (was: \"{}\")",
                fork_index, new_answer, original_answer
            ),
        }
    }
}

/// Transient command fields of the shared session.
///
/// The controller sets them before sending the triggering message; the
/// collaborator consumes and clears them in a later push.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandFields {
    #[serde(default)]
    pub expand_node_id: Option<String>,
    #[serde(default)]
    pub fork_index: Option<usize>,
    #[serde(default)]
    pub fork_new_answer: Option<String>,
    #[serde(default)]
    pub fork_original_answer: Option<String>,
    #[serde(default)]
    pub fork_dimension: Option<Dimension>,
}

impl CommandFields {
    pub fn set(&mut self, command: &AgentCommand) {
        match command {
            AgentCommand::Expand { node_id } => {
                self.expand_node_id = Some(node_id.clone());
            }
            AgentCommand::Fork {
                fork_index,
                new_answer,
                original_answer,
                dimension,
            } => {
                self.fork_index = Some(*fork_index);
                self.fork_new_answer = Some(new_answer.clone());
                self.fork_original_answer = Some(original_answer.clone());
                self.fork_dimension = Some(*dimension);
            }
        }
    }

    pub fn clear_expand(&mut self) {
        self.expand_node_id = None;
    }

    pub fn clear_fork(&mut self) {
        self.fork_index = None;
        self.fork_new_answer = None;
        self.fork_original_answer = None;
        self.fork_dimension = None;
    }

    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }
}

/// A message queued for the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundRequest {
    /// Monotonic per-controller sequence number
    pub seq: u64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<AgentCommand>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_messages() {
        let expand = AgentCommand::Expand {
            node_id: "n2".to_string(),
        };
        assert_eq!(expand.message(), "Expand node: n2");

        let fork = AgentCommand::Fork {
            fork_index: 2,
            new_answer: "value-based pricing".to_string(),
            original_answer: "cost-plus".to_string(),
            dimension: Dimension::Market,
        };
        assert_eq!(
            fork.message(),
            "Fork at constraint 2: \"value-based pricing\" (was: \"cost-plus\")"
        );
    }

    #[test]
    fn test_fields_set_and_clear() {
        let mut fields = CommandFields::default();
        fields.set(&AgentCommand::Expand {
            node_id: "n1".to_string(),
        });
        assert_eq!(fields.expand_node_id.as_deref(), Some("n1"));

        fields.clear_expand();
        assert!(fields.is_clear());
    }
}
