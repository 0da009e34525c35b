use serde::{Deserialize, Serialize};

use crate::interrogation::ConstraintType;

/// User intents the controller accepts from the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiIntent {
    /// First problem statement; starts interrogation.
    SubmitProblem { problem: String },
    /// Answer to the current question.
    SubmitAnswer {
        answer: String,
        /// Defaults to the dimension the current question targets
        #[serde(default)]
        dimension: Option<String>,
        /// Defaults to the configured constraint type
        #[serde(default)]
        constraint_type: Option<ConstraintType>,
    },
    /// All dimensions answered; generate the map.
    ConfirmIgnition,
    /// Explore a node on the live map.
    ClickNode { node_id: String },
    /// Diverge from a main-timeline entry with a different answer.
    Fork {
        from_index: usize,
        new_answer: String,
        dimension: String,
    },
    /// Jump the cursor to an entry on a timeline.
    Rewind { branch_id: String, event_index: usize },
    SwitchBranch { branch_id: String },
    DiscardFork { branch_id: String },
}

impl UiIntent {
    /// Short name used in logs and notices.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitProblem { .. } => "submit_problem",
            Self::SubmitAnswer { .. } => "submit_answer",
            Self::ConfirmIgnition => "confirm_ignition",
            Self::ClickNode { .. } => "click_node",
            Self::Fork { .. } => "fork",
            Self::Rewind { .. } => "rewind",
            Self::SwitchBranch { .. } => "switch_branch",
            Self::DiscardFork { .. } => "discard_fork",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_json() {
        let intent: UiIntent = serde_json::from_str(
            r#"{"type": "fork", "from_index": 2, "new_answer": "value-based pricing", "dimension": "market"}"#,
        )
        .unwrap();
        assert_eq!(
            intent,
            UiIntent::Fork {
                from_index: 2,
                new_answer: "value-based pricing".to_string(),
                dimension: "market".to_string(),
            }
        );

        let confirm: UiIntent = serde_json::from_str(r#"{"type": "confirm_ignition"}"#).unwrap();
        assert_eq!(confirm.name(), "confirm_ignition");
    }
}
