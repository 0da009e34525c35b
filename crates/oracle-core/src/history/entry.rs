use serde::{Deserialize, Serialize};

use crate::map::MapState;

/// What happened at a point on the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HistoryEvent {
    /// An answer was submitted during exploration.
    Answer { answer: String },
    /// A map node was clicked for expansion.
    #[serde(rename_all = "camelCase")]
    NodeClick { node_id: String },
}

impl HistoryEvent {
    pub fn answer(answer: impl Into<String>) -> Self {
        Self::Answer {
            answer: answer.into(),
        }
    }

    pub fn node_click(node_id: impl Into<String>) -> Self {
        Self::NodeClick {
            node_id: node_id.into(),
        }
    }

    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::NodeClick { node_id } => Some(node_id),
            Self::Answer { .. } => None,
        }
    }

    pub fn answer_text(&self) -> Option<&str> {
        match self {
            Self::Answer { answer } => Some(answer),
            Self::NodeClick { .. } => None,
        }
    }
}

/// One event on a timeline together with the map as it stood right after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Position on the owning timeline, starting at 0
    pub index: usize,
    /// Timestamp when the event was recorded (ISO 8601 format)
    pub timestamp: String,
    #[serde(flatten)]
    pub event: HistoryEvent,
    /// Owned copy of the map; never shared with the live state
    pub map_snapshot: MapState,
}
