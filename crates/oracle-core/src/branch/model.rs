use serde::{Deserialize, Serialize};

use crate::history::ExplorationLog;
use crate::map::MapState;

/// An alternate timeline that diverged from the main one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub branch_id: String,
    /// Index of the main-timeline entry this branch diverged from
    pub fork_index: usize,
    #[serde(default)]
    pub label: String,
    /// Events recorded on this branch, indexed from 0
    #[serde(default)]
    pub exploration_history: ExplorationLog,
    /// Map captured at fork time, later replaced by the regenerated map
    #[serde(default)]
    pub map_snapshot: MapState,
}

impl Branch {
    pub fn label_for(fork_index: usize) -> String {
        format!("Fork at Q{}", fork_index + 1)
    }
}
