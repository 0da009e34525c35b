//! Owner of the main timeline and the optional fork.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::model::Branch;
use crate::error::{OracleError, Result};
use crate::history::{ExplorationLog, HistoryEntry, HistoryEvent};
use crate::interrogation::Dimension;
use crate::map::{MapState, map_violations};

/// Reserved id of the primordial timeline.
pub const MAIN_BRANCH_ID: &str = "main";

/// Number of forks that may exist at once.
pub const MAX_FORKS: usize = 1;

fn default_active_branch_id() -> String {
    MAIN_BRANCH_ID.to_string()
}

/// Holds every timeline and which one is active.
///
/// Serializes to the `explorationHistory`, `branches` and `activeBranchId`
/// fields of the shared session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchManager {
    #[serde(rename = "explorationHistory", default)]
    main: ExplorationLog,
    #[serde(default)]
    branches: Vec<Branch>,
    #[serde(default = "default_active_branch_id")]
    active_branch_id: String,
}

impl Default for BranchManager {
    fn default() -> Self {
        Self {
            main: ExplorationLog::new(),
            branches: Vec::new(),
            active_branch_id: default_active_branch_id(),
        }
    }
}

impl BranchManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fork diverging from main-timeline entry `from_index`.
    ///
    /// The fork starts with an empty history and a copy of the main
    /// snapshot at `from_index`. The main timeline is not touched and the
    /// active branch does not change. `new_answer` and `dimension` describe
    /// the divergence for the collaborator and are not validated here.
    ///
    /// # Errors
    ///
    /// - `AlreadyForked` if a fork already exists
    /// - `IndexOutOfRange` if `from_index` is not a main-timeline index
    pub fn fork(&mut self, from_index: usize, new_answer: &str, dimension: Dimension) -> Result<&Branch> {
        if self.branches.len() >= MAX_FORKS {
            let branch_id = self
                .branches
                .first()
                .map(|b| b.branch_id.clone())
                .unwrap_or_default();
            return Err(OracleError::AlreadyForked { branch_id });
        }

        let entry = self
            .main
            .at(from_index)
            .ok_or_else(|| OracleError::out_of_range(MAIN_BRANCH_ID, from_index, self.main.len()))?;

        let branch = Branch {
            branch_id: Uuid::new_v4().to_string(),
            fork_index: from_index,
            label: Branch::label_for(from_index),
            exploration_history: ExplorationLog::new(),
            map_snapshot: entry.map_snapshot.clone(),
        };

        tracing::debug!(
            "[BranchManager] fork {} at index {} ({}: {:?})",
            branch.branch_id,
            from_index,
            dimension,
            new_answer
        );

        self.branches.push(branch);
        Ok(&self.branches[self.branches.len() - 1])
    }

    /// Makes `branch_id` the active timeline.
    ///
    /// # Errors
    ///
    /// Returns `UnknownBranch` if the id is neither `"main"` nor a fork.
    pub fn switch_active(&mut self, branch_id: &str) -> Result<()> {
        self.ensure_known(branch_id)?;
        self.active_branch_id = branch_id.to_string();
        Ok(())
    }

    /// Returns the snapshot stored at `event_index` on `branch_id`.
    ///
    /// This is a read: no entry is removed, so later appends still land at
    /// the end of the timeline.
    ///
    /// # Errors
    ///
    /// - `UnknownBranch` if the branch does not exist
    /// - `IndexOutOfRange` if the index is not on that timeline
    pub fn rewind(&self, branch_id: &str, event_index: usize) -> Result<MapState> {
        let log = self.log(branch_id)?;
        log.at(event_index)
            .map(|entry| entry.map_snapshot.clone())
            .ok_or_else(|| OracleError::out_of_range(branch_id, event_index, log.len()))
    }

    /// Removes the fork so a new one may be created.
    ///
    /// Discarding the active fork re-activates the main timeline.
    pub fn discard_fork(&mut self, branch_id: &str) -> Result<Branch> {
        let position = self
            .branches
            .iter()
            .position(|b| b.branch_id == branch_id)
            .ok_or_else(|| OracleError::UnknownBranch(branch_id.to_string()))?;

        let removed = self.branches.remove(position);
        if self.active_branch_id == branch_id {
            self.active_branch_id = default_active_branch_id();
        }
        Ok(removed)
    }

    /// Appends an event to whichever timeline is active.
    pub fn append_to_active(&mut self, event: HistoryEvent, map: &MapState) -> &HistoryEntry {
        let active = self.active_branch_id.clone();
        match self.branches.iter_mut().find(|b| b.branch_id == active) {
            Some(branch) => branch.exploration_history.append(event, map),
            None => self.main.append(event, map),
        }
    }

    pub fn log(&self, branch_id: &str) -> Result<&ExplorationLog> {
        if branch_id == MAIN_BRANCH_ID {
            return Ok(&self.main);
        }
        self.branch(branch_id)
            .map(|b| &b.exploration_history)
            .ok_or_else(|| OracleError::UnknownBranch(branch_id.to_string()))
    }

    pub fn active_log(&self) -> &ExplorationLog {
        self.log(&self.active_branch_id).unwrap_or(&self.main)
    }

    /// Map shown when a timeline is entered: its latest snapshot, or the
    /// fork-time snapshot for a fork with no events yet.
    pub fn tip_map(&self, branch_id: &str) -> Result<Option<MapState>> {
        let log = self.log(branch_id)?;
        if let Some(last) = log.last() {
            return Ok(Some(last.map_snapshot.clone()));
        }
        Ok(self.branch(branch_id).map(|b| b.map_snapshot.clone()))
    }

    pub fn main(&self) -> &ExplorationLog {
        &self.main
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn branch(&self, branch_id: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.branch_id == branch_id)
    }

    pub fn fork_branch(&self) -> Option<&Branch> {
        self.branches.first()
    }

    pub fn active_branch_id(&self) -> &str {
        &self.active_branch_id
    }

    pub fn is_main_active(&self) -> bool {
        self.active_branch_id == MAIN_BRANCH_ID
    }

    pub fn is_known(&self, branch_id: &str) -> bool {
        branch_id == MAIN_BRANCH_ID || self.branch(branch_id).is_some()
    }

    fn ensure_known(&self, branch_id: &str) -> Result<()> {
        if self.is_known(branch_id) {
            Ok(())
        } else {
            Err(OracleError::UnknownBranch(branch_id.to_string()))
        }
    }

    // ============================================================================
    // Collaborator pushes
    // ============================================================================

    /// Checks a pushed branch list: fork limit, unique non-reserved ids, and
    /// valid timelines.
    pub fn validate_branches(branches: &[Branch]) -> Result<()> {
        let mut problems = Vec::new();
        if branches.len() > MAX_FORKS {
            problems.push(format!(
                "{} branches pushed, at most {} allowed",
                branches.len(),
                MAX_FORKS
            ));
        }

        let mut ids = HashSet::new();
        for branch in branches {
            if branch.branch_id == MAIN_BRANCH_ID {
                problems.push("branch id 'main' is reserved".to_string());
            }
            if !ids.insert(branch.branch_id.as_str()) {
                problems.push(format!("duplicate branch id '{}'", branch.branch_id));
            }
        }
        if !problems.is_empty() {
            return Err(OracleError::MalformedPush(problems.join("; ")));
        }

        let mut map_problems = Vec::new();
        for branch in branches {
            ExplorationLog::from_entries(branch.exploration_history.entries().to_vec())?;
            if !branch.map_snapshot.is_empty() {
                map_problems.extend(
                    map_violations(&branch.map_snapshot)
                        .into_iter()
                        .map(|v| format!("branch '{}': {}", branch.branch_id, v)),
                );
            }
        }
        if map_problems.is_empty() {
            Ok(())
        } else {
            Err(OracleError::InvalidMapState(map_problems))
        }
    }

    /// Replaces timelines with already-validated values from a push.
    ///
    /// Each fork index must point into the resulting main timeline and the
    /// active id must resolve against the resulting branch set; on error
    /// nothing changes.
    pub fn apply_push(
        &mut self,
        main: Option<ExplorationLog>,
        branches: Option<Vec<Branch>>,
        active_branch_id: Option<String>,
    ) -> Result<()> {
        let mut next = self.clone();
        if let Some(main) = main {
            next.main = main;
        }
        if let Some(branches) = branches {
            Self::validate_branches(&branches)?;
            next.branches = branches;
        }
        let main_len = next.main.len();
        if let Some(branch) = next.branches.iter().find(|b| b.fork_index >= main_len) {
            return Err(OracleError::MalformedPush(format!(
                "branch '{}' forks at index {} but main has {} entries",
                branch.branch_id, branch.fork_index, main_len
            )));
        }
        if let Some(active) = active_branch_id {
            next.active_branch_id = active;
        }
        if !next.is_known(&next.active_branch_id) {
            return Err(OracleError::UnknownBranch(next.active_branch_id));
        }
        *self = next;
        Ok(())
    }
}
