//! Inbound state pushes from the agent collaborator.
//!
//! A push carries any subset of the shared session fields. Fields are
//! merged last-write-wins, but the push as a whole is validated first and
//! either applies completely or not at all.

use serde::{Deserialize, Serialize};

use super::model::{Session, SessionParts};
use super::phase::Phase;
use crate::branch::Branch;
use crate::error::{OracleError, Result};
use crate::history::{ExplorationLog, HistoryEntry};
use crate::interrogation::{Constraint, Dimension, DimensionCoverage};
use crate::map::{MapState, validate_map};

/// Partial session state pushed by the collaborator.
///
/// Absent and `null` fields are left untouched. For the transient command
/// fields an empty string (or a negative `forkIndex`) clears the field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionPatch {
    pub phase: Option<Phase>,
    pub problem: Option<String>,
    pub constraints: Option<Vec<Constraint>>,
    pub dimension_coverage: Option<DimensionCoverage>,
    pub current_question: Option<String>,
    pub current_target_dimension: Option<String>,
    pub is_last_question: Option<bool>,
    pub map_state: Option<MapState>,
    pub exploration_history: Option<Vec<HistoryEntry>>,
    pub branches: Option<Vec<Branch>>,
    pub active_branch_id: Option<String>,
    pub expand_node_id: Option<String>,
    pub fork_index: Option<i64>,
    pub fork_new_answer: Option<String>,
    pub fork_original_answer: Option<String>,
    pub fork_dimension: Option<String>,
}

/// A push as it arrives, optionally tagged with the request it answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPush {
    #[serde(default)]
    pub seq: Option<u64>,
    #[serde(flatten)]
    pub patch: SessionPatch,
}

impl AgentPush {
    pub fn untagged(patch: SessionPatch) -> Self {
        Self { seq: None, patch }
    }

    pub fn tagged(seq: u64, patch: SessionPatch) -> Self {
        Self {
            seq: Some(seq),
            patch,
        }
    }

    /// Parses a JSON push.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// What a successfully applied push changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchOutcome {
    /// Wire names of the fields that were written
    pub applied: Vec<&'static str>,
    /// Phase reached through this push, if it changed
    pub advanced_to: Option<Phase>,
}

impl Session {
    /// Merges a collaborator push into the session.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure (`InvalidMapState`,
    /// `InvalidPhaseTransition`, `MalformedPush`, `InvalidDimension`,
    /// `UnknownBranch`). The session is unchanged on error.
    pub fn apply_patch(&mut self, patch: SessionPatch) -> Result<PatchOutcome> {
        let mut draft = self.clone();
        let outcome = patch.apply_to(draft.parts_mut())?;
        *self = draft;
        Ok(outcome)
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}

impl SessionPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply_to(self, parts: SessionParts<'_>) -> Result<PatchOutcome> {
        let mut outcome = PatchOutcome::default();
        let starting_phase = *parts.phase;

        if let Some(phase) = self.phase {
            if phase != *parts.phase {
                parts.phase.advance_to(phase)?;
            }
            outcome.applied.push("phase");
        }

        if let Some(problem) = self.problem {
            let problem = problem.trim();
            if parts.problem.is_empty() {
                *parts.problem = problem.to_string();
            } else if !problem.is_empty() && problem != parts.problem.as_str() {
                return Err(OracleError::MalformedPush(
                    "problem statement cannot change once set".to_string(),
                ));
            }
            outcome.applied.push("problem");
        }

        if let Some(constraints) = self.constraints {
            parts.ledger.replace_constraints(constraints)?;
            outcome.applied.push("constraints");
        }
        if let Some(coverage) = self.dimension_coverage {
            parts.ledger.merge_coverage(&coverage);
            outcome.applied.push("dimensionCoverage");
        }

        if let Some(question) = self.current_question {
            *parts.current_question = question;
            outcome.applied.push("currentQuestion");
        }
        if let Some(target) = self.current_target_dimension {
            *parts.current_target_dimension = match non_empty(target) {
                Some(name) => Some(Dimension::parse(&name)?),
                None => None,
            };
            outcome.applied.push("currentTargetDimension");
        }
        if let Some(is_last) = self.is_last_question {
            *parts.is_last_question = is_last;
            outcome.applied.push("isLastQuestion");
        }

        // An empty map is the collaborator's "no map yet" default, not a
        // replacement.
        if let Some(map) = self.map_state.filter(|m| !m.is_empty()) {
            validate_map(&map)?;
            *parts.map_state = map;
            outcome.applied.push("mapState");
            if *parts.phase == Phase::Ignition {
                parts.phase.advance_to(Phase::Exploration)?;
            }
        }

        let main = self
            .exploration_history
            .map(ExplorationLog::from_entries)
            .transpose()?;
        let active_branch_id = self.active_branch_id.and_then(non_empty);
        if main.is_some() || self.branches.is_some() || active_branch_id.is_some() {
            if main.is_some() {
                outcome.applied.push("explorationHistory");
            }
            if self.branches.is_some() {
                outcome.applied.push("branches");
            }
            if active_branch_id.is_some() {
                outcome.applied.push("activeBranchId");
            }
            parts
                .timelines
                .apply_push(main, self.branches, active_branch_id)?;

            let len = parts.timelines.active_log().len();
            if parts.current_position.is_some_and(|p| p >= len) {
                *parts.current_position = len.checked_sub(1);
            }
        }

        if let Some(node_id) = self.expand_node_id {
            parts.command.expand_node_id = non_empty(node_id);
            outcome.applied.push("expandNodeId");
        }
        if let Some(index) = self.fork_index {
            if index < 0 {
                parts.command.clear_fork();
            } else {
                parts.command.fork_index = Some(index as usize);
            }
            outcome.applied.push("forkIndex");
        }
        if let Some(answer) = self.fork_new_answer {
            parts.command.fork_new_answer = non_empty(answer);
            outcome.applied.push("forkNewAnswer");
        }
        if let Some(answer) = self.fork_original_answer {
            parts.command.fork_original_answer = non_empty(answer);
            outcome.applied.push("forkOriginalAnswer");
        }
        if let Some(dimension) = self.fork_dimension {
            parts.command.fork_dimension = match non_empty(dimension) {
                Some(name) => Some(Dimension::parse(&name)?),
                None => None,
            };
            outcome.applied.push("forkDimension");
        }

        if *parts.phase != starting_phase {
            outcome.advanced_to = Some(*parts.phase);
        }
        Ok(outcome)
    }
}
