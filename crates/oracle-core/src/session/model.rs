//! Session domain model.
//!
//! The session is the single owned record shared with the agent
//! collaborator. Its fields are private: every change goes through the
//! ledger, history log, branch manager or patch operations below, each of
//! which validates first and mutates only on success.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::command::{AgentCommand, CommandFields};
use super::phase::Phase;
use crate::branch::{Branch, BranchManager};
use crate::error::{OracleError, Result};
use crate::history::{ExplorationLog, HistoryEntry, HistoryEvent};
use crate::interrogation::{Constraint, ConstraintLedger, ConstraintType, Dimension, DimensionCoverage};
use crate::map::MapState;

/// A user session, from problem entry through map exploration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    session_id: String,
    phase: Phase,
    problem: String,
    #[serde(flatten)]
    ledger: ConstraintLedger,
    #[serde(default)]
    current_question: String,
    #[serde(default)]
    current_target_dimension: Option<Dimension>,
    #[serde(default)]
    is_last_question: bool,
    #[serde(default)]
    map_state: MapState,
    #[serde(flatten)]
    timelines: BranchManager,
    /// Cursor into the active timeline, moved by appends and rewinds
    #[serde(default)]
    current_position: Option<usize>,
    #[serde(flatten)]
    command: CommandFields,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a fresh session in the entry phase.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            phase: Phase::Entry,
            problem: String::new(),
            ledger: ConstraintLedger::new(),
            current_question: String::new(),
            current_target_dimension: None,
            is_last_question: false,
            map_state: MapState::default(),
            timelines: BranchManager::new(),
            current_position: None,
            command: CommandFields::default(),
        }
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn ledger(&self) -> &ConstraintLedger {
        &self.ledger
    }

    pub fn constraints(&self) -> &[Constraint] {
        self.ledger.constraints()
    }

    pub fn dimension_coverage(&self) -> &DimensionCoverage {
        self.ledger.coverage()
    }

    pub fn current_question(&self) -> &str {
        &self.current_question
    }

    pub fn current_target_dimension(&self) -> Option<Dimension> {
        self.current_target_dimension
    }

    pub fn is_last_question(&self) -> bool {
        self.is_last_question
    }

    pub fn map_state(&self) -> &MapState {
        &self.map_state
    }

    pub fn timelines(&self) -> &BranchManager {
        &self.timelines
    }

    pub fn exploration_history(&self) -> &ExplorationLog {
        self.timelines.main()
    }

    pub fn branches(&self) -> &[Branch] {
        self.timelines.branches()
    }

    pub fn active_branch_id(&self) -> &str {
        self.timelines.active_branch_id()
    }

    pub fn current_position(&self) -> Option<usize> {
        self.current_position
    }

    pub fn command(&self) -> &CommandFields {
        &self.command
    }

    // ============================================================================
    // Phase transitions
    // ============================================================================

    /// Sets the problem statement and enters interrogation.
    ///
    /// # Errors
    ///
    /// - `EmptyProblem` if the text is blank
    /// - `ProblemAlreadySet` if a problem was already submitted
    pub fn submit_problem(&mut self, text: &str) -> Result<()> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(OracleError::EmptyProblem);
        }
        if !self.problem.is_empty() {
            return Err(OracleError::ProblemAlreadySet);
        }
        self.phase.advance_to(Phase::Interrogation)?;
        self.problem = trimmed.to_string();
        Ok(())
    }

    /// Closes interrogation once every dimension is covered.
    ///
    /// # Errors
    ///
    /// - `InvalidPhase` outside interrogation
    /// - `InterrogationIncomplete` listing the dimensions still missing
    pub fn confirm_ignition(&mut self) -> Result<()> {
        self.phase.expect(Phase::Interrogation)?;
        if !self.ledger.is_complete() {
            return Err(OracleError::InterrogationIncomplete {
                missing: self.ledger.coverage().uncovered(),
            });
        }
        self.phase.advance_to(Phase::Ignition)
    }

    // ============================================================================
    // Ledger and history
    // ============================================================================

    /// Records an answer for `dimension`, or for the dimension the current
    /// question targets when none is given.
    ///
    /// During exploration the answer is also appended to the active
    /// timeline.
    pub fn record_answer(
        &mut self,
        dimension: Option<&str>,
        value: &str,
        constraint_type: ConstraintType,
    ) -> Result<Constraint> {
        if !matches!(self.phase, Phase::Interrogation | Phase::Exploration) {
            return Err(OracleError::InvalidPhase {
                expected: Phase::Interrogation,
                actual: self.phase,
            });
        }

        let dimension = match dimension {
            Some(name) => Dimension::parse(name)?,
            None => self
                .current_target_dimension
                .ok_or_else(|| OracleError::InvalidDimension(String::new()))?,
        };

        let constraint = self.ledger.record(dimension, value, constraint_type).clone();
        if self.phase == Phase::Exploration {
            self.append_event(HistoryEvent::answer(value));
        }
        Ok(constraint)
    }

    /// Marks `node_id` active and records the click on the active timeline.
    ///
    /// # Errors
    ///
    /// - `InvalidPhase` outside exploration
    /// - `NotFound` if the node is not on the live map
    pub fn click_node(&mut self, node_id: &str) -> Result<HistoryEntry> {
        self.phase.expect(Phase::Exploration)?;
        self.map_state.set_active(node_id)?;
        Ok(self.append_event(HistoryEvent::node_click(node_id)))
    }

    fn append_event(&mut self, event: HistoryEvent) -> HistoryEntry {
        let entry = self.timelines.append_to_active(event, &self.map_state).clone();
        self.current_position = Some(entry.index);
        entry
    }

    // ============================================================================
    // Branching
    // ============================================================================

    /// Creates the fork and makes it the active timeline showing its
    /// fork-time map.
    pub fn fork(&mut self, from_index: usize, new_answer: &str, dimension: Dimension) -> Result<Branch> {
        self.phase.expect(Phase::Exploration)?;
        let branch = self.timelines.fork(from_index, new_answer, dimension)?.clone();
        self.timelines.switch_active(&branch.branch_id)?;
        self.map_state = branch.map_snapshot.clone();
        self.current_position = None;
        Ok(branch)
    }

    /// Answer being replaced by a fork at `from_index`.
    ///
    /// `from_index` is read as a ledger position (`timelineIndex`), the
    /// index the collaborator uses to pick the constraint it rewrites.
    /// Empty when no constraint sits there.
    pub fn original_answer_at(&self, from_index: usize) -> String {
        self.ledger
            .at(from_index)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// Activates a timeline and shows its latest map.
    pub fn switch_branch(&mut self, branch_id: &str) -> Result<()> {
        let tip = self.timelines.tip_map(branch_id)?;
        self.timelines.switch_active(branch_id)?;
        if let Some(map) = tip {
            self.map_state = map;
        }
        self.current_position = self.timelines.active_log().len().checked_sub(1);
        Ok(())
    }

    /// Moves the cursor to `event_index` on `branch_id` and shows the map
    /// stored there. History is left intact.
    pub fn rewind(&mut self, branch_id: &str, event_index: usize) -> Result<&MapState> {
        let snapshot = self.timelines.rewind(branch_id, event_index)?;
        if self.timelines.active_branch_id() != branch_id {
            self.timelines.switch_active(branch_id)?;
        }
        self.map_state = snapshot;
        self.current_position = Some(event_index);
        Ok(&self.map_state)
    }

    /// Drops the fork; if it was active the main timeline's tip is shown.
    pub fn discard_fork(&mut self, branch_id: &str) -> Result<Branch> {
        let was_active = self.timelines.active_branch_id() == branch_id;
        let removed = self.timelines.discard_fork(branch_id)?;
        if was_active {
            if let Some(map) = self.timelines.tip_map(crate::branch::MAIN_BRANCH_ID)? {
                self.map_state = map;
            }
            self.current_position = self.timelines.main().len().checked_sub(1);
        }
        if self.command.fork_index.is_some() {
            self.command.clear_fork();
        }
        Ok(removed)
    }

    /// Sets the transient fields for a command about to be sent.
    pub fn stage_command(&mut self, command: &AgentCommand) {
        self.command.set(command);
    }

    // ============================================================================
    // Collaborator pushes (see patch.rs)
    // ============================================================================

    pub(crate) fn parts_mut(&mut self) -> SessionParts<'_> {
        SessionParts {
            phase: &mut self.phase,
            problem: &mut self.problem,
            ledger: &mut self.ledger,
            current_question: &mut self.current_question,
            current_target_dimension: &mut self.current_target_dimension,
            is_last_question: &mut self.is_last_question,
            map_state: &mut self.map_state,
            timelines: &mut self.timelines,
            current_position: &mut self.current_position,
            command: &mut self.command,
        }
    }
}

/// Mutable view used by patch application.
pub(crate) struct SessionParts<'a> {
    pub phase: &'a mut Phase,
    pub problem: &'a mut String,
    pub ledger: &'a mut ConstraintLedger,
    pub current_question: &'a mut String,
    pub current_target_dimension: &'a mut Option<Dimension>,
    pub is_last_question: &'a mut bool,
    pub map_state: &'a mut MapState,
    pub timelines: &'a mut BranchManager,
    pub current_position: &'a mut Option<usize>,
    pub command: &'a mut CommandFields,
}
