//! The session controller.
//!
//! UI intents never touch the session directly. Each one runs against a
//! draft copy; the draft is committed only after the core operation and the
//! outbound send both succeed, so a failed intent leaves no trace.

use std::sync::Arc;
use tokio::time::Instant;

use oracle_core::config::OracleConfig;
use oracle_core::error::{OracleError, Result};
use oracle_core::interrogation::{ConstraintType, Dimension};
use oracle_core::map::MapState;
use oracle_core::session::{AgentCommand, AgentPush, OutboundRequest, PatchOutcome, Session, UiIntent};

use super::notice::Notice;
use super::replies::ReplyTracker;
use crate::collaborator::AgentCollaborator;

/// What happened to an inbound push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushDisposition {
    Applied(PatchOutcome),
    /// Answered a request older than one already answered
    Stale { seq: u64 },
}

/// Text and optional structured command to send after a draft succeeds.
struct Outbound {
    text: String,
    command: Option<AgentCommand>,
}

impl Outbound {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            command: None,
        }
    }

    fn command(command: AgentCommand) -> Self {
        Self {
            text: command.message(),
            command: Some(command),
        }
    }
}

/// Owns the session and routes every change to it.
pub struct SessionController<C: AgentCollaborator> {
    session: Session,
    collaborator: Arc<C>,
    config: OracleConfig,
    replies: ReplyTracker,
}

impl<C: AgentCollaborator> SessionController<C> {
    /// Creates a controller around a fresh session.
    pub fn new(collaborator: Arc<C>, config: OracleConfig) -> Self {
        Self::with_session(Session::new(), collaborator, config)
    }

    pub fn with_session(session: Session, collaborator: Arc<C>, config: OracleConfig) -> Self {
        Self {
            session,
            collaborator,
            config,
            replies: ReplyTracker::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// True while a request is outstanding; the UI disables input.
    pub fn is_waiting(&self) -> bool {
        self.replies.is_waiting()
    }

    // ============================================================================
    // UI intents
    // ============================================================================

    /// Handles an intent, converting any failure into a notice.
    ///
    /// Returns `None` when the intent succeeded.
    pub async fn dispatch(&mut self, intent: UiIntent) -> Option<Notice> {
        let name = intent.name();
        match self.handle(intent).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("[SessionController] {} rejected: {}", name, e);
                Some(Notice::from_error(name, &e))
            }
        }
    }

    /// Handles an intent, propagating failures.
    pub async fn handle(&mut self, intent: UiIntent) -> Result<()> {
        match intent {
            UiIntent::SubmitProblem { problem } => self.submit_problem(&problem).await,
            UiIntent::SubmitAnswer {
                answer,
                dimension,
                constraint_type,
            } => {
                self.submit_answer(&answer, dimension.as_deref(), constraint_type)
                    .await
            }
            UiIntent::ConfirmIgnition => self.confirm_ignition().await,
            UiIntent::ClickNode { node_id } => self.click_node(&node_id).await,
            UiIntent::Fork {
                from_index,
                new_answer,
                dimension,
            } => self.fork(from_index, &new_answer, &dimension).await,
            UiIntent::Rewind {
                branch_id,
                event_index,
            } => self.rewind(&branch_id, event_index).map(|_| ()),
            UiIntent::SwitchBranch { branch_id } => self.switch_branch(&branch_id),
            UiIntent::DiscardFork { branch_id } => self.discard_fork(&branch_id),
        }
    }

    pub async fn submit_problem(&mut self, problem: &str) -> Result<()> {
        self.transact(|session, _| {
            session.submit_problem(problem)?;
            Ok(Outbound::text(session.problem()))
        })
        .await?;
        tracing::info!(
            "[SessionController] session {} entered interrogation",
            self.session.session_id()
        );
        Ok(())
    }

    pub async fn submit_answer(
        &mut self,
        answer: &str,
        dimension: Option<&str>,
        constraint_type: Option<ConstraintType>,
    ) -> Result<()> {
        self.transact(|session, config| {
            let constraint_type =
                constraint_type.unwrap_or(config.interrogation.default_constraint_type);
            let constraint = session.record_answer(dimension, answer, constraint_type)?;
            tracing::debug!(
                "[SessionController] recorded {} answer #{} ({} of 5 dimensions covered)",
                constraint.dimension,
                constraint.timeline_index,
                session.dimension_coverage().covered_count()
            );
            Ok(Outbound::text(answer))
        })
        .await
    }

    pub async fn confirm_ignition(&mut self) -> Result<()> {
        self.transact(|session, config| {
            session.confirm_ignition()?;
            Ok(Outbound::text(config.agent.confirmation_phrase.clone()))
        })
        .await?;
        tracing::info!(
            "[SessionController] session {} entered ignition",
            self.session.session_id()
        );
        Ok(())
    }

    pub async fn click_node(&mut self, node_id: &str) -> Result<()> {
        self.transact(|session, _| {
            let entry = session.click_node(node_id)?;
            tracing::debug!(
                "[SessionController] node {} clicked at history index {} on '{}'",
                node_id,
                entry.index,
                session.active_branch_id()
            );
            let command = AgentCommand::Expand {
                node_id: node_id.to_string(),
            };
            session.stage_command(&command);
            Ok(Outbound::command(command))
        })
        .await
    }

    pub async fn fork(&mut self, from_index: usize, new_answer: &str, dimension: &str) -> Result<()> {
        let dimension = Dimension::parse(dimension)?;
        let branch_id = self
            .transact(|session, _| {
                let original_answer = session.original_answer_at(from_index);
                let branch = session.fork(from_index, new_answer, dimension)?;
                let command = AgentCommand::Fork {
                    fork_index: from_index,
                    new_answer: new_answer.to_string(),
                    original_answer,
                    dimension,
                };
                session.stage_command(&command);
                Ok((Outbound::command(command), branch.branch_id))
            })
            .await?;
        tracing::info!(
            "[SessionController] forked '{}' from main index {}",
            branch_id,
            from_index
        );
        Ok(())
    }

    /// Moves the cursor; local only, nothing is sent.
    pub fn rewind(&mut self, branch_id: &str, event_index: usize) -> Result<&MapState> {
        tracing::debug!(
            "[SessionController] rewind '{}' to {}",
            branch_id,
            event_index
        );
        self.session.rewind(branch_id, event_index)
    }

    pub fn switch_branch(&mut self, branch_id: &str) -> Result<()> {
        self.session.switch_branch(branch_id)?;
        tracing::debug!("[SessionController] active branch is now '{}'", branch_id);
        Ok(())
    }

    pub fn discard_fork(&mut self, branch_id: &str) -> Result<()> {
        let removed = self.session.discard_fork(branch_id)?;
        tracing::info!(
            "[SessionController] discarded fork '{}' ({} events)",
            removed.branch_id,
            removed.exploration_history.len()
        );
        Ok(())
    }

    // ============================================================================
    // Collaborator pushes
    // ============================================================================

    /// Applies a push from the collaborator.
    ///
    /// Stale pushes are dropped. A push that fails validation is rejected
    /// whole and the previous state is kept; it still counts as a reply.
    pub fn receive(&mut self, push: AgentPush) -> Result<PushDisposition> {
        let ordering = self.config.replies.ordering;
        if let Some(seq) = push.seq.filter(|_| self.replies.is_stale(ordering, push.seq)) {
            tracing::warn!(
                "[SessionController] dropped stale push for request #{}",
                seq
            );
            return Ok(PushDisposition::Stale { seq });
        }

        let result = self.session.apply_patch(push.patch);
        self.replies.mark_received(push.seq);

        match result {
            Ok(outcome) => {
                if let Some(phase) = outcome.advanced_to {
                    tracing::info!("[SessionController] collaborator moved session to {}", phase);
                }
                tracing::debug!(
                    "[SessionController] applied push fields: {:?}",
                    outcome.applied
                );
                Ok(PushDisposition::Applied(outcome))
            }
            Err(e) => {
                tracing::warn!("[SessionController] rejected push: {}", e);
                Err(e)
            }
        }
    }

    /// Parses and applies a JSON push.
    pub fn receive_json(&mut self, text: &str) -> Result<PushDisposition> {
        let push = AgentPush::from_json(text).inspect_err(|e| {
            tracing::warn!("[SessionController] unreadable push: {}", e);
        })?;
        self.receive(push)
    }

    /// Gives up on a request that has waited past the configured timeout.
    ///
    /// Returns a retryable notice when the waiting flag was cleared.
    pub fn expire_stale_request(&mut self, now: Instant) -> Option<Notice> {
        let timeout = self.config.agent.reply_timeout()?;
        let (pending, waited) = self.replies.expire(timeout, now)?;
        let error = OracleError::ReplyTimeout {
            seq: pending.seq,
            waited_ms: waited.as_millis() as u64,
        };
        tracing::warn!("[SessionController] {}", error);
        Some(Notice::from_error("agent", &error))
    }

    // ============================================================================
    // Helpers
    // ============================================================================

    /// Runs `operation` on a draft, sends its request, then commits.
    async fn transact<T, F>(&mut self, operation: F) -> Result<T::Value>
    where
        T: IntoOutbound,
        F: FnOnce(&mut Session, &OracleConfig) -> Result<T>,
    {
        let mut draft = self.session.clone();
        let (outbound, value) = operation(&mut draft, &self.config)?.into_outbound();

        let request = OutboundRequest {
            seq: self.replies.next_seq(),
            text: outbound.text,
            command: outbound.command,
        };
        let seq = request.seq;
        self.collaborator.send(request).await?;

        self.replies.mark_sent(seq, Instant::now());
        self.session = draft;
        Ok(value)
    }
}

/// Splits an operation result into the request to send and the value
/// returned to the caller.
trait IntoOutbound {
    type Value;
    fn into_outbound(self) -> (Outbound, Self::Value);
}

impl IntoOutbound for Outbound {
    type Value = ();
    fn into_outbound(self) -> (Outbound, ()) {
        (self, ())
    }
}

impl<V> IntoOutbound for (Outbound, V) {
    type Value = V;
    fn into_outbound(self) -> (Outbound, V) {
        self
    }
}
