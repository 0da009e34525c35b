//! Boundary to the external agent collaborator.

use async_trait::async_trait;
use oracle_core::error::{OracleError, Result};
use oracle_core::session::OutboundRequest;
use tokio::sync::mpsc;

/// Outbound half of the collaborator protocol.
///
/// Implementations must not wait for the reply: replies arrive later as
/// pushes handed to `SessionController::receive`.
#[async_trait]
pub trait AgentCollaborator: Send + Sync {
    /// Hands a request to the transport.
    ///
    /// # Errors
    ///
    /// Returns `AgentUnavailable` if the transport cannot accept it.
    async fn send(&self, request: OutboundRequest) -> Result<()>;
}

/// Collaborator backed by an unbounded channel; the receiving end belongs
/// to whatever task talks to the real agent.
#[derive(Debug, Clone)]
pub struct ChannelCollaborator {
    sender: mpsc::UnboundedSender<OutboundRequest>,
}

impl ChannelCollaborator {
    pub fn new(sender: mpsc::UnboundedSender<OutboundRequest>) -> Self {
        Self { sender }
    }

    /// Creates a collaborator together with the receiver for its requests.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OutboundRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

#[async_trait]
impl AgentCollaborator for ChannelCollaborator {
    async fn send(&self, request: OutboundRequest) -> Result<()> {
        self.sender
            .send(request)
            .map_err(|e| OracleError::AgentUnavailable(format!("request #{} dropped: channel closed", e.0.seq)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_delivers_in_order() {
        let (collaborator, mut receiver) = ChannelCollaborator::channel();
        for seq in 1..=3 {
            collaborator
                .send(OutboundRequest {
                    seq,
                    text: format!("message {}", seq),
                    command: None,
                })
                .await
                .unwrap();
        }

        for seq in 1..=3 {
            assert_eq!(receiver.recv().await.unwrap().seq, seq);
        }
    }

    #[tokio::test]
    async fn test_closed_channel_is_unavailable() {
        let (collaborator, receiver) = ChannelCollaborator::channel();
        drop(receiver);

        let err = collaborator
            .send(OutboundRequest {
                seq: 1,
                text: "hello".to_string(),
                command: None,
            })
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
