//! Outbound sequencing and the waiting flag.

use std::time::Duration;
use tokio::time::Instant;

use oracle_core::config::ReplyOrdering;

/// The request the UI is currently waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    pub seq: u64,
    pub sent_at: Instant,
}

/// Tracks outbound sequence numbers and which replies are still current.
///
/// Requests are numbered from 1. A push tagged with a sequence number
/// older than the newest tagged push already applied is stale; untagged
/// pushes are never stale.
#[derive(Debug, Clone, Default)]
pub struct ReplyTracker {
    last_sent: u64,
    newest_applied: Option<u64>,
    pending: Option<PendingRequest>,
}

impl ReplyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number the next request will carry.
    pub fn next_seq(&self) -> u64 {
        self.last_sent + 1
    }

    /// Records that request `seq` was handed to the collaborator.
    pub fn mark_sent(&mut self, seq: u64, now: Instant) {
        self.last_sent = seq;
        self.pending = Some(PendingRequest { seq, sent_at: now });
    }

    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<PendingRequest> {
        self.pending
    }

    pub fn is_stale(&self, ordering: ReplyOrdering, seq: Option<u64>) -> bool {
        match (ordering, seq, self.newest_applied) {
            (ReplyOrdering::Sequenced, Some(seq), Some(newest)) => seq < newest,
            _ => false,
        }
    }

    /// Records that a push arrived and was handled (applied or rejected).
    ///
    /// Clears the waiting flag unless the push answers an older request
    /// than the one pending.
    pub fn mark_received(&mut self, seq: Option<u64>) {
        if let Some(seq) = seq {
            self.newest_applied = Some(self.newest_applied.map_or(seq, |n| n.max(seq)));
        }
        let answers_pending = match (seq, self.pending) {
            (Some(seq), Some(pending)) => seq >= pending.seq,
            _ => true,
        };
        if answers_pending {
            self.pending = None;
        }
    }

    /// Drops the pending request if it has waited at least `timeout`.
    pub fn expire(&mut self, timeout: Duration, now: Instant) -> Option<(PendingRequest, Duration)> {
        let pending = self.pending?;
        let waited = now.saturating_duration_since(pending.sent_at);
        if waited < timeout {
            return None;
        }
        self.pending = None;
        Some((pending, waited))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_starts_at_one() {
        let mut tracker = ReplyTracker::new();
        assert_eq!(tracker.next_seq(), 1);
        tracker.mark_sent(1, Instant::now());
        assert_eq!(tracker.next_seq(), 2);
        assert!(tracker.is_waiting());
    }

    #[test]
    fn test_stale_only_when_sequenced_and_tagged() {
        let mut tracker = ReplyTracker::new();
        tracker.mark_received(Some(5));

        assert!(tracker.is_stale(ReplyOrdering::Sequenced, Some(4)));
        assert!(!tracker.is_stale(ReplyOrdering::Sequenced, Some(5)));
        assert!(!tracker.is_stale(ReplyOrdering::Sequenced, None));
        assert!(!tracker.is_stale(ReplyOrdering::LastWriteWins, Some(1)));
    }

    #[test]
    fn test_older_reply_keeps_waiting() {
        let mut tracker = ReplyTracker::new();
        let now = Instant::now();
        tracker.mark_sent(1, now);
        tracker.mark_sent(2, now);

        tracker.mark_received(Some(1));
        assert!(tracker.is_waiting());
        tracker.mark_received(Some(2));
        assert!(!tracker.is_waiting());
    }

    #[test]
    fn test_untagged_reply_clears_waiting() {
        let mut tracker = ReplyTracker::new();
        tracker.mark_sent(1, Instant::now());
        tracker.mark_received(None);
        assert!(!tracker.is_waiting());
    }

    #[test]
    fn test_expire_after_timeout() {
        let mut tracker = ReplyTracker::new();
        let sent = Instant::now();
        tracker.mark_sent(3, sent);

        assert!(tracker.expire(Duration::from_secs(8), sent + Duration::from_secs(2)).is_none());
        let (pending, waited) = tracker
            .expire(Duration::from_secs(8), sent + Duration::from_secs(9))
            .unwrap();
        assert_eq!(pending.seq, 3);
        assert_eq!(waited, Duration::from_secs(9));
        assert!(!tracker.is_waiting());
    }
}
