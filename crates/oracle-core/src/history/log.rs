//! Append-only exploration log for a single timeline.

use serde::{Deserialize, Serialize};

use super::entry::{HistoryEntry, HistoryEvent};
use crate::error::{OracleError, Result};
use crate::map::{MapState, map_violations};

/// Ordered, gapless sequence of history entries.
///
/// Entries are never mutated or removed once appended; rewinding and
/// forking only read from the log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExplorationLog {
    entries: Vec<HistoryEntry>,
}

impl ExplorationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a log from entries received from the collaborator.
    ///
    /// # Errors
    ///
    /// Returns `MalformedPush` if indices are not exactly `0..len`, or
    /// `InvalidMapState` if a snapshot is neither empty nor a valid tree.
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Result<Self> {
        let gaps: Vec<String> = entries
            .iter()
            .enumerate()
            .filter(|(position, e)| e.index != *position)
            .map(|(position, e)| format!("entry at position {} has index {}", position, e.index))
            .collect();
        if !gaps.is_empty() {
            return Err(OracleError::MalformedPush(gaps.join("; ")));
        }

        let snapshot_violations: Vec<String> = entries
            .iter()
            .filter(|e| !e.map_snapshot.is_empty())
            .flat_map(|e| {
                map_violations(&e.map_snapshot)
                    .into_iter()
                    .map(move |v| format!("snapshot {}: {}", e.index, v))
            })
            .collect();
        if !snapshot_violations.is_empty() {
            return Err(OracleError::InvalidMapState(snapshot_violations));
        }

        Ok(Self { entries })
    }

    /// Records an event, snapshotting `map` by value.
    pub fn append(&mut self, event: HistoryEvent, map: &MapState) -> &HistoryEntry {
        let entry = HistoryEntry {
            index: self.entries.len(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            event,
            map_snapshot: map.clone(),
        };
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn at(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::OracleNode;

    fn map_with_root() -> MapState {
        MapState::from_nodes(vec![OracleNode::root("root", "Root")])
    }

    #[test]
    fn test_indices_are_gapless() {
        let mut log = ExplorationLog::new();
        let map = map_with_root();
        log.append(HistoryEvent::answer("first"), &map);
        log.append(HistoryEvent::node_click("root"), &map);
        log.append(HistoryEvent::answer("third"), &map);

        let indices: Vec<usize> = log.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_snapshot_is_isolated_from_live_map() {
        let mut log = ExplorationLog::new();
        let mut live = map_with_root();
        log.append(HistoryEvent::node_click("root"), &live);

        let root = live.nodes[0].clone();
        live.nodes.push(OracleNode::child_of(&root, "n1", "Child"));
        live.nodes[0].label = "Renamed".to_string();
        live.active_node_id = Some("n1".to_string());

        let snapshot = &log.at(0).unwrap().map_snapshot;
        assert_eq!(snapshot.nodes.len(), 1);
        assert_eq!(snapshot.nodes[0].label, "Root");
        assert!(snapshot.active_node_id.is_none());
    }

    #[test]
    fn test_at_out_of_range() {
        let log = ExplorationLog::new();
        assert!(log.at(0).is_none());
    }

    #[test]
    fn test_entry_wire_format() {
        let mut log = ExplorationLog::new();
        log.append(HistoryEvent::node_click("root"), &map_with_root());

        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json[0]["type"], "nodeClick");
        assert_eq!(json[0]["nodeId"], "root");
        assert_eq!(json[0]["index"], 0);
        assert!(json[0]["mapSnapshot"]["nodes"].is_array());
    }

    #[test]
    fn test_from_entries_rejects_gaps() {
        let mut log = ExplorationLog::new();
        log.append(HistoryEvent::answer("a"), &MapState::default());
        log.append(HistoryEvent::answer("b"), &MapState::default());

        let mut entries = log.entries().to_vec();
        entries.remove(0);
        let err = ExplorationLog::from_entries(entries).unwrap_err();
        assert!(matches!(err, OracleError::MalformedPush(_)));
    }

    #[test]
    fn test_from_entries_accepts_wire_payload() {
        let json = serde_json::json!([
            {
                "index": 0,
                "timestamp": "2026-01-01T00:00:00Z",
                "type": "answer",
                "nodeId": null,
                "answer": "bootstrap",
                "mapSnapshot": { "nodes": [], "edges": [], "activeNodeId": null }
            }
        ]);
        let entries: Vec<HistoryEntry> = serde_json::from_value(json).unwrap();
        let log = ExplorationLog::from_entries(entries).unwrap();
        assert_eq!(log.at(0).unwrap().event.answer_text(), Some("bootstrap"));
    }
}
