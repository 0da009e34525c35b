//! Solution map model.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{OracleError, Result};
use crate::interrogation::Dimension;

/// Broad theme of a node, used for colouring by renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeCategory {
    Financial,
    Strategic,
    Operational,
    Tactical,
}

/// Placement in percentage coordinates (0–100 on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Default for Position {
    fn default() -> Self {
        Self { x: 50.0, y: 50.0 }
    }
}

impl Position {
    pub fn in_bounds(&self) -> bool {
        (0.0..=100.0).contains(&self.x) && (0.0..=100.0).contains(&self.y)
    }
}

/// One node of the solution map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleNode {
    pub id: String,
    pub label: String,
    pub depth: u32,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub conflict_flag: bool,
    #[serde(default)]
    pub conflict_reason: String,
    #[serde(default)]
    pub category: Option<NodeCategory>,
    /// Dimension the node mainly answers to, if the collaborator set one
    #[serde(default)]
    pub dimension: Option<Dimension>,
    #[serde(flatten)]
    pub position: Position,
}

impl OracleNode {
    /// Creates the depth-0 root node.
    pub fn root(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            depth: 0,
            parent_id: None,
            conflict_flag: false,
            conflict_reason: String::new(),
            category: None,
            dimension: None,
            position: Position::default(),
        }
    }

    /// Creates a child one level below `parent`.
    pub fn child_of(parent: &OracleNode, id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            depth: parent.depth.saturating_add(1),
            parent_id: Some(parent.id.clone()),
            conflict_flag: false,
            conflict_reason: String::new(),
            category: None,
            dimension: None,
            position: parent.position,
        }
    }

    pub fn is_root(&self) -> bool {
        self.depth == 0 && self.parent_id.is_none()
    }
}

/// Directed parent → child link, kept alongside `parentId` for renderers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleEdge {
    pub source_id: String,
    pub target_id: String,
}

impl OracleEdge {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
        }
    }
}

/// The live (or snapshotted) solution map.
///
/// `Clone` produces a fully independent copy; snapshots rely on this.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapState {
    #[serde(default)]
    pub nodes: Vec<OracleNode>,
    #[serde(default)]
    pub edges: Vec<OracleEdge>,
    #[serde(default)]
    pub active_node_id: Option<String>,
}

impl MapState {
    /// Builds a map from nodes, deriving one edge per parent link.
    pub fn from_nodes(nodes: Vec<OracleNode>) -> Self {
        let edges = nodes
            .iter()
            .filter_map(|n| {
                n.parent_id
                    .as_ref()
                    .map(|parent| OracleEdge::new(parent.clone(), n.id.clone()))
            })
            .collect();
        Self {
            nodes,
            edges,
            active_node_id: None,
        }
    }

    /// True for the "no map yet" state.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.active_node_id.is_none()
    }

    pub fn node(&self, id: &str) -> Option<&OracleNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn root(&self) -> Option<&OracleNode> {
        self.nodes.iter().find(|n| n.is_root())
    }

    pub fn children<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a OracleNode> + 'a {
        self.nodes
            .iter()
            .filter(move |n| n.parent_id.as_deref() == Some(id))
    }

    pub fn active_node(&self) -> Option<&OracleNode> {
        self.active_node_id.as_deref().and_then(|id| self.node(id))
    }

    /// Marks a node as the one being explored.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the node is not part of the map.
    pub fn set_active(&mut self, id: &str) -> Result<()> {
        if !self.contains(id) {
            return Err(OracleError::not_found("OracleNode", id));
        }
        self.active_node_id = Some(id.to_string());
        Ok(())
    }

    /// Labels from the root down to `id`, inclusive.
    ///
    /// Returns an empty list if the node does not exist.
    pub fn parent_chain(&self, id: &str) -> Vec<String> {
        let by_id: HashMap<&str, &OracleNode> =
            self.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        let mut chain = Vec::new();
        let mut current = by_id.get(id).copied();
        // Bounded by node count so a malformed cycle cannot loop forever.
        while let Some(node) = current {
            if chain.len() > self.nodes.len() {
                break;
            }
            chain.push(node.label.clone());
            current = node
                .parent_id
                .as_deref()
                .and_then(|parent| by_id.get(parent).copied());
        }
        chain.reverse();
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> MapState {
        let root = OracleNode::root("root", "Launch a bakery");
        let n1 = OracleNode::child_of(&root, "n1", "Farmers market stall");
        let n2 = OracleNode::child_of(&root, "n2", "Wholesale to cafes");
        let n3 = OracleNode::child_of(&n2, "n3", "Sourdough subscription");
        MapState::from_nodes(vec![root, n1, n2, n3])
    }

    #[test]
    fn test_from_nodes_derives_edges() {
        let map = sample_map();
        assert_eq!(map.edges.len(), 3);
        assert!(map.edges.contains(&OracleEdge::new("n2", "n3")));
        assert_eq!(map.children("root").count(), 2);
    }

    #[test]
    fn test_parent_chain_runs_root_first() {
        let map = sample_map();
        assert_eq!(
            map.parent_chain("n3"),
            vec!["Launch a bakery", "Wholesale to cafes", "Sourdough subscription"]
        );
        assert!(map.parent_chain("missing").is_empty());
    }

    #[test]
    fn test_set_active_requires_existing_node() {
        let mut map = sample_map();
        map.set_active("n1").unwrap();
        assert_eq!(map.active_node().unwrap().label, "Farmers market stall");

        let err = map.set_active("ghost").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(map.active_node_id.as_deref(), Some("n1"));
    }

    #[test]
    fn test_node_wire_format_is_flat() {
        let json = serde_json::json!({
            "id": "root",
            "label": "Root",
            "depth": 0,
            "parentId": null,
            "x": 12.5,
            "y": 40.0
        });
        let node: OracleNode = serde_json::from_value(json).unwrap();
        assert!(node.is_root());
        assert_eq!(node.position, Position { x: 12.5, y: 40.0 });
        assert!(!node.conflict_flag);
        assert!(node.dimension.is_none());
    }

    #[test]
    fn test_node_dimension_survives_round_trip() {
        let json = serde_json::json!({
            "id": "n1",
            "label": "Neighbourhood cafes",
            "depth": 1,
            "parentId": "root",
            "dimension": "market",
            "category": "strategic",
            "x": 30.0,
            "y": 40.0
        });
        let node: OracleNode = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(node.dimension, Some(Dimension::Market));

        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back["dimension"], "market");
        assert_eq!(back["category"], "strategic");
    }
}
