//! Tree invariant checks for maps accepted from the collaborator.

use std::collections::{HashMap, HashSet};

use super::model::{MapState, OracleNode};
use crate::error::{OracleError, Result};

/// Validates a map, reporting every violation at once.
///
/// A valid map is a tree: exactly one node at depth 0 with no parent, and
/// every other node pointing at an existing parent exactly one level up.
/// Edges must mirror those parent links and `activeNodeId`, if set, must
/// name an existing node.
pub fn validate_map(map: &MapState) -> Result<()> {
    let violations = map_violations(map);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(OracleError::InvalidMapState(violations))
    }
}

/// Lists every invariant violation of `map`. Empty means valid.
pub fn map_violations(map: &MapState) -> Vec<String> {
    let mut violations = Vec::new();

    let mut by_id: HashMap<&str, &OracleNode> = HashMap::new();
    for node in &map.nodes {
        if by_id.insert(node.id.as_str(), node).is_some() {
            violations.push(format!("duplicate node id '{}'", node.id));
        }
        if !node.position.in_bounds() {
            violations.push(format!(
                "node '{}' position ({}, {}) outside 0-100",
                node.id, node.position.x, node.position.y
            ));
        }
    }

    let roots: Vec<&OracleNode> = map.nodes.iter().filter(|n| n.depth == 0).collect();
    match roots.as_slice() {
        [] => violations.push("no depth-0 root node".to_string()),
        [root] => {
            if root.parent_id.is_some() {
                violations.push(format!("root node '{}' has a parent", root.id));
            }
        }
        many => violations.push(format!(
            "{} depth-0 nodes, expected exactly one",
            many.len()
        )),
    }

    for node in map.nodes.iter().filter(|n| n.depth > 0) {
        match node.parent_id.as_deref() {
            None => violations.push(format!(
                "node '{}' at depth {} has no parent",
                node.id, node.depth
            )),
            Some(parent_id) => match by_id.get(parent_id) {
                None => violations.push(format!(
                    "node '{}' references missing parent '{}'",
                    node.id, parent_id
                )),
                Some(parent) if parent.depth.checked_add(1) != Some(node.depth) => violations.push(format!(
                    "node '{}' at depth {} has parent '{}' at depth {}",
                    node.id, node.depth, parent.id, parent.depth
                )),
                Some(_) => {}
            },
        }
    }

    let mut seen_edges = HashSet::new();
    for edge in &map.edges {
        if !seen_edges.insert((edge.source_id.as_str(), edge.target_id.as_str())) {
            violations.push(format!(
                "duplicate edge '{}' -> '{}'",
                edge.source_id, edge.target_id
            ));
            continue;
        }
        if !by_id.contains_key(edge.source_id.as_str()) {
            violations.push(format!("edge source '{}' not found", edge.source_id));
            continue;
        }
        match by_id.get(edge.target_id.as_str()) {
            None => violations.push(format!("edge target '{}' not found", edge.target_id)),
            Some(target) if target.parent_id.as_deref() != Some(edge.source_id.as_str()) => {
                violations.push(format!(
                    "edge '{}' -> '{}' disagrees with parentId",
                    edge.source_id, edge.target_id
                ))
            }
            Some(_) => {}
        }
    }

    if let Some(active) = map.active_node_id.as_deref() {
        if !by_id.contains_key(active) {
            violations.push(format!("activeNodeId '{}' not found", active));
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{OracleEdge, Position};

    fn valid_map() -> MapState {
        let root = OracleNode::root("root", "Root");
        let a = OracleNode::child_of(&root, "a", "A");
        let b = OracleNode::child_of(&root, "b", "B");
        let c = OracleNode::child_of(&a, "c", "C");
        MapState::from_nodes(vec![root, a, b, c])
    }

    #[test]
    fn test_valid_tree_passes() {
        assert!(validate_map(&valid_map()).is_ok());
    }

    #[test]
    fn test_parent_at_max_depth_is_a_violation() {
        let root = OracleNode::root("root", "Root");
        let mut a = OracleNode::child_of(&root, "a", "A");
        a.depth = u32::MAX;
        let mut b = OracleNode::child_of(&root, "b", "B");
        b.parent_id = Some("a".to_string());
        let map = MapState::from_nodes(vec![root, a, b]);

        let violations = map_violations(&map);
        assert!(violations
            .iter()
            .any(|v| v == "node 'a' at depth 4294967295 has parent 'root' at depth 0"));
        assert!(violations
            .iter()
            .any(|v| v == "node 'b' at depth 1 has parent 'a' at depth 4294967295"));
    }

    #[test]
    fn test_empty_map_has_no_root() {
        let violations = map_violations(&MapState::default());
        assert_eq!(violations, vec!["no depth-0 root node".to_string()]);
    }

    #[test]
    fn test_two_roots_rejected() {
        let mut map = valid_map();
        map.nodes.push(OracleNode::root("root2", "Other"));
        assert!(matches!(validate_map(&map), Err(OracleError::InvalidMapState(_))));
    }

    #[test]
    fn test_depth_must_be_parent_plus_one() {
        let mut map = valid_map();
        map.nodes[3].depth = 3;
        let violations = map_violations(&map);
        assert!(violations.iter().any(|v| v.contains("has parent 'a' at depth 1")));
    }

    #[test]
    fn test_missing_parent_and_dangling_edge() {
        let mut map = valid_map();
        map.nodes[2].parent_id = Some("ghost".to_string());
        map.edges.push(OracleEdge::new("root", "nowhere"));
        let violations = map_violations(&map);
        assert!(violations.iter().any(|v| v.contains("missing parent 'ghost'")));
        assert!(violations.iter().any(|v| v.contains("edge target 'nowhere'")));
    }

    #[test]
    fn test_active_node_and_bounds_checked() {
        let mut map = valid_map();
        map.active_node_id = Some("zzz".to_string());
        map.nodes[1].position = Position { x: 120.0, y: 5.0 };
        let violations = map_violations(&map);
        assert_eq!(violations.len(), 2);
    }
}
