#[cfg(test)]
mod tests {
    use crate::branch::{BranchManager, MAIN_BRANCH_ID};
    use crate::error::OracleError;
    use crate::history::HistoryEvent;
    use crate::interrogation::Dimension;
    use crate::map::{MapState, OracleNode};

    /// Main timeline with `count` node clicks, each snapshot one node larger.
    fn manager_with_history(count: usize) -> BranchManager {
        let mut manager = BranchManager::new();
        let root = OracleNode::root("root", "Root");
        let mut nodes = vec![root.clone()];
        for i in 0..count {
            nodes.push(OracleNode::child_of(&root, format!("n{}", i), format!("Node {}", i)));
            let map = MapState::from_nodes(nodes.clone());
            manager.append_to_active(HistoryEvent::node_click(format!("n{}", i)), &map);
        }
        manager
    }

    #[test]
    fn test_fork_copies_main_snapshot() {
        let mut manager = manager_with_history(4);
        let expected = manager.main().at(2).unwrap().map_snapshot.clone();

        let branch = manager
            .fork(2, "value-based pricing", Dimension::Market)
            .unwrap()
            .clone();

        assert_eq!(branch.fork_index, 2);
        assert_ne!(branch.branch_id, MAIN_BRANCH_ID);
        assert_eq!(branch.map_snapshot, expected);
        assert_eq!(branch.label, "Fork at Q3");
        assert!(branch.exploration_history.is_empty());
        assert_eq!(manager.main().len(), 4);
        assert!(manager.is_main_active());
    }

    #[test]
    fn test_second_fork_rejected() {
        let mut manager = manager_with_history(3);
        let first = manager.fork(0, "a", Dimension::Resources).unwrap().branch_id.clone();

        let err = manager.fork(1, "b", Dimension::Timeline).unwrap_err();
        assert_eq!(err, OracleError::AlreadyForked { branch_id: first });
        assert_eq!(manager.branches().len(), 1);
    }

    #[test]
    fn test_fork_out_of_range() {
        let mut manager = manager_with_history(2);
        let err = manager.fork(2, "a", Dimension::Market).unwrap_err();
        assert_eq!(err, OracleError::out_of_range("main", 2, 2));
        assert!(manager.branches().is_empty());
    }

    #[test]
    fn test_discard_allows_new_fork() {
        let mut manager = manager_with_history(2);
        let id = manager.fork(0, "a", Dimension::Market).unwrap().branch_id.clone();
        manager.switch_active(&id).unwrap();

        manager.discard_fork(&id).unwrap();
        assert!(manager.is_main_active());
        assert!(manager.fork(1, "b", Dimension::Market).is_ok());
    }

    #[test]
    fn test_main_cannot_be_discarded() {
        let mut manager = manager_with_history(1);
        assert!(matches!(
            manager.discard_fork(MAIN_BRANCH_ID),
            Err(OracleError::UnknownBranch(_))
        ));
    }

    #[test]
    fn test_switch_active_unknown_branch() {
        let mut manager = manager_with_history(1);
        let err = manager.switch_active("nope").unwrap_err();
        assert_eq!(err, OracleError::UnknownBranch("nope".to_string()));
        assert!(manager.is_main_active());
    }

    #[test]
    fn test_switch_round_trip() {
        let mut manager = manager_with_history(2);
        let id = manager.fork(1, "a", Dimension::Market).unwrap().branch_id.clone();

        manager.switch_active(&id).unwrap();
        assert_eq!(manager.active_branch_id(), id);
        manager.switch_active(MAIN_BRANCH_ID).unwrap();
        assert!(manager.is_main_active());
    }

    #[test]
    fn test_rewind_returns_snapshot_without_truncating() {
        let mut manager = manager_with_history(5);
        let snapshot = manager.rewind(MAIN_BRANCH_ID, 1).unwrap();
        assert_eq!(snapshot.nodes.len(), 3);

        let original_len = manager.main().len();
        manager.append_to_active(HistoryEvent::node_click("n0"), &snapshot);
        assert_eq!(manager.main().len(), original_len + 1);
        assert_eq!(manager.main().last().unwrap().index, original_len);
    }

    #[test]
    fn test_rewind_errors() {
        let manager = manager_with_history(2);
        assert!(matches!(
            manager.rewind(MAIN_BRANCH_ID, 7),
            Err(OracleError::IndexOutOfRange { index: 7, len: 2, .. })
        ));
        assert!(matches!(
            manager.rewind("ghost", 0),
            Err(OracleError::UnknownBranch(_))
        ));
    }

    #[test]
    fn test_appends_follow_active_timeline() {
        let mut manager = manager_with_history(3);
        let id = manager.fork(0, "a", Dimension::Market).unwrap().branch_id.clone();
        manager.switch_active(&id).unwrap();

        let map = manager.branch(&id).unwrap().map_snapshot.clone();
        manager.append_to_active(HistoryEvent::node_click("root"), &map);
        manager.append_to_active(HistoryEvent::answer("more"), &map);

        let fork_log = manager.log(&id).unwrap();
        let indices: Vec<usize> = fork_log.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(manager.main().len(), 3);
    }

    #[test]
    fn test_tip_map_of_fresh_fork_is_fork_snapshot() {
        let mut manager = manager_with_history(3);
        let id = manager.fork(1, "a", Dimension::Market).unwrap().branch_id.clone();

        let tip = manager.tip_map(&id).unwrap().unwrap();
        assert_eq!(tip, manager.main().at(1).unwrap().map_snapshot);
        assert_eq!(
            manager.tip_map(MAIN_BRANCH_ID).unwrap().unwrap(),
            manager.main().at(2).unwrap().map_snapshot
        );
    }

    #[test]
    fn test_apply_push_rejects_unknown_active_id() {
        let mut manager = manager_with_history(1);
        let before = manager.clone();
        let err = manager
            .apply_push(None, Some(Vec::new()), Some("elsewhere".to_string()))
            .unwrap_err();

        assert!(matches!(err, OracleError::UnknownBranch(_)));
        assert_eq!(manager, before);
    }

    #[test]
    fn test_apply_push_rejects_extra_forks() {
        let mut manager = manager_with_history(2);
        let mut donor = manager.clone();
        let first = donor.fork(0, "a", Dimension::Market).unwrap().clone();
        let mut second = first.clone();
        second.branch_id = "other".to_string();

        let err = manager
            .apply_push(None, Some(vec![first, second]), None)
            .unwrap_err();
        assert!(matches!(err, OracleError::MalformedPush(_)));
        assert!(manager.branches().is_empty());
    }

    #[test]
    fn test_apply_push_rejects_fork_index_past_main() {
        let mut manager = manager_with_history(2);
        let mut donor = manager.clone();
        let mut branch = donor.fork(1, "a", Dimension::Market).unwrap().clone();
        branch.fork_index = 99;

        let err = manager.apply_push(None, Some(vec![branch]), None).unwrap_err();
        assert!(matches!(err, OracleError::MalformedPush(_)));
        assert!(manager.branches().is_empty());
    }

    #[test]
    fn test_apply_push_rejects_main_shorter_than_existing_fork() {
        let mut manager = manager_with_history(3);
        manager.fork(2, "a", Dimension::Market).unwrap();
        let before = manager.clone();
        let shorter = manager_with_history(1).main().clone();

        let err = manager.apply_push(Some(shorter), None, None).unwrap_err();
        assert!(matches!(err, OracleError::MalformedPush(_)));
        assert_eq!(manager, before);
    }

    #[test]
    fn test_serialized_field_names() {
        let manager = manager_with_history(1);
        let json = serde_json::to_value(&manager).unwrap();
        assert!(json["explorationHistory"].is_array());
        assert!(json["branches"].is_array());
        assert_eq!(json["activeBranchId"], "main");
    }
}
