use opsgraph_checkpoint::manager::CheckpointManager;
use opsgraph_checkpoint::state::{ExecutionState, OperationStatus};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn plan_of_25_ops() -> ExecutionState {
    let mut state = ExecutionState::new("exec-s6", "plan-s6", "proj-s6", 6);
    for i in 0..25 {
        state.register_operation(format!("op-{i}"));
    }
    state
}

#[test]
fn checkpoint_round_trip_uncompressed() {
    let dir = TempDir::new().unwrap();
    let manager = CheckpointManager::new(dir.path().join("state"), dir.path().join("checkpoints"), 10);

    let mut state = plan_of_25_ops();
    for i in 0..5 {
        state.update_operation_state(&format!("op-{i}"), OperationStatus::Completed, None);
    }
    state.set_stage(3);
    let graph_snapshot = json!({"node_count": 25, "edge_count": 30});

    let checkpoint = manager
        .create_checkpoint(
            &state,
            graph_snapshot.clone(),
            3,
            Some("op-5".to_string()),
            Some("high-risk operation pending".to_string()),
        )
        .unwrap();
    assert_eq!(checkpoint.stage, 3);

    let (restored, snapshot) = manager.restore_from_checkpoint("exec-s6").unwrap();
    assert_eq!(restored.completed_ops, 5);
    assert_eq!(restored.status, opsgraph_checkpoint::ExecutionStatus::Running);
    assert_eq!(snapshot["node_count"], 25);
    assert_eq!(snapshot["edge_count"], 30);
}

#[test]
fn checkpoint_round_trip_compressed_detects_gzip_magic() {
    let dir = TempDir::new().unwrap();
    let manager = CheckpointManager::new(dir.path().join("state"), dir.path().join("checkpoints"), 10)
        .with_compression(true);

    let mut state = plan_of_25_ops();
    for i in 0..5 {
        state.update_operation_state(&format!("op-{i}"), OperationStatus::Completed, None);
    }
    state.set_stage(3);
    let graph_snapshot = json!({"node_count": 25, "edge_count": 30});

    manager
        .create_checkpoint(&state, graph_snapshot.clone(), 3, None, None)
        .unwrap();

    let checkpoint_dir = dir.path().join("checkpoints");
    let entry = fs::read_dir(&checkpoint_dir)
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    let bytes = fs::read(entry.path()).unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);

    let (restored, snapshot) = manager.restore_from_checkpoint("exec-s6").unwrap();
    assert_eq!(restored.completed_ops, 5);
    assert_eq!(restored.status, opsgraph_checkpoint::ExecutionStatus::Running);
    assert_eq!(snapshot, graph_snapshot);
}
