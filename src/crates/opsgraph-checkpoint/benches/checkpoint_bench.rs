use criterion::{black_box, criterion_group, criterion_main, Criterion};
use opsgraph_checkpoint::manager::CheckpointManager;
use opsgraph_checkpoint::state::{ExecutionState, OperationStatus};
use serde_json::json;
use tempfile::TempDir;

fn state_with_ops(n: usize) -> ExecutionState {
    let mut state = ExecutionState::new("bench-exec", "bench-plan", "bench-proj", 10);
    for i in 0..n {
        state.register_operation(format!("op-{i}"));
    }
    state
}

fn checkpoint_create_benchmark(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let manager = CheckpointManager::new(dir.path().join("state"), dir.path().join("checkpoints"), 10);
    let state = state_with_ops(200);

    c.bench_function("checkpoint create (200 ops, uncompressed)", |b| {
        b.iter(|| {
            manager
                .create_checkpoint(black_box(&state), json!({"nodes": []}), 0, None, None)
                .unwrap()
        });
    });
}

fn checkpoint_create_compressed_benchmark(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let manager = CheckpointManager::new(dir.path().join("state"), dir.path().join("checkpoints"), 10)
        .with_compression(true);
    let state = state_with_ops(200);

    c.bench_function("checkpoint create (200 ops, gzip)", |b| {
        b.iter(|| {
            manager
                .create_checkpoint(black_box(&state), json!({"nodes": []}), 0, None, None)
                .unwrap()
        });
    });
}

fn checkpoint_restore_benchmark(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let manager = CheckpointManager::new(dir.path().join("state"), dir.path().join("checkpoints"), 10);
    let state = state_with_ops(200);
    manager
        .create_checkpoint(&state, json!({"nodes": []}), 0, None, None)
        .unwrap();

    c.bench_function("checkpoint restore", |b| {
        b.iter(|| manager.restore_from_checkpoint(black_box("bench-exec")).unwrap());
    });
}

fn update_operation_state_benchmark(c: &mut Criterion) {
    c.bench_function("update_operation_state (1000 ops)", |b| {
        b.iter(|| {
            let mut state = state_with_ops(1000);
            for i in 0..1000 {
                state.update_operation_state(
                    black_box(&format!("op-{i}")),
                    OperationStatus::Completed,
                    None,
                );
            }
            state
        });
    });
}

criterion_group!(
    benches,
    checkpoint_create_benchmark,
    checkpoint_create_compressed_benchmark,
    checkpoint_restore_benchmark,
    update_operation_state_benchmark
);
criterion_main!(benches);
