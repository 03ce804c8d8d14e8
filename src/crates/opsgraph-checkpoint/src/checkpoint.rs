//! Checkpoint data structures for execution snapshot and restore
//!
//! A [`Checkpoint`] is a point-in-time snapshot of one execution: the full [`ExecutionState`] plus
//! an opaque graph snapshot (serialized by the caller, never interpreted here — see
//! [`crate::manager::CheckpointManager`] for why this crate never depends on the graph type). It is
//! what [`crate::manager::CheckpointManager::create_checkpoint`] writes to disk and what
//! [`crate::manager::CheckpointManager::restore_from_checkpoint`] reads back.
//!
//! # Example
//!
//! ```rust
//! use opsgraph_checkpoint::checkpoint::Checkpoint;
//! use opsgraph_checkpoint::state::ExecutionState;
//! use serde_json::json;
//!
//! let state = ExecutionState::new("exec-1", "plan-1", "proj-1", 4);
//! let checkpoint = Checkpoint::new("exec-1", "plan-1", state, json!({"nodes": []}), 2)
//!     .with_reason("stage boundary");
//! assert_eq!(checkpoint.stage, 2);
//! ```

use crate::state::ExecutionState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single checkpoint: an execution state snapshot paired with an opaque graph snapshot.
///
/// `graph_snapshot` is whatever JSON value the caller produced from the graph's own `ToJSON` export
/// (already redacted by that layer); this crate treats it as inert data, never a typed graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub checkpoint_id: String,
    pub execution_id: String,
    pub plan_id: String,
    pub created_at: DateTime<Utc>,
    pub state: ExecutionState,
    pub graph_snapshot: Value,
    pub stage: usize,
    pub operation_id: Option<String>,
    pub reason: Option<String>,
    /// Size in bytes of the serialized (and, if applicable, compressed) file on disk. Zero until the
    /// manager fills it in after writing.
    pub file_size: u64,
    pub compressed: bool,
}

impl Checkpoint {
    /// Build a checkpoint. `checkpoint_id` is generated from `execution_id`, `stage`, and the current
    /// unix timestamp by [`crate::manager::CheckpointManager`] — construct directly only in tests.
    pub fn new(
        execution_id: impl Into<String>,
        plan_id: impl Into<String>,
        state: ExecutionState,
        graph_snapshot: Value,
        stage: usize,
    ) -> Self {
        let execution_id = execution_id.into();
        let plan_id = plan_id.into();
        Self {
            checkpoint_id: format!("cp-{}-{}-{}", execution_id, stage, Utc::now().timestamp()),
            execution_id,
            plan_id,
            created_at: Utc::now(),
            state,
            graph_snapshot,
            stage,
            operation_id: None,
            reason: None,
            file_size: 0,
            compressed: false,
        }
    }

    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_file_size(mut self, file_size: u64) -> Self {
        self.file_size = file_size;
        self
    }

    pub fn with_compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    /// Rejects checkpoints with empty IDs or zero registered operations.
    ///
    /// Grounded in the manager's `validate_checkpoint` contract: nil state is impossible once a
    /// `Checkpoint` is constructed in Rust (the field is non-optional), so this only has to guard the
    /// remaining two conditions.
    pub fn is_valid(&self) -> bool {
        !self.checkpoint_id.is_empty()
            && !self.execution_id.is_empty()
            && !self.plan_id.is_empty()
            && self.state.total_ops > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_state() -> ExecutionState {
        let mut state = ExecutionState::new("exec-1", "plan-1", "proj-1", 3);
        state.register_operation("op-a");
        state
    }

    #[test]
    fn builder_sets_optional_fields() {
        let checkpoint = Checkpoint::new("exec-1", "plan-1", sample_state(), json!({}), 1)
            .with_operation_id("op-a")
            .with_reason("high risk op")
            .with_compressed(true)
            .with_file_size(128);
        assert_eq!(checkpoint.operation_id.as_deref(), Some("op-a"));
        assert_eq!(checkpoint.reason.as_deref(), Some("high risk op"));
        assert!(checkpoint.compressed);
        assert_eq!(checkpoint.file_size, 128);
    }

    #[test]
    fn valid_checkpoint_requires_registered_operations() {
        let mut empty_state = ExecutionState::new("exec-2", "plan-1", "proj-1", 1);
        let checkpoint = Checkpoint::new("exec-2", "plan-1", empty_state.clone(), json!({}), 0);
        assert!(!checkpoint.is_valid());

        empty_state.register_operation("op-a");
        let checkpoint = Checkpoint::new("exec-2", "plan-1", empty_state, json!({}), 0);
        assert!(checkpoint.is_valid());
    }

    #[test]
    fn valid_checkpoint_requires_nonempty_ids() {
        let mut checkpoint = Checkpoint::new("exec-1", "plan-1", sample_state(), json!({}), 1);
        checkpoint.execution_id.clear();
        assert!(!checkpoint.is_valid());
    }
}
