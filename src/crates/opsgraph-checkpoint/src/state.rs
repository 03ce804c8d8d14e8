//! Execution state tracking for a running plan
//!
//! [`ExecutionState`] is the single source of truth for "where are we in this execution".
//! Every counter and timestamp it exposes is maintained by [`ExecutionState::update_operation_state`]
//! — the *only* place operation status moves — so counters and per-operation state can never diverge
//! from each other.
//!
//! # Example
//!
//! ```rust
//! use opsgraph_checkpoint::state::{ExecutionState, OperationStatus};
//!
//! let mut state = ExecutionState::new("exec-1", "plan-1", "project-1", 3);
//! state.register_operation("op-a");
//! state.register_operation("op-b");
//! state.register_operation("op-c");
//!
//! state.update_operation_state("op-a", OperationStatus::Running, None);
//! state.update_operation_state("op-a", OperationStatus::Completed, None);
//! assert_eq!(state.completed_ops, 1);
//! assert_eq!(state.get_progress(), 100.0 / 3.0);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Overall status of an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
    Paused,
}

impl ExecutionStatus {
    /// Terminal statuses finalize `completed_at` when set via [`ExecutionState::set_status`].
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionStatus::Completed | ExecutionStatus::Failed | ExecutionStatus::Cancelled
        )
    }
}

/// Status of a single operation within an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
    Retrying,
}

impl OperationStatus {
    fn is_terminal(self) -> bool {
        matches!(
            self,
            OperationStatus::Completed | OperationStatus::Failed | OperationStatus::Skipped
        )
    }
}

/// Per-operation execution record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationState {
    pub operation_id: String,
    pub status: OperationStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    pub error: Option<String>,
    pub retry_count: u32,
}

impl OperationState {
    fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            status: OperationStatus::Pending,
            started_at: None,
            completed_at: None,
            duration_ms: None,
            error: None,
            retry_count: 0,
        }
    }
}

/// Complete state of one plan execution, durable to JSON.
///
/// `current_stage`/`total_stages` track the scheduler's stage progress; `operations` tracks every
/// operation the plan contains, keyed by operation ID. `errors` accumulates every error message seen
/// across the execution (not just the last one); `last_error` always mirrors the most recent entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionState {
    pub execution_id: String,
    pub plan_id: String,
    pub project_id: String,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: ExecutionStatus,
    pub current_stage: usize,
    pub total_stages: usize,
    pub operations: HashMap<String, OperationState>,
    pub total_ops: usize,
    pub completed_ops: usize,
    pub failed_ops: usize,
    pub skipped_ops: usize,
    pub errors: Vec<String>,
    pub last_error: Option<String>,
    pub last_checkpoint: Option<String>,
}

impl ExecutionState {
    /// Create a new, empty execution state in `Pending` status.
    pub fn new(
        execution_id: impl Into<String>,
        plan_id: impl Into<String>,
        project_id: impl Into<String>,
        total_stages: usize,
    ) -> Self {
        let now = Utc::now();
        Self {
            execution_id: execution_id.into(),
            plan_id: plan_id.into(),
            project_id: project_id.into(),
            started_at: now,
            updated_at: now,
            completed_at: None,
            status: ExecutionStatus::Pending,
            current_stage: 0,
            total_stages,
            operations: HashMap::new(),
            total_ops: 0,
            completed_ops: 0,
            failed_ops: 0,
            skipped_ops: 0,
            errors: Vec::new(),
            last_error: None,
            last_checkpoint: None,
        }
    }

    /// Register an operation as `Pending`. Idempotent: registering the same ID twice is a no-op on
    /// the second call, since the counters are only derived once.
    pub fn register_operation(&mut self, operation_id: impl Into<String>) {
        let id = operation_id.into();
        if self.operations.contains_key(&id) {
            return;
        }
        self.operations.insert(id.clone(), OperationState::new(id));
        self.total_ops = self.operations.len();
    }

    /// The only place operation status moves, and therefore the only place the execution-level
    /// counters (`completed_ops`/`failed_ops`/`skipped_ops`) are adjusted. Each call changes at most
    /// one of those counters: the one corresponding to `status`'s terminal category, and only on the
    /// transition *into* that terminal status (repeating the same terminal status is a no-op on the
    /// counters, but still updates timestamps/error).
    pub fn update_operation_state(
        &mut self,
        operation_id: &str,
        status: OperationStatus,
        error: Option<String>,
    ) {
        self.register_operation(operation_id);
        let now = Utc::now();
        let was_terminal = self
            .operations
            .get(operation_id)
            .map(|op| op.status.is_terminal())
            .unwrap_or(false);
        let previous_status = self.operations.get(operation_id).map(|op| op.status);

        let op = self
            .operations
            .get_mut(operation_id)
            .expect("registered above");

        match status {
            OperationStatus::Running => {
                if op.started_at.is_none() {
                    op.started_at = Some(now);
                }
            }
            OperationStatus::Completed | OperationStatus::Failed | OperationStatus::Skipped => {
                op.completed_at = Some(now);
                if let Some(started) = op.started_at {
                    op.duration_ms = Some((now - started).num_milliseconds());
                }
            }
            OperationStatus::Retrying => {
                op.retry_count += 1;
            }
            OperationStatus::Pending => {}
        }

        if let Some(ref e) = error {
            op.error = Some(e.clone());
            self.errors.push(e.clone());
            self.last_error = Some(e.clone());
        }

        op.status = status;

        if !was_terminal && status.is_terminal() {
            match status {
                OperationStatus::Completed => self.completed_ops += 1,
                OperationStatus::Failed => self.failed_ops += 1,
                OperationStatus::Skipped => self.skipped_ops += 1,
                _ => unreachable!(),
            }
        } else if was_terminal && status.is_terminal() && previous_status != Some(status) {
            // Moving between terminal statuses (e.g. a retried Failed op later marked Completed
            // by the caller) adjusts exactly the two affected counters.
            match previous_status {
                Some(OperationStatus::Completed) => self.completed_ops = self.completed_ops.saturating_sub(1),
                Some(OperationStatus::Failed) => self.failed_ops = self.failed_ops.saturating_sub(1),
                Some(OperationStatus::Skipped) => self.skipped_ops = self.skipped_ops.saturating_sub(1),
                _ => {}
            }
            match status {
                OperationStatus::Completed => self.completed_ops += 1,
                OperationStatus::Failed => self.failed_ops += 1,
                OperationStatus::Skipped => self.skipped_ops += 1,
                _ => unreachable!(),
            }
        }

        self.updated_at = now;
    }

    /// Advance the scheduler stage pointer.
    pub fn set_stage(&mut self, stage: usize) {
        self.current_stage = stage;
        self.updated_at = Utc::now();
    }

    /// Set the execution-level status. Finalizes `completed_at` the first time a terminal status is
    /// set.
    pub fn set_status(&mut self, status: ExecutionStatus) {
        self.status = status;
        self.updated_at = Utc::now();
        if status.is_terminal() && self.completed_at.is_none() {
            self.completed_at = Some(self.updated_at);
        }
    }

    /// Percentage of operations that have completed (0.0–100.0).
    pub fn get_progress(&self) -> f64 {
        if self.total_ops == 0 {
            return 0.0;
        }
        100.0 * self.completed_ops as f64 / self.total_ops as f64
    }

    /// True when this execution stopped partway through and could be resumed: it ended
    /// `Failed`/`Cancelled` with at least one completed operation and at least one operation still
    /// outstanding.
    pub fn can_resume(&self) -> bool {
        matches!(self.status, ExecutionStatus::Failed | ExecutionStatus::Cancelled)
            && self.completed_ops > 0
            && self.completed_ops < self.total_ops
    }

    /// IDs of operations still `Pending`.
    pub fn get_pending_operations(&self) -> Vec<String> {
        self.operations
            .values()
            .filter(|op| op.status == OperationStatus::Pending)
            .map(|op| op.operation_id.clone())
            .collect()
    }

    /// IDs of operations that finished `Completed`.
    pub fn get_completed_operations(&self) -> Vec<String> {
        self.operations
            .values()
            .filter(|op| op.status == OperationStatus::Completed)
            .map(|op| op.operation_id.clone())
            .collect()
    }

    /// Deep copy, used before handing a snapshot off for checkpoint I/O so writes never block
    /// concurrent state updates.
    pub fn deep_clone(&self) -> Self {
        self.clone()
    }

    /// One-line human summary, e.g. `"exec-1: Running, 5/25 ops (20.0%), stage 2/6"`.
    pub fn summary(&self) -> String {
        format!(
            "{}: {:?}, {}/{} ops ({:.1}%), stage {}/{}",
            self.execution_id,
            self.status,
            self.completed_ops,
            self.total_ops,
            self.get_progress(),
            self.current_stage,
            self.total_stages
        )
    }
}
