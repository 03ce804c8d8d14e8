//! # opsgraph-checkpoint - execution state tracking and checkpoint/resume
//!
//! This crate tracks the progress of one plan execution ([`state::ExecutionState`]) and persists
//! point-in-time snapshots of it to a directory ([`manager::CheckpointManager`]) so a failed or
//! cancelled execution can be resumed.
//!
//! ## Why this crate doesn't depend on the graph
//!
//! A [`checkpoint::Checkpoint`] carries a `graph_snapshot: serde_json::Value` rather than a typed
//! graph. The crate that owns the graph type depends on this crate (to wrap state/checkpoint errors
//! and drive the manager), so this crate cannot depend back on it — the snapshot stays opaque JSON,
//! produced by the caller's own export and handed in whole.
//!
//! ## Modules
//!
//! - [`state`] — [`state::ExecutionState`], [`state::OperationState`], and the statuses that drive
//!   them. [`state::ExecutionState::update_operation_state`] is the sole mutator of every counter and
//!   timestamp the state exposes.
//! - [`checkpoint`] — the [`checkpoint::Checkpoint`] snapshot type.
//! - [`manager`] — [`manager::CheckpointManager`], the directory-backed reader/writer for both state
//!   files and checkpoint files, including gzip compression and retention pruning.
//! - [`error`] — [`error::CheckpointError`] and the crate's [`error::Result`] alias.
//!
//! ## Example
//!
//! ```rust,no_run
//! use opsgraph_checkpoint::manager::CheckpointManager;
//! use opsgraph_checkpoint::state::{ExecutionState, OperationStatus};
//! use serde_json::json;
//!
//! let manager = CheckpointManager::with_defaults();
//! let mut state = ExecutionState::new("exec-1", "plan-1", "proj-1", 2);
//! state.register_operation("create-vpc");
//! state.update_operation_state("create-vpc", OperationStatus::Completed, None);
//! manager.save_state(&state)?;
//! # Ok::<(), opsgraph_checkpoint::error::CheckpointError>(())
//! ```

pub mod checkpoint;
pub mod error;
pub mod manager;
pub mod state;

pub use checkpoint::Checkpoint;
pub use error::{CheckpointError, Result};
pub use manager::{CheckpointConfig, CheckpointManager};
pub use state::{ExecutionState, ExecutionStatus, OperationState, OperationStatus};
