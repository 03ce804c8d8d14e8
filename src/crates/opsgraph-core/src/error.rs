//! Error types for the execution planning engine
//!
//! [`PlanError`] is the single error type returned by every fallible operation in this crate: graph
//! mutation, algorithms, rule evaluation, scheduling, optimization, and partitioning. Each variant
//! corresponds to one of the engine's documented failure categories; callers match on the variant,
//! not on message text, to decide how to react (retry after mutating the graph, abort planning,
//! surface to the operator, and so on).
//!
//! # Error hierarchy
//!
//! ```text
//! PlanError
//! ├── InvalidInput   — bad ID, negative duration, missing endpoint, unknown strategy/format
//! ├── NotFound        — node, edge, rule, or checkpoint absent when required
//! ├── Duplicate        — node or rule registered under a name already in use
//! ├── Cycle             — an operation required an acyclic graph but found one; carries the cycle path
//! ├── InconsistentGraph  — Validate() found forward/reverse asymmetry or a dangling endpoint
//! ├── RuleError           — a rule closure returned an error; evaluation aborts
//! ├── Checkpoint           — wraps opsgraph_checkpoint::CheckpointError
//! └── Cancelled             — the caller's cancellation token tripped
//! ```
//!
//! # Examples
//!
//! ```rust
//! use opsgraph_core::error::PlanError;
//!
//! let err = PlanError::cycle(vec!["a".into(), "b".into(), "a".into()]);
//! match err {
//!     PlanError::Cycle { ref path } => assert_eq!(path.len(), 3),
//!     _ => unreachable!(),
//! }
//! ```
//!
//! # Error Recovery Strategies
//!
//! - [`PlanError::Cycle`] is fatal to the operation that triggered it (an edge insertion, a
//!   topological sort) but never poisons the graph itself — the caller may remove the offending edge
//!   and retry.
//! - [`PlanError::RuleError`] aborts the whole evaluation pass; a rule silently dropping an edge
//!   because it would create a cycle is *not* this variant (see [`crate::rules::evaluator`]).
//! - [`PlanError::Checkpoint`] pruning failures never reach the caller as an error — they are logged
//!   by [`opsgraph_checkpoint::manager::CheckpointManager`] and the triggering checkpoint still
//!   succeeds.

use thiserror::Error;

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, PlanError>;

/// Every error this crate's public operations can return.
///
/// Message text is for humans; it never embeds a label's redacted value (see
/// [`crate::graph::Graph::to_json`]) — only IDs, names, and structural facts.
#[derive(Error, Debug)]
pub enum PlanError {
    /// A bad node/edge ID, a negative duration, a missing edge endpoint, or an unrecognized
    /// strategy/format name.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A node, edge, rule, or checkpoint was referenced but does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A node or rule was registered under a name already in use.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// The graph contains a cycle where an acyclic graph was required.
    #[error("cycle detected: {}", path.join(" -> "))]
    Cycle {
        /// Each node on the cycle once, starting and ending at the re-entry node.
        path: Vec<String>,
    },

    /// `validate()` found forward/reverse adjacency asymmetry or a dangling edge endpoint.
    #[error("inconsistent graph: {0}")]
    InconsistentGraph(String),

    /// A rule closure returned an error during evaluation; evaluation aborts.
    #[error("rule '{rule}' failed: {message}")]
    RuleError { rule: String, message: String },

    /// State or checkpoint persistence failed.
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] opsgraph_checkpoint::CheckpointError),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The caller's cancellation token tripped before the operation completed.
    #[error("operation cancelled: {0}")]
    Cancelled(String),
}

impl PlanError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        PlanError::InvalidInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        PlanError::NotFound(message.into())
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        PlanError::Duplicate(message.into())
    }

    pub fn cycle(path: Vec<String>) -> Self {
        PlanError::Cycle { path }
    }

    pub fn inconsistent_graph(message: impl Into<String>) -> Self {
        PlanError::InconsistentGraph(message.into())
    }

    pub fn rule_error(rule: impl Into<String>, message: impl Into<String>) -> Self {
        PlanError::RuleError {
            rule: rule.into(),
            message: message.into(),
        }
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        PlanError::Cancelled(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_joins_path() {
        let err = PlanError::cycle(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(err.to_string(), "cycle detected: a -> b -> a");
    }

    #[test]
    fn helper_constructors_match_variants() {
        assert!(matches!(PlanError::invalid_input("x"), PlanError::InvalidInput(_)));
        assert!(matches!(PlanError::not_found("x"), PlanError::NotFound(_)));
        assert!(matches!(PlanError::duplicate("x"), PlanError::Duplicate(_)));
        assert!(matches!(
            PlanError::rule_error("r", "boom"),
            PlanError::RuleError { .. }
        ));
        assert!(matches!(PlanError::cancelled("x"), PlanError::Cancelled(_)));
    }
}
