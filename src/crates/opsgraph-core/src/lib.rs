//! # opsgraph-core — dependency-aware execution planning engine
//!
//! This crate turns a collection of planned infrastructure operations into a validated directed
//! acyclic graph (DAG), derives an optimized parallel execution schedule from it, and exposes the
//! graph algorithms, rule-driven edge construction, analysis, optimization, and partitioning that
//! sit around that graph. Persistence of *execution* state and checkpoints lives in the sibling
//! [`opsgraph_checkpoint`] crate; this crate's [`error::PlanError`] wraps that crate's error type so
//! callers see one error hierarchy.
//!
//! ## Control flow
//!
//! 1. A caller registers [`rules::registry::Rule`] implementations (or the [`rules::builtin`]
//!    families) in a [`rules::registry::Registry`].
//! 2. [`rules::evaluator::evaluate`] applies those rules, in descending-priority order, to every
//!    ordered pair of planned [`operation::Operation`]s, producing a cycle-free [`graph::Graph`].
//! 3. [`analyzer::analyze`] annotates the graph: levels, critical path, bottlenecks, risk scores,
//!    optimization suggestions.
//! 4. [`scheduler::schedule`] turns the validated graph into ordered stages of parallel-eligible
//!    operations under one of six strategies.
//! 5. [`optimizer::optimize`] and [`partitioner::partition`] offer graph-level rewrites: aligning
//!    the DAG to a speed/cost/reliability/balance goal, or splitting it for distributed fan-out.
//! 6. The caller drives the resulting stages, reporting status through
//!    [`opsgraph_checkpoint::state::ExecutionState`], and persists progress through
//!    [`opsgraph_checkpoint::manager::CheckpointManager`].
//!
//! ## Concurrency
//!
//! [`graph::Graph`] is the only mutable structure this crate shares across threads, and it holds a
//! single read-write lock over its entire state (see [`graph`] module docs). Every public method
//! here takes that lock at most once; internal helpers operate on a lock-free `&GraphInner` and are
//! never called while a second public method on the same `Graph` is already holding the lock.
//!
//! ## Example
//!
//! ```rust
//! use opsgraph_core::graph::Graph;
//! use opsgraph_core::node::Node;
//! use opsgraph_core::edge::Edge;
//! use opsgraph_core::scheduler::{self, ScheduleConfig, SchedulerStrategy};
//!
//! let graph = Graph::new("example-plan");
//! graph.add_node(Node::new("vpc", "Create VPC", "vpc").unwrap()).unwrap();
//! graph.add_node(Node::new("subnet", "Create subnet", "subnet").unwrap()).unwrap();
//! graph.add_edge(Edge::new("subnet", "vpc").unwrap()).unwrap();
//!
//! let config = ScheduleConfig::default().with_strategy(SchedulerStrategy::Greedy);
//! let schedule = scheduler::schedule(&graph, &config).unwrap();
//! assert_eq!(schedule.stages.len(), 2);
//! ```

pub mod algorithms;
pub mod analyzer;
pub mod cancellation;
pub mod edge;
pub mod error;
pub mod graph;
pub mod node;
pub mod operation;
pub mod optimizer;
pub mod partitioner;
pub mod rules;
pub mod scheduler;

pub use cancellation::CancellationToken;
pub use edge::{Condition, ConditionOperator, Edge, EdgeType};
pub use error::{PlanError, Result};
pub use graph::{Graph, GraphMetadata};
pub use node::{Node, ResourceRequirements, RiskLevel};
pub use operation::Operation;
