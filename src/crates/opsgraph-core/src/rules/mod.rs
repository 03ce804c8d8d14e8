//! The rule-driven edge construction pipeline: a priority-ordered registry of caller-supplied rules
//! plus an evaluator that turns a set of operations into a cycle-free graph.

pub mod builtin;
pub mod evaluator;
pub mod registry;

pub use evaluator::{evaluate, evaluate_with_config, EvaluatorConfig};
pub use registry::{Registry, Rule};
