//! Edge types, weights, and condition expressions

use crate::error::{PlanError, Result};
use serde::{Deserialize, Serialize};

/// The kind of dependency an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Hard,
    Soft,
    Conditional,
    MutualExclusion,
    Ordering,
    Resource,
}

impl Default for EdgeType {
    fn default() -> Self {
        EdgeType::Hard
    }
}

/// A comparison operator for a [`Condition`] leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Contains,
}

/// A condition expression attached to a [`EdgeType::Conditional`] edge: either a leaf comparing a
/// property path against a literal value, or a boolean combination of sub-expressions.
///
/// Condition expressions may in principle carry a caller-supplied runtime evaluator; this crate
/// models conditions as plain data and evaluates them structurally, so [`crate::graph::Graph::clone`]
/// can deep-copy them without the reference-sharing caveat the engine's rule closures are subject to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Condition {
    Leaf {
        property_path: String,
        operator: ConditionOperator,
        value: serde_json::Value,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

/// A directed dependency: `(from, to)` means *from* depends on *to* — *from* runs only after *to*
/// completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub edge_type: EdgeType,
    pub weight: f64,
    pub reason: String,
    pub condition: Option<Condition>,
    pub is_critical: bool,
}

impl Edge {
    /// Build an edge. Fails with [`PlanError::InvalidInput`] if `from == to` or either endpoint is
    /// empty. Weight defaults to `1.0`, type to [`EdgeType::Hard`] — callers that omit them via
    /// [`Edge::new`] get these defaults automatically.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Result<Self> {
        let from = from.into();
        let to = to.into();
        if from.is_empty() || to.is_empty() {
            return Err(PlanError::invalid_input("edge endpoints must not be empty"));
        }
        if from == to {
            return Err(PlanError::invalid_input(format!(
                "self-loop edges are rejected: '{from}' -> '{to}'"
            )));
        }
        Ok(Self {
            from,
            to,
            edge_type: EdgeType::default(),
            weight: 1.0,
            reason: String::new(),
            condition: None,
            is_critical: false,
        })
    }

    pub fn with_type(mut self, edge_type: EdgeType) -> Self {
        self.edge_type = edge_type;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Two edges are the "same" for duplicate-prevention purposes when they share `(from, to)`,
    /// regardless of type, weight, or reason.
    pub fn same_endpoints(&self, other: &Edge) -> bool {
        self.from == other.from && self.to == other.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_self_loop() {
        assert!(Edge::new("a", "a").is_err());
    }

    #[test]
    fn rejects_empty_endpoints() {
        assert!(Edge::new("", "b").is_err());
        assert!(Edge::new("a", "").is_err());
    }

    #[test]
    fn defaults_weight_and_type() {
        let edge = Edge::new("a", "b").unwrap();
        assert_eq!(edge.weight, 1.0);
        assert_eq!(edge.edge_type, EdgeType::Hard);
    }
}
