//! Built-in rule families: the catalog a caller composes instead of hand-rolling every `Rule` impl.

use crate::cancellation::CancellationToken;
use crate::edge::{Edge, EdgeType};
use crate::error::Result;
use crate::operation::Operation;
use crate::rules::registry::Rule;

type PairPredicate = Box<dyn Fn(&Operation, &Operation) -> bool + Send + Sync>;
type PairClosure = Box<dyn Fn(&Operation, &Operation, &CancellationToken) -> Result<Option<Edge>> + Send + Sync>;
type MutualExclusionDetector = Box<dyn Fn(&Operation, &Operation) -> bool + Send + Sync>;

/// Fires when `from.resource_kind == from_kind && to.resource_kind == to_kind && predicate(from, to)`;
/// emits a fixed-type edge from `from` to `to`.
pub struct ResourceKindRule {
    name: String,
    description: String,
    priority: i64,
    from_kind: String,
    to_kind: String,
    predicate: PairPredicate,
    edge_type: EdgeType,
}

impl ResourceKindRule {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        priority: i64,
        from_kind: impl Into<String>,
        to_kind: impl Into<String>,
        predicate: impl Fn(&Operation, &Operation) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            priority,
            from_kind: from_kind.into(),
            to_kind: to_kind.into(),
            predicate: Box::new(predicate),
            edge_type: EdgeType::Hard,
        }
    }

    pub fn with_edge_type(mut self, edge_type: EdgeType) -> Self {
        self.edge_type = edge_type;
        self
    }
}

impl Rule for ResourceKindRule {
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn priority(&self) -> i64 {
        self.priority
    }
    fn evaluate(&self, from: &Operation, to: &Operation, _cancel: &CancellationToken) -> Result<Option<Edge>> {
        if from.resource_kind == self.from_kind && to.resource_kind == self.to_kind && (self.predicate)(from, to) {
            let edge = Edge::new(&from.id, &to.id)?.with_type(self.edge_type);
            Ok(Some(edge))
        } else {
            Ok(None)
        }
    }
}

/// Wraps an arbitrary closure returning an edge or none.
pub struct PropertyBasedRule {
    name: String,
    description: String,
    priority: i64,
    closure: PairClosure,
}

impl PropertyBasedRule {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        priority: i64,
        closure: impl Fn(&Operation, &Operation, &CancellationToken) -> Result<Option<Edge>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            priority,
            closure: Box::new(closure),
        }
    }
}

impl Rule for PropertyBasedRule {
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn priority(&self) -> i64 {
        self.priority
    }
    fn evaluate(&self, from: &Operation, to: &Operation, cancel: &CancellationToken) -> Result<Option<Edge>> {
        (self.closure)(from, to, cancel)
    }
}

/// Emits a [`EdgeType::MutualExclusion`] edge (weight 10) when `detector` says two operations
/// cannot run in parallel.
pub struct MutualExclusionRule {
    name: String,
    description: String,
    priority: i64,
    detector: MutualExclusionDetector,
}

impl MutualExclusionRule {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        priority: i64,
        detector: impl Fn(&Operation, &Operation) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            priority,
            detector: Box::new(detector),
        }
    }
}

impl Rule for MutualExclusionRule {
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn priority(&self) -> i64 {
        self.priority
    }
    fn evaluate(&self, from: &Operation, to: &Operation, _cancel: &CancellationToken) -> Result<Option<Edge>> {
        if (self.detector)(from, to) {
            let edge = Edge::new(&from.id, &to.id)?
                .with_type(EdgeType::MutualExclusion)
                .with_weight(10.0);
            Ok(Some(edge))
        } else {
            Ok(None)
        }
    }
}

/// Combinator mode for [`CompositeRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeMode {
    /// All sub-rules must emit; the last sub-rule's edge is returned.
    And,
    /// First non-none result wins.
    Or,
}

/// Combines sub-rules under an AND/OR policy.
pub struct CompositeRule {
    name: String,
    description: String,
    priority: i64,
    mode: CompositeMode,
    rules: Vec<Box<dyn Rule>>,
}

impl CompositeRule {
    pub fn new(name: impl Into<String>, description: impl Into<String>, priority: i64, mode: CompositeMode, rules: Vec<Box<dyn Rule>>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            priority,
            mode,
            rules,
        }
    }
}

impl Rule for CompositeRule {
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn priority(&self) -> i64 {
        self.priority
    }
    fn evaluate(&self, from: &Operation, to: &Operation, cancel: &CancellationToken) -> Result<Option<Edge>> {
        match self.mode {
            CompositeMode::Or => {
                for rule in &self.rules {
                    if cancel.is_cancelled() {
                        return Ok(None);
                    }
                    if let Some(edge) = rule.evaluate(from, to, cancel)? {
                        return Ok(Some(edge));
                    }
                }
                Ok(None)
            }
            CompositeMode::And => {
                let mut last = None;
                for rule in &self.rules {
                    if cancel.is_cancelled() {
                        return Ok(None);
                    }
                    match rule.evaluate(from, to, cancel)? {
                        Some(edge) => last = Some(edge),
                        None => return Ok(None),
                    }
                }
                Ok(last)
            }
        }
    }
}

/// Gates any rule behind a runtime predicate.
pub struct ConditionalRule {
    name: String,
    description: String,
    priority: i64,
    gate: PairPredicate,
    inner: Box<dyn Rule>,
}

impl ConditionalRule {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        priority: i64,
        gate: impl Fn(&Operation, &Operation) -> bool + Send + Sync + 'static,
        inner: Box<dyn Rule>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            priority,
            gate: Box::new(gate),
            inner,
        }
    }
}

impl Rule for ConditionalRule {
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn priority(&self) -> i64 {
        self.priority
    }
    fn evaluate(&self, from: &Operation, to: &Operation, cancel: &CancellationToken) -> Result<Option<Edge>> {
        if (self.gate)(from, to) {
            self.inner.evaluate(from, to, cancel)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(id: &str, kind: &str) -> Operation {
        Operation::new(id, id, kind, id)
    }

    #[test]
    fn resource_kind_rule_fires_on_matching_kinds_and_predicate() {
        let rule = ResourceKindRule::new("r1", "subnet depends on vpc", 10, "subnet", "vpc", |_, _| true);
        let edge = rule.evaluate(&op("s1", "subnet"), &op("v1", "vpc"), &CancellationToken::new()).unwrap();
        assert!(edge.is_some());
        assert!(rule
            .evaluate(&op("s1", "subnet"), &op("v1", "subnet"), &CancellationToken::new())
            .unwrap()
            .is_none());
    }

    #[test]
    fn mutual_exclusion_rule_sets_weight_ten() {
        let rule = MutualExclusionRule::new("same-cluster", "same cluster mutex", 5, |a, b| {
            a.resource_name == b.resource_name
        });
        let edge = rule
            .evaluate(&op("a", "cluster"), &op("b", "cluster"), &CancellationToken::new())
            .unwrap();
        assert!(edge.is_none());

        let a = Operation::new("a", "a", "cluster", "shared");
        let b = Operation::new("b", "b", "cluster", "shared");
        let edge = rule.evaluate(&a, &b, &CancellationToken::new()).unwrap().unwrap();
        assert_eq!(edge.edge_type, EdgeType::MutualExclusion);
        assert_eq!(edge.weight, 10.0);
    }

    #[test]
    fn composite_and_requires_all_subrules() {
        let always = ResourceKindRule::new("always", "always", 1, "x", "y", |_, _| true);
        let never = ResourceKindRule::new("never", "never", 1, "nope", "nope", |_, _| true);
        let composite = CompositeRule::new(
            "composite",
            "and",
            1,
            CompositeMode::And,
            vec![Box::new(always), Box::new(never)],
        );
        let result = composite.evaluate(&op("a", "x"), &op("b", "y"), &CancellationToken::new()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn composite_or_takes_first_match() {
        let never = ResourceKindRule::new("never", "never", 1, "nope", "nope", |_, _| true);
        let always = ResourceKindRule::new("always", "always", 1, "x", "y", |_, _| true);
        let composite = CompositeRule::new(
            "composite",
            "or",
            1,
            CompositeMode::Or,
            vec![Box::new(never), Box::new(always)],
        );
        let result = composite.evaluate(&op("a", "x"), &op("b", "y"), &CancellationToken::new()).unwrap();
        assert!(result.is_some());
    }

    #[test]
    fn conditional_rule_respects_gate() {
        let inner = ResourceKindRule::new("inner", "inner", 1, "x", "y", |_, _| true);
        let gated = ConditionalRule::new("gated", "gated", 1, |a, _| a.id == "allowed", Box::new(inner));
        assert!(gated.evaluate(&op("blocked", "x"), &op("b", "y"), &CancellationToken::new()).unwrap().is_none());
        assert!(gated.evaluate(&op("allowed", "x"), &op("b", "y"), &CancellationToken::new()).unwrap().is_some());
    }
}
