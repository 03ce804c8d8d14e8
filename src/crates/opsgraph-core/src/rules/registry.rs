//! The `Rule` contract and the registry that holds an ordered catalog of rules.

use crate::cancellation::CancellationToken;
use crate::edge::Edge;
use crate::error::{PlanError, Result};
use crate::operation::Operation;
use std::collections::HashMap;

/// A rule evaluates an ordered pair of operations and optionally emits a dependency edge between
/// them. Callers implement rules as arbitrary closures wrapped in the built-in families (see
/// [`crate::rules::builtin`]) or their own `Rule` impls.
pub trait Rule: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// Higher runs first.
    fn priority(&self) -> i64;
    /// Returns `Some(edge)` to propose a dependency from `from` to `to`, `None` to abstain, or an
    /// error to abort the whole evaluation pass.
    fn evaluate(&self, from: &Operation, to: &Operation, cancel: &CancellationToken) -> Result<Option<Edge>>;
}

/// Maps unique rule name to rule, with priority-ordered listing.
#[derive(Default)]
pub struct Registry {
    rules: HashMap<String, Box<dyn Rule>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails on empty name or a name already in use.
    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<()> {
        let name = rule.name().to_string();
        if name.is_empty() {
            return Err(PlanError::invalid_input("rule name must not be empty"));
        }
        if self.rules.contains_key(&name) {
            return Err(PlanError::duplicate(format!("rule '{name}' already registered")));
        }
        self.rules.insert(name, rule);
        Ok(())
    }

    /// All registered rules, sorted by descending priority (ties broken by name for determinism).
    pub fn list_rules(&self) -> Vec<&dyn Rule> {
        let mut rules: Vec<&dyn Rule> = self.rules.values().map(|r| r.as_ref()).collect();
        rules.sort_by(|a, b| b.priority().cmp(&a.priority()).then_with(|| a.name().cmp(b.name())));
        rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubRule {
        name: String,
        priority: i64,
    }

    impl Rule for StubRule {
        fn name(&self) -> &str {
            &self.name
        }
        fn description(&self) -> &str {
            "stub"
        }
        fn priority(&self) -> i64 {
            self.priority
        }
        fn evaluate(&self, _from: &Operation, _to: &Operation, _cancel: &CancellationToken) -> Result<Option<Edge>> {
            Ok(None)
        }
    }

    #[test]
    fn register_rejects_empty_name() {
        let mut registry = Registry::new();
        let err = registry.register(Box::new(StubRule { name: "".into(), priority: 0 }));
        assert!(err.is_err());
    }

    #[test]
    fn register_rejects_duplicate_name() {
        let mut registry = Registry::new();
        registry.register(Box::new(StubRule { name: "r1".into(), priority: 0 })).unwrap();
        let err = registry.register(Box::new(StubRule { name: "r1".into(), priority: 5 }));
        assert!(err.is_err());
    }

    #[test]
    fn list_rules_sorted_descending_priority() {
        let mut registry = Registry::new();
        registry.register(Box::new(StubRule { name: "low".into(), priority: 1 })).unwrap();
        registry.register(Box::new(StubRule { name: "high".into(), priority: 10 })).unwrap();
        registry.register(Box::new(StubRule { name: "mid".into(), priority: 5 })).unwrap();

        let names: Vec<&str> = registry.list_rules().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
    }
}
