//! Applies a rule registry to a set of operations, emitting a cycle-free graph.

use crate::cancellation::CancellationToken;
use crate::error::{PlanError, Result};
use crate::graph::Graph;
use crate::operation::Operation;
use crate::rules::registry::Registry;

/// Configuration for [`evaluate_with_config`]. [`evaluate`] is a convenience wrapper over the
/// defaults here.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Name given to the graph this evaluation produces.
    pub graph_name: String,
    /// When `true` (the default), a rule returning an error aborts evaluation with
    /// [`PlanError::RuleError`]. When `false`, the failing rule/pair is logged and skipped so
    /// evaluation can continue with the remaining rules.
    pub abort_on_rule_error: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            graph_name: "planned-operations".to_string(),
            abort_on_rule_error: true,
        }
    }
}

impl EvaluatorConfig {
    pub fn with_graph_name(mut self, graph_name: impl Into<String>) -> Self {
        self.graph_name = graph_name.into();
        self
    }

    pub fn with_abort_on_rule_error(mut self, abort_on_rule_error: bool) -> Self {
        self.abort_on_rule_error = abort_on_rule_error;
        self
    }
}

/// Runs every registered rule, in descending-priority order, over every ordered pair of distinct
/// operations, producing a validated graph, using [`EvaluatorConfig::default`].
///
/// See [`evaluate_with_config`] for the full algorithm.
pub fn evaluate(registry: &Registry, operations: &[Operation], cancel: &CancellationToken) -> Result<Graph> {
    evaluate_with_config(registry, operations, cancel, &EvaluatorConfig::default())
}

/// Runs every registered rule, in descending-priority order, over every ordered pair of distinct
/// operations, producing a validated graph.
///
/// 1. Instantiate a graph; add one node per operation.
/// 2. Iterate rules in priority order; for each rule, iterate every ordered pair `(from, to)` with
///    `from.id != to.id` and call `rule.evaluate`.
/// 3. On a non-none edge, set its endpoints from the pair; default `reason` to the rule's
///    description if empty.
/// 4. **Cycle guard:** clone the graph, tentatively add the edge, check for a cycle. If cycle-free,
///    commit to the real graph; otherwise drop it silently — this is not an error, and higher
///    priority rules (evaluated first) are protected by virtue of running first.
/// 5. A rule that returns an error aborts evaluation with [`PlanError::RuleError`], unless
///    `config.abort_on_rule_error` is `false`.
///
/// Honors `cancel`: checked between pairs and between rules, returning
/// [`PlanError::Cancelled`] promptly once tripped.
pub fn evaluate_with_config(
    registry: &Registry,
    operations: &[Operation],
    cancel: &CancellationToken,
    config: &EvaluatorConfig,
) -> Result<Graph> {
    let graph = Graph::new(config.graph_name.clone());
    for operation in operations {
        graph.add_node(operation.to_node()?)?;
    }

    let rules = registry.list_rules();
    for rule in rules {
        for from in operations {
            for to in operations {
                if from.id == to.id {
                    continue;
                }
                if cancel.is_cancelled() {
                    return Err(PlanError::cancelled(format!(
                        "rule evaluation cancelled while evaluating rule '{}'",
                        rule.name()
                    )));
                }

                let proposed = match rule.evaluate(from, to, cancel) {
                    Ok(proposed) => proposed,
                    Err(err) if config.abort_on_rule_error => {
                        return Err(PlanError::rule_error(rule.name(), err.to_string()))
                    }
                    Err(err) => {
                        tracing::warn!(rule = rule.name(), error = %err, "rule failed; skipping pair");
                        continue;
                    }
                };

                let Some(mut edge) = proposed else {
                    continue;
                };
                edge.from = from.id.clone();
                edge.to = to.id.clone();
                if edge.reason.is_empty() {
                    edge.reason = rule.description().to_string();
                }

                let candidate = graph.clone_deep();
                if candidate.add_edge(edge.clone()).is_err() {
                    continue;
                }
                let (has_cycle, _) = candidate.has_cycle();
                if has_cycle {
                    tracing::debug!(
                        rule = rule.name(),
                        from = %edge.from,
                        to = %edge.to,
                        "dropped edge that would introduce a cycle"
                    );
                    continue;
                }

                graph.add_edge(edge)?;
            }
        }
    }

    Ok(graph)
}
