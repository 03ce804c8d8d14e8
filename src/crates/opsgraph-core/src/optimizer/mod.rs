//! Graph-level rewrites aligned to a speed, cost, reliability, or balance goal.
//!
//! Every strategy operates on [`crate::graph::Graph::clone_deep`] of the input and returns the
//! rewritten clone; the input graph is never mutated. No strategy removes a node, and the
//! reliability/balance strategies check reachability before adding an ordering edge so no strategy
//! can introduce a cycle.

use crate::algorithms;
use crate::edge::{Edge, EdgeType};
use crate::error::Result;
use crate::graph::Graph;
use serde::{Deserialize, Serialize};

/// Which objective [`optimize`] should align the graph to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizeGoal {
    Speed,
    Cost,
    Reliability,
    Balance,
}

pub fn optimize(graph: &Graph, goal: OptimizeGoal) -> Result<Graph> {
    match goal {
        OptimizeGoal::Speed => optimize_speed(graph),
        OptimizeGoal::Cost => optimize_cost(graph),
        OptimizeGoal::Reliability => optimize_reliability(graph),
        OptimizeGoal::Balance => optimize_balance(graph),
    }
}

/// Transitive-reduce, then weight critical-path proximity into node priority: nodes on the
/// critical path get the highest priority, others scaled down by slack.
fn optimize_speed(graph: &Graph) -> Result<Graph> {
    let clone = graph.clone_deep();
    let reduced = algorithms::transitive_reduction(&clone)?;
    let critical = algorithms::critical_path_method(&reduced)?;
    let reduced_edges = reduced.clone_deep();

    for id in reduced.node_ids() {
        if let Some(node) = reduced.get_node(&id) {
            let slack = critical.slack.get(&id).copied().unwrap_or(0.0);
            let priority = if critical.path.contains(&id) {
                100
            } else {
                (100.0 - slack.min(100.0)) as i64
            };
            reduced.remove_node(&id)?;
            reduced.add_node(node.with_priority(priority))?;
        }
    }
    reconnect_edges(&reduced_edges, &reduced)?;
    Ok(reduced)
}

/// Rank by `cost / duration` ascending (cheap-and-fast first), with a priority bonus for
/// idempotent operations (safe to reorder/retry without side effects).
fn optimize_cost(graph: &Graph) -> Result<Graph> {
    let clone = graph.clone_deep();
    let mut ranked: Vec<(String, f64)> = clone
        .node_ids()
        .into_iter()
        .filter_map(|id| clone.get_node(&id).map(|n| (id, n)))
        .map(|(id, n)| {
            let duration = n.estimated_duration_secs.max(0.001);
            (id, n.cost / duration)
        })
        .collect();
    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    for (rank, (id, _)) in ranked.iter().enumerate() {
        if let Some(node) = clone.get_node(id) {
            let bonus = if node.idempotent { 10 } else { 0 };
            let priority = (ranked.len() as i64 - rank as i64) + bonus;
            clone.remove_node(id)?;
            let node_with_deps = node.with_priority(priority);
            clone.add_node(node_with_deps)?;
        }
    }
    reconnect_edges(graph, &clone)?;
    Ok(clone)
}

/// Rank by idempotent + retriable + non-destructive + inverse risk, then add soft `Ordering`
/// edges between destructive operations (ascending risk) to stagger the riskiest ones later,
/// skipping any pair already connected in either direction.
fn optimize_reliability(graph: &Graph) -> Result<Graph> {
    let clone = graph.clone_deep();

    for id in clone.node_ids() {
        if let Some(node) = clone.get_node(&id) {
            let mut score = 0i64;
            if node.idempotent {
                score += 25;
            }
            if node.retriable {
                score += 25;
            }
            if !node.destructive {
                score += 25;
            }
            score += (100.0 - node.risk_level.base_score()) as i64 / 4;
            clone.remove_node(&id)?;
            clone.add_node(node.with_priority(score))?;
        }
    }
    reconnect_edges(graph, &clone)?;

    let mut destructive: Vec<String> = clone
        .node_ids()
        .into_iter()
        .filter(|id| clone.get_node(id).map(|n| n.destructive).unwrap_or(false))
        .collect();
    destructive.sort_by(|a, b| {
        let ra = clone.get_node(a).map(|n| n.risk_level).unwrap_or(crate::node::RiskLevel::Low);
        let rb = clone.get_node(b).map(|n| n.risk_level).unwrap_or(crate::node::RiskLevel::Low);
        ra.cmp(&rb).then_with(|| a.cmp(b))
    });

    for pair in destructive.windows(2) {
        let (earlier, later) = (&pair[0], &pair[1]);
        if clone.is_reachable(earlier, later) || clone.is_reachable(later, earlier) {
            continue;
        }
        let edge = Edge::new(later, earlier)?
            .with_type(EdgeType::Ordering)
            .with_reason("staggering destructive operations by ascending risk".to_string());
        clone.add_edge(edge)?;
    }

    Ok(clone)
}

/// Weighted sum of the three single-goal strategies (30% speed, 30% cost, 40% reliability),
/// applied in sequence, then transitive-reduced once more at the end.
fn optimize_balance(graph: &Graph) -> Result<Graph> {
    let speed = optimize_speed(graph)?;
    let cost = optimize_cost(&speed)?;
    let reliability = optimize_reliability(&cost)?;

    let reliability_before_reprioritizing = reliability.clone_deep();
    for id in reliability.node_ids() {
        let (speed_p, cost_p, reliability_p) = (
            speed.get_node(&id).map(|n| n.priority).unwrap_or(0),
            cost.get_node(&id).map(|n| n.priority).unwrap_or(0),
            reliability.get_node(&id).map(|n| n.priority).unwrap_or(0),
        );
        let balanced = (0.3 * speed_p as f64 + 0.3 * cost_p as f64 + 0.4 * reliability_p as f64) as i64;
        if let Some(node) = reliability.get_node(&id) {
            reliability.remove_node(&id)?;
            reliability.add_node(node.with_priority(balanced))?;
        }
    }
    reconnect_edges(&reliability_before_reprioritizing, &reliability)?;

    let final_graph = algorithms::transitive_reduction(&reliability)?;
    Ok(final_graph)
}

/// Re-adding a node via [`Graph::remove_node`]/[`Graph::add_node`] drops its edges; re-attach them
/// from `source` onto `target` so priority rewrites don't silently disconnect the graph.
fn reconnect_edges(source: &Graph, target: &Graph) -> Result<()> {
    for id in source.node_ids() {
        for edge in source.get_edges(&id) {
            if target.get_edges(&id).iter().any(|e| e.to == edge.to) {
                continue;
            }
            let _ = target.add_edge(edge);
        }
    }
    Ok(())
}
