//! Bottleneck detection: nodes that transitively block a large share of the graph.

use crate::algorithms::CriticalPathResult;
use crate::error::Result;
use crate::graph::Graph;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A node identified as constraining downstream throughput.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bottleneck {
    pub node_id: String,
    pub blocked_count: usize,
    pub impact: f64,
    pub rationale: String,
    pub mitigation: String,
}

const DURATION_THRESHOLD_SECS: f64 = 300.0;
const BLOCKED_COUNT_THRESHOLD: usize = 5;

/// Count of nodes transitively reachable from `id` by walking dependents (nodes whose completion
/// `id` gates), excluding `id` itself.
fn transitive_blocked_count(graph: &Graph, id: &str) -> usize {
    let mut seen: HashSet<String> = HashSet::new();
    let mut stack: Vec<String> = graph.get_dependents(id);
    while let Some(next) = stack.pop() {
        if seen.insert(next.clone()) {
            stack.extend(graph.get_dependents(&next));
        }
    }
    seen.len()
}

pub fn detect(graph: &Graph, critical_path: &CriticalPathResult) -> Result<Vec<Bottleneck>> {
    let total = graph.node_count().max(1);
    let critical_ids: HashSet<&str> = critical_path.path.iter().map(String::as_str).collect();

    let mut bottlenecks = Vec::new();
    for id in graph.node_ids() {
        let blocked_count = transitive_blocked_count(graph, &id);
        let is_critical = critical_ids.contains(id.as_str());
        if blocked_count <= 2 && !is_critical {
            continue;
        }

        let node = match graph.get_node(&id) {
            Some(n) => n,
            None => continue,
        };
        let impact = blocked_count as f64 / total as f64;

        let mut rationale = Vec::new();
        if is_critical {
            rationale.push("on the critical path".to_string());
        }
        if blocked_count > 2 {
            rationale.push(format!("transitively blocks {blocked_count} other operation(s)"));
        }
        if node.estimated_duration_secs > DURATION_THRESHOLD_SECS {
            rationale.push(format!(
                "takes {:.0}s, over the 5-minute threshold",
                node.estimated_duration_secs
            ));
        }

        let mitigation = if blocked_count > BLOCKED_COUNT_THRESHOLD {
            "split this operation or its downstream work to reduce the blocked set".to_string()
        } else if node.estimated_duration_secs > DURATION_THRESHOLD_SECS {
            "shorten this operation's duration or run it earlier in the plan".to_string()
        } else {
            "monitor; currently within acceptable duration and fan-out bounds".to_string()
        };

        bottlenecks.push(Bottleneck {
            node_id: id,
            blocked_count,
            impact,
            rationale: rationale.join("; "),
            mitigation,
        });
    }

    bottlenecks.sort_by(|a, b| {
        b.blocked_count
            .cmp(&a.blocked_count)
            .then_with(|| a.node_id.cmp(&b.node_id))
    });
    Ok(bottlenecks)
}
