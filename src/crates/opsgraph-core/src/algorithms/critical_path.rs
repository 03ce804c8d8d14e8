//! Critical Path Method and longest-path reconstruction.

use crate::error::Result;
use crate::graph::{Graph, GraphInner};
use std::collections::HashMap;

/// Result of running the Critical Path Method over a graph.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CriticalPathResult {
    /// Critical nodes in ascending earliest-start order.
    pub path: Vec<String>,
    pub project_duration: f64,
    pub earliest_start: HashMap<String, f64>,
    pub latest_start: HashMap<String, f64>,
    pub slack: HashMap<String, f64>,
}

fn duration_of(inner: &GraphInner, id: &str) -> f64 {
    inner.nodes.get(id).map(|n| n.estimated_duration_secs).unwrap_or(0.0)
}

/// (1) topologically sort; (2) forward pass for earliest start; (3) project duration; (4) backward
/// pass for latest start; (5) slack and criticality. Critical nodes are returned in ascending
/// earliest-start order; edges connecting two consecutive critical nodes are flagged critical on the
/// graph itself.
pub fn critical_path_method(graph: &Graph) -> Result<CriticalPathResult> {
    let order = crate::algorithms::topo::topological_sort(graph)?;

    let result = graph.with_write(|inner| {
        // order is dependencies-before-dependents; forward pass needs dependencies resolved first,
        // i.e. processing in topological order (deps, whose position is earlier, come first).
        let mut earliest_start: HashMap<String, f64> = HashMap::new();
        for id in order.iter() {
            let deps = inner.forward.get(id).cloned().unwrap_or_default();
            let es = deps
                .iter()
                .map(|e| earliest_start.get(&e.to).copied().unwrap_or(0.0) + duration_of(inner, &e.to))
                .fold(0.0_f64, f64::max);
            earliest_start.insert(id.clone(), es);
        }

        let project_duration = order
            .iter()
            .map(|id| earliest_start.get(id).copied().unwrap_or(0.0) + duration_of(inner, id))
            .fold(0.0_f64, f64::max);

        let mut latest_start: HashMap<String, f64> = HashMap::new();
        for id in order.iter().rev() {
            let ls = if inner.reverse.get(id).map(|e| e.is_empty()).unwrap_or(true) {
                project_duration - duration_of(inner, id)
            } else {
                let dependents = inner.reverse.get(id).cloned().unwrap_or_default();
                dependents
                    .iter()
                    .map(|e| latest_start.get(&e.from).copied().unwrap_or(project_duration))
                    .fold(f64::MAX, f64::min)
                    - duration_of(inner, id)
            };
            latest_start.insert(id.clone(), ls);
        }

        let mut slack: HashMap<String, f64> = HashMap::new();
        let mut critical: Vec<String> = Vec::new();
        for id in inner.nodes.keys() {
            let es = earliest_start.get(id).copied().unwrap_or(0.0);
            let ls = latest_start.get(id).copied().unwrap_or(0.0);
            let s = ls - es;
            slack.insert(id.clone(), s);
            if let Some(node) = inner.nodes.get_mut(id) {
                node.earliest_start = es;
                node.latest_start = ls;
                node.slack = s;
                node.is_critical = s.abs() < 1e-9;
            }
            if s.abs() < 1e-9 {
                critical.push(id.clone());
            }
        }
        critical.sort_by(|a, b| {
            earliest_start
                .get(a)
                .copied()
                .unwrap_or(0.0)
                .partial_cmp(&earliest_start.get(b).copied().unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let critical_set: std::collections::HashSet<&String> = critical.iter().collect();
        for (from, edges) in inner.forward.iter_mut() {
            for edge in edges.iter_mut() {
                edge.is_critical = critical_set.contains(from) && critical_set.contains(&edge.to);
            }
        }
        for edges in inner.reverse.values_mut() {
            for edge in edges.iter_mut() {
                edge.is_critical = critical_set.contains(&edge.from) && critical_set.contains(&edge.to);
            }
        }

        inner.critical_path = critical.clone();
        inner.total_duration = project_duration;

        CriticalPathResult {
            path: critical,
            project_duration,
            earliest_start,
            latest_start,
            slack,
        }
    });

    Ok(result)
}

/// Longest path from any source to the maximal-distance node: distances initialize to `-1` except
/// roots (their own duration), relaxed in topological order while keeping parent pointers.
pub fn longest_path(graph: &Graph) -> Result<Vec<String>> {
    let order = crate::algorithms::topo::topological_sort(graph)?;
    graph.with_read(|inner| {
        let mut distance: HashMap<String, f64> = HashMap::new();
        let mut parent: HashMap<String, String> = HashMap::new();

        for id in order.iter().rev() {
            let is_root = inner.reverse.get(id).map(|e| e.is_empty()).unwrap_or(true);
            if is_root {
                distance.insert(id.clone(), duration_of(inner, id));
            }
        }
        for id in order.iter().rev() {
            let deps = inner.forward.get(id).cloned().unwrap_or_default();
            for edge in deps {
                let through_dep = distance.get(id).copied().unwrap_or(f64::NEG_INFINITY) + duration_of(inner, &edge.to);
                let existing = distance.get(&edge.to).copied().unwrap_or(f64::NEG_INFINITY);
                if through_dep > existing {
                    distance.insert(edge.to.clone(), through_dep);
                    parent.insert(edge.to.clone(), id.clone());
                }
            }
        }

        let end = distance
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(id, _)| id.clone());

        let mut path = Vec::new();
        if let Some(mut cur) = end {
            path.push(cur.clone());
            while let Some(p) = parent.get(&cur) {
                path.push(p.clone());
                cur = p.clone();
            }
            path.reverse();
        }
        Ok(path)
    })
}
