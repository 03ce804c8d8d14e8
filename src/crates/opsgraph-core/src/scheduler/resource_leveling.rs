//! ResourceLeveling strategy: packs each stage against `max_api_calls_per_sec` instead of a flat
//! parallelism cap.

use super::ScheduleConfig;
use crate::error::Result;
use crate::graph::Graph;
use crate::node::Node;
use std::collections::{HashMap, HashSet};

pub fn build(graph: &Graph, config: &ScheduleConfig) -> Result<Vec<Vec<Node>>> {
    let ids = graph.node_ids();
    let mut remaining_deps: HashMap<String, usize> = HashMap::new();
    for id in &ids {
        remaining_deps.insert(id.clone(), graph.get_dependencies(id).len());
    }

    let mut available: Vec<String> = ids
        .iter()
        .filter(|id| remaining_deps[*id] == 0)
        .cloned()
        .collect();
    available.sort();

    let mut committed: HashSet<String> = HashSet::new();
    let mut stages = Vec::new();

    while committed.len() < ids.len() {
        let mut pool = available.clone();
        pool.sort_by(|a, b| {
            let na = graph.get_node(a).unwrap();
            let nb = graph.get_node(b).unwrap();
            na.resources
                .api_calls_required
                .cmp(&nb.resources.api_calls_required)
                .then_with(|| nb.priority.cmp(&na.priority))
                .then_with(|| na.id.cmp(&nb.id))
        });

        let mut stage = Vec::new();
        let mut budget = config.max_api_calls_per_sec;
        let mut taken = Vec::new();

        for id in &pool {
            let n = graph.get_node(id).unwrap();
            let cost = n.resources.api_calls_required.max(1);
            if stage.is_empty() || cost <= budget {
                budget = budget.saturating_sub(cost);
                stage.push(n);
                taken.push(id.clone());
            }
        }

        if stage.is_empty() {
            break;
        }

        for id in &taken {
            available.retain(|a| a != id);
            committed.insert(id.clone());
            for dependent in graph.get_dependents(id) {
                if let Some(count) = remaining_deps.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 && !committed.contains(&dependent) {
                        available.push(dependent);
                    }
                }
            }
        }
        available.sort();
        available.dedup();

        stages.push(stage);
    }

    Ok(stages)
}
