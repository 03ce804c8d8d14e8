//! Topological ordering: Kahn's algorithm and a DFS post-order variant.

use crate::error::{PlanError, Result};
use crate::graph::{Graph, GraphInner};
use std::collections::{HashMap, VecDeque};

/// In-degree of a node is the size of its *forward* adjacency (its dependency count): a node
/// becomes ready once every operation it depends on has been emitted.
pub(crate) fn topological_sort_internal(inner: &GraphInner) -> Result<Vec<String>> {
    let mut in_degree: HashMap<&str, usize> = inner
        .nodes
        .keys()
        .map(|id| (id.as_str(), inner.forward.get(id).map(Vec::len).unwrap_or(0)))
        .collect();

    let mut ready: Vec<String> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| id.to_string())
        .collect();
    ready.sort();
    let mut queue: VecDeque<String> = ready.into();

    let mut order = Vec::with_capacity(inner.nodes.len());
    while let Some(id) = queue.pop_front() {
        order.push(id.clone());
        if let Some(dependents) = inner.reverse.get(&id) {
            let mut ready = Vec::new();
            for edge in dependents {
                if let Some(degree) = in_degree.get_mut(edge.from.as_str()) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(edge.from.clone());
                    }
                }
            }
            ready.sort();
            for id in ready {
                queue.push_back(id);
            }
        }
    }

    if order.len() != inner.nodes.len() {
        let (_, path) = crate::graph::has_cycle_internal(inner);
        return Err(PlanError::cycle(path));
    }

    Ok(order)
}

/// Kahn's algorithm over the graph's forward/reverse adjacency. Fails with [`PlanError::Cycle`] if
/// fewer than `node_count` nodes are processed.
pub fn topological_sort(graph: &Graph) -> Result<Vec<String>> {
    graph.with_read(topological_sort_internal)
}

fn topological_sort_dfs_internal(inner: &GraphInner) -> Result<Vec<String>> {
    #[derive(PartialEq, Eq, Clone, Copy)]
    enum Mark {
        Unvisited,
        Visiting,
        Done,
    }

    let mut marks: HashMap<String, Mark> = inner.nodes.keys().map(|id| (id.clone(), Mark::Unvisited)).collect();
    let mut post_order = Vec::with_capacity(inner.nodes.len());

    let mut ids: Vec<String> = inner.nodes.keys().cloned().collect();
    ids.sort();

    for start in ids {
        if marks[&start] != Mark::Unvisited {
            continue;
        }
        let mut stack = vec![(start, false)];
        while let Some((id, emit)) = stack.pop() {
            if emit {
                post_order.push(id.clone());
                marks.insert(id, Mark::Done);
                continue;
            }
            if marks.get(&id).copied() == Some(Mark::Done) {
                continue;
            }
            marks.insert(id.clone(), Mark::Visiting);
            stack.push((id.clone(), true));
            if let Some(edges) = inner.forward.get(&id) {
                let mut targets: Vec<&str> = edges.iter().map(|e| e.to.as_str()).collect();
                targets.sort();
                for target in targets {
                    if marks.get(target).copied().unwrap_or(Mark::Unvisited) == Mark::Unvisited {
                        stack.push((target.to_string(), false));
                    }
                }
            }
        }
    }

    if post_order.len() != inner.nodes.len() {
        let (_, path) = crate::graph::has_cycle_internal(inner);
        return Err(PlanError::cycle(path));
    }

    // Post-order over forward edges visits dependencies before dependents; reversing yields
    // dependents-after-dependencies, the same ordering contract as Kahn's, with a different tiebreak.
    post_order.reverse();
    Ok(post_order)
}

/// Post-order DFS over forward edges, then reversed. Produces an alternative topological order with
/// a different tie-break than [`topological_sort`], useful for schedulers that value locality.
pub fn topological_sort_dfs(graph: &Graph) -> Result<Vec<String>> {
    graph.with_read(topological_sort_dfs_internal)
}
