//! Transitive closure (Floyd–Warshall) and transitive reduction.

use crate::error::Result;
use crate::graph::Graph;
use std::collections::{HashMap, HashSet};

/// Reflexive transitive closure over forward edges: `closure[a]` contains every node reachable from
/// `a`, including `a` itself. `O(V^3)`.
pub fn transitive_closure(graph: &Graph) -> HashMap<String, HashSet<String>> {
    graph.with_read(|inner| {
        let mut ids: Vec<String> = inner.nodes.keys().cloned().collect();
        ids.sort();
        let index: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (id.as_str(), i)).collect();
        let n = ids.len();

        let mut reachable = vec![vec![false; n]; n];
        for i in 0..n {
            reachable[i][i] = true;
        }
        for (from, edges) in &inner.forward {
            let i = index[from.as_str()];
            for edge in edges {
                let j = index[edge.to.as_str()];
                reachable[i][j] = true;
            }
        }

        for k in 0..n {
            for i in 0..n {
                if !reachable[i][k] {
                    continue;
                }
                for j in 0..n {
                    if reachable[k][j] {
                        reachable[i][j] = true;
                    }
                }
            }
        }

        let mut closure = HashMap::new();
        for (i, id) in ids.iter().enumerate() {
            let set: HashSet<String> = (0..n).filter(|j| reachable[i][*j]).map(|j| ids[j].clone()).collect();
            closure.insert(id.clone(), set);
        }
        closure
    })
}

/// Build a clone of the graph with every redundant edge removed: `(u, v)` is removed if there
/// exists an intermediate `w != u, v` with `closure[u][w] && closure[w][v]`. Reachability is
/// preserved.
pub fn transitive_reduction(graph: &Graph) -> Result<Graph> {
    let closure = transitive_closure(graph);
    let reduced = graph.clone_deep();

    let edges_to_remove = graph.with_read(|inner| {
        let mut to_remove = Vec::new();
        for (from, edges) in &inner.forward {
            for edge in edges {
                let has_intermediate = inner.nodes.keys().any(|w| {
                    w != from
                        && w != &edge.to
                        && closure.get(from).map(|s| s.contains(w)).unwrap_or(false)
                        && closure.get(w).map(|s| s.contains(&edge.to)).unwrap_or(false)
                });
                if has_intermediate {
                    to_remove.push((from.clone(), edge.to.clone()));
                }
            }
        }
        to_remove
    });

    for (from, to) in edges_to_remove {
        reduced.remove_edge(&from, &to)?;
    }

    Ok(reduced)
}
