//! Enumeration of every simple path between two nodes.

use crate::graph::{Graph, GraphInner};

/// Enumerate every simple path from `from` to `to` over forward edges via backtracking DFS,
/// bounded by `max_paths` to keep pathological fan-outs finite. Paths are returned in the order
/// discovered; each is a sequence of node IDs starting at `from` and ending at `to`.
pub fn all_paths(graph: &Graph, from: &str, to: &str, max_paths: usize) -> Vec<Vec<String>> {
    graph.with_read(|inner| {
        let mut results = Vec::new();
        if max_paths == 0 || !inner.nodes.contains_key(from) || !inner.nodes.contains_key(to) {
            return results;
        }
        let mut visited = std::collections::HashSet::new();
        let mut path = vec![from.to_string()];
        visited.insert(from.to_string());
        walk(inner, from, to, &mut visited, &mut path, &mut results, max_paths);
        results
    })
}

fn walk(
    inner: &GraphInner,
    current: &str,
    target: &str,
    visited: &mut std::collections::HashSet<String>,
    path: &mut Vec<String>,
    results: &mut Vec<Vec<String>>,
    max_paths: usize,
) {
    if results.len() >= max_paths {
        return;
    }
    if current == target {
        results.push(path.clone());
        return;
    }
    let Some(edges) = inner.forward.get(current) else {
        return;
    };
    let mut targets: Vec<&str> = edges.iter().map(|e| e.to.as_str()).collect();
    targets.sort();
    for next in targets {
        if results.len() >= max_paths {
            return;
        }
        if !visited.insert(next.to_string()) {
            continue;
        }
        path.push(next.to_string());
        walk(inner, next, target, visited, path, results, max_paths);
        path.pop();
        visited.remove(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Edge;
    use crate::node::Node;

    fn node(id: &str) -> Node {
        Node::new(id, id, "vpc").unwrap()
    }

    #[test]
    fn finds_all_simple_paths() {
        let graph = Graph::new("g");
        for id in ["a", "b", "c", "d"] {
            graph.add_node(node(id)).unwrap();
        }
        // d -> b -> a, d -> c -> a: two paths from d to a.
        graph.add_edge(Edge::new("d", "b").unwrap()).unwrap();
        graph.add_edge(Edge::new("d", "c").unwrap()).unwrap();
        graph.add_edge(Edge::new("b", "a").unwrap()).unwrap();
        graph.add_edge(Edge::new("c", "a").unwrap()).unwrap();

        let paths = all_paths(&graph, "d", "a", 10);
        assert_eq!(paths.len(), 2);
        assert!(paths.contains(&vec!["d".to_string(), "b".to_string(), "a".to_string()]));
        assert!(paths.contains(&vec!["d".to_string(), "c".to_string(), "a".to_string()]));
    }

    #[test]
    fn respects_max_paths_bound() {
        let graph = Graph::new("g");
        for id in ["root", "a", "b", "c"] {
            graph.add_node(node(id)).unwrap();
        }
        for id in ["a", "b", "c"] {
            graph.add_edge(Edge::new(id, "root").unwrap()).unwrap();
        }
        let paths = all_paths(&graph, "a", "root", 1);
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn unreachable_target_yields_no_paths() {
        let graph = Graph::new("g");
        graph.add_node(node("a")).unwrap();
        graph.add_node(node("b")).unwrap();
        assert!(all_paths(&graph, "a", "b", 10).is_empty());
    }
}
