//! Level-based parallel grouping and connectivity-critical node detection.

use crate::error::Result;
use crate::graph::Graph;

/// Lock once, recompute levels via the internal (lock-free) routine, then group node IDs by level.
/// The returned vector is indexed by level: `groups[k]` holds every node at level `k`.
pub fn compute_parallel_groups(graph: &Graph) -> Result<Vec<Vec<String>>> {
    graph.with_write(|inner| {
        crate::graph::compute_levels_internal(inner)?;
        let max_level = inner.max_level as usize;
        let mut groups = vec![Vec::new(); max_level + 1];
        let mut ids: Vec<&String> = inner.nodes.keys().collect();
        ids.sort();
        for id in ids {
            let level = inner.nodes[id].level as usize;
            groups[level].push(id.clone());
        }
        Ok(groups)
    })
}

/// For each node, clone the graph, remove that node, and test whether any original root→leaf
/// reachability pair was broken; such a node is "critical" for connectivity. `O(V^2 * (V+E))` —
/// acceptable for planning-sized graphs (hundreds to thousands of nodes). A faster
/// articulation-point-based approximation is a documented future extension, not implemented here.
pub fn get_critical_nodes(graph: &Graph) -> Vec<String> {
    let roots = graph.get_root_nodes();
    let leaves = graph.get_leaf_nodes();
    let mut reachable_pairs = Vec::new();
    for root in &roots {
        for leaf in &leaves {
            if root != leaf && graph.is_reachable(root, leaf) {
                reachable_pairs.push((root.clone(), leaf.clone()));
            }
        }
    }

    let mut ids = graph.node_ids();
    ids.sort();

    let mut critical = Vec::new();
    for id in ids {
        let candidate = graph.clone_deep();
        if candidate.remove_node(&id).is_err() {
            continue;
        }
        let breaks_a_pair = reachable_pairs
            .iter()
            .any(|(root, leaf)| root != &id && leaf != &id && !candidate.is_reachable(root, leaf));
        if breaks_a_pair {
            critical.push(id);
        }
    }
    critical
}
