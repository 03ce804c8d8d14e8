//! Splits a graph into independent sub-graphs for distributed fan-out.

use crate::error::Result;
use crate::graph::Graph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which strategy [`partition`] should use to assign nodes to partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionStrategy {
    ByLevel,
    ByRegion,
    ByResourceType,
    Balanced,
    MinCutGreedy,
}

/// One partition: its own sub-graph plus the IDs of edges crossing into other partitions.
///
/// Not `Serialize`/`Deserialize` — [`Graph`] deliberately exposes only the redacted
/// [`Graph::to_json`] view, not a direct serde impl; serialize `analysis` and each partition's
/// `graph.to_json()` separately if a wire format is needed.
#[derive(Debug, Clone)]
pub struct Partition {
    pub id: usize,
    pub graph: Graph,
    /// `(from, to)` pairs whose `to` endpoint lives in another partition.
    pub cross_edges: Vec<(String, String)>,
}

/// Aggregate quality metrics over a partitioning result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PartitionAnalysis {
    pub balance: f64,
    pub internal_edges: usize,
    pub cut_edges: usize,
    pub independence_score: f64,
}

#[derive(Debug, Clone)]
pub struct PartitionResult {
    pub partitions: Vec<Partition>,
    pub analysis: PartitionAnalysis,
}

pub fn partition(graph: &Graph, strategy: PartitionStrategy, num_partitions: usize) -> Result<PartitionResult> {
    graph.validate()?;
    let num_partitions = num_partitions.max(1);

    let assignment = match strategy {
        PartitionStrategy::ByLevel => assign_by_level(graph, num_partitions)?,
        PartitionStrategy::ByRegion => assign_by_label(graph, num_partitions, &["region", "location"]),
        PartitionStrategy::ByResourceType => assign_by_resource_type(graph, num_partitions),
        PartitionStrategy::Balanced => assign_balanced(graph, num_partitions)?,
        PartitionStrategy::MinCutGreedy => assign_min_cut_greedy(graph, num_partitions),
    };

    build_result(graph, assignment, num_partitions)
}

fn assign_by_level(graph: &Graph, num_partitions: usize) -> Result<HashMap<String, usize>> {
    crate::algorithms::compute_parallel_groups(graph)?;
    let mut assignment = HashMap::new();
    for id in graph.node_ids() {
        let node = graph.get_node(&id);
        let level = node.map(|n| n.level as usize).unwrap_or(0);
        assignment.insert(id, level % num_partitions);
    }
    Ok(assignment)
}

fn assign_by_label(graph: &Graph, num_partitions: usize, label_keys: &[&str]) -> HashMap<String, usize> {
    let mut buckets: HashMap<String, usize> = HashMap::new();
    let mut assignment = HashMap::new();
    for id in graph.node_ids() {
        let key = graph
            .get_node(&id)
            .and_then(|n| label_keys.iter().find_map(|k| n.labels.get(*k).cloned()))
            .unwrap_or_else(|| "unassigned".to_string());
        let next_bucket = buckets.len() % num_partitions;
        let bucket = *buckets.entry(key).or_insert(next_bucket);
        assignment.insert(id, bucket);
    }
    assignment
}

fn assign_by_resource_type(graph: &Graph, num_partitions: usize) -> HashMap<String, usize> {
    let mut buckets: HashMap<String, usize> = HashMap::new();
    let mut assignment = HashMap::new();
    for id in graph.node_ids() {
        let kind = graph.get_node(&id).map(|n| n.resource_kind).unwrap_or_default();
        let next_bucket = buckets.len() % num_partitions;
        let bucket = *buckets.entry(kind).or_insert(next_bucket);
        assignment.insert(id, bucket);
    }
    assignment
}

fn assign_balanced(graph: &Graph, num_partitions: usize) -> Result<HashMap<String, usize>> {
    let order = crate::algorithms::topological_sort(graph)?;
    let mut assignment = HashMap::new();
    for (i, id) in order.into_iter().enumerate() {
        assignment.insert(id, i % num_partitions);
    }
    Ok(assignment)
}

/// Assign each node, in topological order, to the partition where it already has the most
/// assigned dependencies; ties favor the currently smaller partition.
fn assign_min_cut_greedy(graph: &Graph, num_partitions: usize) -> HashMap<String, usize> {
    let order = crate::algorithms::topological_sort(graph).unwrap_or_default();
    let mut assignment: HashMap<String, usize> = HashMap::new();
    let mut sizes = vec![0usize; num_partitions];

    for id in order {
        let deps = graph.get_dependencies(&id);
        let mut votes = vec![0usize; num_partitions];
        for dep in &deps {
            if let Some(&p) = assignment.get(dep) {
                votes[p] += 1;
            }
        }

        let best = (0..num_partitions)
            .max_by(|&a, &b| {
                votes[a]
                    .cmp(&votes[b])
                    .then_with(|| sizes[b].cmp(&sizes[a]))
            })
            .unwrap_or(0);

        assignment.insert(id, best);
        sizes[best] += 1;
    }
    assignment
}

fn build_result(graph: &Graph, assignment: HashMap<String, usize>, num_partitions: usize) -> Result<PartitionResult> {
    let mut sub_graphs: Vec<Graph> = (0..num_partitions)
        .map(|i| Graph::new(format!("{}-partition-{i}", graph.metadata().name)))
        .collect();

    for id in graph.node_ids() {
        let Some(node) = graph.get_node(&id) else { continue };
        let p = assignment.get(&id).copied().unwrap_or(0);
        sub_graphs[p].add_node(node)?;
    }

    let mut cross_edges_by_partition: Vec<Vec<(String, String)>> = vec![Vec::new(); num_partitions];
    let mut internal_edges = 0usize;
    let mut cut_edges = 0usize;

    for id in graph.node_ids() {
        let from_p = assignment.get(&id).copied().unwrap_or(0);
        for edge in graph.get_edges(&id) {
            let to_p = assignment.get(&edge.to).copied().unwrap_or(0);
            if from_p == to_p {
                let _ = sub_graphs[from_p].add_edge(edge.clone());
                internal_edges += 1;
            } else {
                cross_edges_by_partition[from_p].push((edge.from.clone(), edge.to.clone()));
                cut_edges += 1;
            }
        }
    }

    let partitions: Vec<Partition> = sub_graphs
        .into_iter()
        .enumerate()
        .map(|(id, graph)| Partition {
            id,
            cross_edges: std::mem::take(&mut cross_edges_by_partition[id]),
            graph,
        })
        .collect();

    let sizes: Vec<usize> = partitions.iter().map(|p| p.graph.node_count()).collect();
    let mean = sizes.iter().sum::<usize>() as f64 / sizes.len().max(1) as f64;
    let variance = sizes.iter().map(|&s| (s as f64 - mean).powi(2)).sum::<f64>() / sizes.len().max(1) as f64;
    let balance = 1.0 / (1.0 + variance.sqrt());

    let independence_score = if cut_edges + internal_edges == 0 {
        1.0
    } else {
        1.0 - cut_edges as f64 / (cut_edges + internal_edges) as f64
    };

    Ok(PartitionResult {
        partitions,
        analysis: PartitionAnalysis { balance, internal_edges, cut_edges, independence_score },
    })
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
    fn by_level_keeps_dependency_edges_as_cross_edges_across_levels() {
        let graph = Graph::new("g");
        graph.add_node(node("root")).unwrap();
        graph.add_node(node("child")).unwrap();
        graph.add_edge(Edge::new("child", "root").unwrap()).unwrap();

        let result = partition(&graph, PartitionStrategy::ByLevel, 2).unwrap();
        assert_eq!(result.partitions.len(), 2);
        assert!(result.analysis.independence_score <= 1.0);
    }

    #[test]
    fn by_resource_type_groups_same_kind_together() {
        let graph = Graph::new("g");
        graph.add_node(Node::new("a", "a", "subnet").unwrap()).unwrap();
        graph.add_node(Node::new("b", "b", "subnet").unwrap()).unwrap();
        graph.add_node(Node::new("c", "c", "sg").unwrap()).unwrap();

        let result = partition(&graph, PartitionStrategy::ByResourceType, 3).unwrap();
        let subnet_partition = result
            .partitions
            .iter()
            .find(|p| p.graph.get_node("a").is_some())
            .unwrap();
        assert!(subnet_partition.graph.get_node("b").is_some());
    }

    #[test]
    fn min_cut_greedy_does_not_lose_nodes() {
        let graph = Graph::new("g");
        for id in ["a", "b", "c", "d"] {
            graph.add_node(node(id)).unwrap();
        }
        graph.add_edge(Edge::new("b", "a").unwrap()).unwrap();
        graph.add_edge(Edge::new("c", "a").unwrap()).unwrap();
        graph.add_edge(Edge::new("d", "b").unwrap()).unwrap();

        let result = partition(&graph, PartitionStrategy::MinCutGreedy, 2).unwrap();
        let total: usize = result.partitions.iter().map(|p| p.graph.node_count()).sum();
        assert_eq!(total, 4);
    }
}
