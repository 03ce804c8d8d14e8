//! Greedy strategy: level order, priority within a level, chunked to `max_parallel_ops`.

use super::{chunk_by, resolve, ScheduleConfig};
use crate::error::Result;
use crate::graph::Graph;
use crate::node::Node;

pub fn build(graph: &Graph, config: &ScheduleConfig) -> Result<Vec<Vec<Node>>> {
    let groups = crate::algorithms::compute_parallel_groups(graph)?;
    let mut stages = Vec::new();
    for level_ids in groups {
        let mut nodes = resolve(graph, &level_ids);
        nodes.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));
        stages.extend(chunk_by(nodes, config.max_parallel_ops));
    }
    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Edge;

    fn node(id: &str, priority: i64) -> Node {
        Node::new(id, id, "vpc").unwrap().with_priority(priority)
    }

    #[test]
    fn sorts_by_priority_descending_within_a_level() {
        let graph = Graph::new("g");
        graph.add_node(node("low", 1)).unwrap();
        graph.add_node(node("high", 10)).unwrap();
        graph.add_node(node("root", 0)).unwrap();
        graph.add_edge(Edge::new("low", "root").unwrap()).unwrap();
        graph.add_edge(Edge::new("high", "root").unwrap()).unwrap();

        let stages = build(&graph, &ScheduleConfig::default().with_max_parallel_ops(5)).unwrap();
        assert_eq!(stages[1][0].id, "high");
        assert_eq!(stages[1][1].id, "low");
    }

    #[test]
    fn chunks_level_by_max_parallel_ops() {
        let graph = Graph::new("g");
        graph.add_node(node("root", 0)).unwrap();
        for id in ["c1", "c2", "c3"] {
            graph.add_node(node(id, 0)).unwrap();
            graph.add_edge(Edge::new(id, "root").unwrap()).unwrap();
        }
        let stages = build(&graph, &ScheduleConfig::default().with_max_parallel_ops(2)).unwrap();
        // level 0: [root] -> 1 stage; level 1: 3 nodes chunked by 2 -> 2 stages.
        assert_eq!(stages.len(), 3);
        assert_eq!(stages[1].len(), 2);
        assert_eq!(stages[2].len(), 1);
    }
}
