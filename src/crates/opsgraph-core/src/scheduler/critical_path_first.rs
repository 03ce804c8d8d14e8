//! CriticalPathFirst strategy: critical nodes get their own stage, ahead of the rest of their level.

use super::{chunk_by, resolve, ScheduleConfig};
use crate::error::Result;
use crate::graph::Graph;
use crate::node::Node;

pub fn build(graph: &Graph, config: &ScheduleConfig) -> Result<Vec<Vec<Node>>> {
    let critical = crate::algorithms::critical_path_method(graph)?;
    let critical_ids: std::collections::HashSet<String> =
        critical.path.iter().cloned().collect();
    let groups = crate::algorithms::compute_parallel_groups(graph)?;

    let mut stages = Vec::new();
    for level_ids in groups {
        let mut nodes = resolve(graph, &level_ids);
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut critical_nodes: Vec<Node> =
            nodes.iter().filter(|n| critical_ids.contains(&n.id)).cloned().collect();
        critical_nodes.sort_by(|a, b| {
            a.earliest_start
                .partial_cmp(&b.earliest_start)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for node in critical_nodes {
            stages.push(vec![node]);
        }

        let rest: Vec<Node> = nodes.into_iter().filter(|n| !critical_ids.contains(&n.id)).collect();
        stages.extend(chunk_by(rest, config.max_parallel_ops));
    }
    stages.retain(|s| !s.is_empty());
    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Edge;

    fn node(id: &str, duration: f64) -> Node {
        Node::new(id, id, "vpc").unwrap().with_duration(duration, duration, duration).unwrap()
    }

    #[test]
    fn critical_node_gets_its_own_stage_ahead_of_siblings() {
        let graph = Graph::new("g");
        graph.add_node(node("root", 1.0)).unwrap();
        graph.add_node(node("critical_child", 10.0)).unwrap();
        graph.add_node(node("minor_child", 1.0)).unwrap();
        graph.add_edge(Edge::new("critical_child", "root").unwrap()).unwrap();
        graph.add_edge(Edge::new("minor_child", "root").unwrap()).unwrap();

        let stages = build(&graph, &ScheduleConfig::default()).unwrap();
        let critical_stage_idx = stages
            .iter()
            .position(|s| s.len() == 1 && s[0].id == "critical_child")
            .unwrap();
        let minor_stage_idx = stages
            .iter()
            .position(|s| s.iter().any(|n| n.id == "minor_child"))
            .unwrap();
        assert!(critical_stage_idx < minor_stage_idx);
    }
}
