//! RiskBased strategies: as greedy, but ordered within a level by risk instead of priority.

use super::{chunk_by, resolve, ScheduleConfig};
use crate::error::Result;
use crate::graph::Graph;
use crate::node::Node;

/// Whether riskier operations should run earlier or later within their level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Early,
    Late,
}

pub fn build(graph: &Graph, config: &ScheduleConfig, order: Order) -> Result<Vec<Vec<Node>>> {
    let groups = crate::algorithms::compute_parallel_groups(graph)?;
    let mut stages = Vec::new();
    for level_ids in groups {
        let mut nodes = resolve(graph, &level_ids);
        nodes.sort_by(|a, b| {
            let by_risk = match order {
                Order::Early => b.risk_level.cmp(&a.risk_level),
                Order::Late => a.risk_level.cmp(&b.risk_level),
            };
            by_risk.then_with(|| a.id.cmp(&b.id))
        });
        stages.extend(chunk_by(nodes, config.max_parallel_ops));
    }
    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Edge;
    use crate::node::RiskLevel;

    fn node(id: &str, risk: RiskLevel) -> Node {
        Node::new(id, id, "vpc").unwrap().with_risk_level(risk)
    }

    fn fan_out() -> Graph {
        let graph = Graph::new("g");
        graph.add_node(node("root", RiskLevel::Low)).unwrap();
        graph.add_node(node("low", RiskLevel::Low)).unwrap();
        graph.add_node(node("high", RiskLevel::Critical)).unwrap();
        graph.add_edge(Edge::new("low", "root").unwrap()).unwrap();
        graph.add_edge(Edge::new("high", "root").unwrap()).unwrap();
        graph
    }

    #[test]
    fn early_orders_high_risk_first() {
        let graph = fan_out();
        let stages = build(&graph, &ScheduleConfig::default().with_max_parallel_ops(5), Order::Early).unwrap();
        assert_eq!(stages[1][0].id, "high");
    }

    #[test]
    fn late_orders_high_risk_last() {
        let graph = fan_out();
        let stages = build(&graph, &ScheduleConfig::default().with_max_parallel_ops(5), Order::Late).unwrap();
        assert_eq!(stages[1][1].id, "high");
    }
}
