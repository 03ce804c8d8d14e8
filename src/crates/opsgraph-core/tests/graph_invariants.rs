//! Property tests for invariants that must hold for *any* acyclic graph, not just the handful of
//! graphs built by hand in the unit tests.

use opsgraph_core::algorithms::{
    compute_parallel_groups, critical_path_method, topological_sort, transitive_reduction,
};
use opsgraph_core::edge::Edge;
use opsgraph_core::graph::Graph;
use opsgraph_core::node::Node;
use opsgraph_core::scheduler::{self, ScheduleConfig, SchedulerStrategy};
use proptest::collection::vec as pvec;
use proptest::prelude::*;

/// A DAG with `n` nodes named `n0..n{n-1}` and edges only from a higher-indexed node to a
/// lower-indexed one, so the graph is acyclic by construction regardless of which edges are
/// chosen.
fn dag_strategy(max_nodes: usize) -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2..max_nodes).prop_flat_map(|n| {
        let possible_edges: Vec<(usize, usize)> =
            (0..n).flat_map(|from| (0..from).map(move |to| (from, to))).collect();
        let edge_mask = pvec(any::<bool>(), possible_edges.len());
        (Just(n), edge_mask).prop_map(move |(n, mask)| {
            let edges: Vec<(usize, usize)> = possible_edges
                .iter()
                .zip(mask.iter())
                .filter(|(_, keep)| **keep)
                .map(|(e, _)| *e)
                .collect();
            (n, edges)
        })
    })
}

fn build_graph(n: usize, edges: &[(usize, usize)]) -> Graph {
    let graph = Graph::new("prop");
    for i in 0..n {
        graph
            .add_node(Node::new(format!("n{i}"), format!("n{i}"), "vpc").unwrap())
            .unwrap();
    }
    for (from, to) in edges {
        graph
            .add_edge(Edge::new(format!("n{from}"), format!("n{to}")).unwrap())
            .unwrap();
    }
    graph
}

proptest! {
    /// Any graph built with edges only pointing from a higher index to a lower one is acyclic and
    /// passes structural validation (forward/reverse adjacency stay mirrored through arbitrary
    /// add_edge sequences).
    #[test]
    fn acyclic_by_construction_graphs_validate((n, edges) in dag_strategy(10)) {
        let graph = build_graph(n, &edges);
        prop_assert!(graph.validate().is_ok());
        let (has_cycle, _) = graph.has_cycle();
        prop_assert!(!has_cycle);
    }

    /// Topological sort always orders every dependency (`to`) before its dependent (`from`).
    #[test]
    fn topo_sort_respects_every_edge((n, edges) in dag_strategy(10)) {
        let graph = build_graph(n, &edges);
        let order = topological_sort(&graph).unwrap();
        let pos = |id: &str| order.iter().position(|x| x == id).unwrap();
        for (from, to) in &edges {
            let from_id = format!("n{from}");
            let to_id = format!("n{to}");
            prop_assert!(pos(&to_id) < pos(&from_id));
        }
    }

    /// Computed levels strictly decrease along every dependency edge: a node's level is always
    /// greater than the level of anything it depends on.
    #[test]
    fn levels_strictly_decrease_along_dependencies((n, edges) in dag_strategy(10)) {
        let graph = build_graph(n, &edges);
        compute_parallel_groups(&graph).unwrap();
        for (from, to) in &edges {
            let from_node = graph.get_node(&format!("n{from}")).unwrap();
            let to_node = graph.get_node(&format!("n{to}")).unwrap();
            prop_assert!(from_node.level > to_node.level);
        }
    }

    /// Transitive reduction never changes which nodes can reach which other nodes.
    #[test]
    fn transitive_reduction_preserves_reachability((n, edges) in dag_strategy(8)) {
        let graph = build_graph(n, &edges);
        let reduced = transitive_reduction(&graph).unwrap();
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let a = format!("n{i}");
                let b = format!("n{j}");
                prop_assert_eq!(graph.is_reachable(&a, &b), reduced.is_reachable(&a, &b));
            }
        }
    }

    /// A deep clone is a fully independent graph: mutating it never changes the original's node
    /// count.
    #[test]
    fn clone_deep_is_independent_of_the_original((n, edges) in dag_strategy(8)) {
        let graph = build_graph(n, &edges);
        let original_count = graph.node_count();
        let clone = graph.clone_deep();
        clone
            .add_node(Node::new("extra-node", "extra", "vpc").unwrap())
            .unwrap();
        prop_assert_eq!(graph.node_count(), original_count);
        prop_assert_eq!(clone.node_count(), original_count + 1);
    }

    /// Every stage the greedy scheduler produces only ever contains operations whose dependencies
    /// all sit in an earlier stage.
    #[test]
    fn greedy_schedule_respects_dependency_order((n, edges) in dag_strategy(10)) {
        let graph = build_graph(n, &edges);
        let config = ScheduleConfig::default().with_strategy(SchedulerStrategy::Greedy);
        let schedule = scheduler::schedule(&graph, &config).unwrap();
        let stage_of = |id: &str| {
            schedule
                .stages
                .iter()
                .position(|stage| stage.iter().any(|node| node.id == id))
                .unwrap()
        };
        for (from, to) in &edges {
            let from_id = format!("n{from}");
            let to_id = format!("n{to}");
            prop_assert!(stage_of(&to_id) < stage_of(&from_id));
        }
    }

    /// Schedule analysis efficiency is always a fraction in `[0, 1]`, never negative or above one
    /// regardless of how lopsided the stages are.
    #[test]
    fn schedule_analysis_efficiency_is_bounded((n, edges) in dag_strategy(10)) {
        let graph = build_graph(n, &edges);
        let schedule = scheduler::schedule(&graph, &ScheduleConfig::default()).unwrap();
        let analysis = scheduler::analyze_schedule(&schedule);
        prop_assert!(analysis.efficiency >= 0.0 && analysis.efficiency <= 1.0);
        prop_assert_eq!(analysis.total_ops, n);
    }

    /// Every node's slack is non-negative, and every node the method marks critical has exactly
    /// zero slack — the critical path is always the zero-slack subset, never an approximation of it.
    #[test]
    fn critical_path_nodes_have_zero_slack(
        (n, edges) in dag_strategy(8),
        durations in pvec(1.0_f64..100.0, 8),
    ) {
        let graph = Graph::new("prop-cpm");
        for i in 0..n {
            let secs = durations[i];
            graph
                .add_node(
                    Node::new(format!("n{i}"), format!("n{i}"), "vpc")
                        .unwrap()
                        .with_duration(secs, secs, secs)
                        .unwrap(),
                )
                .unwrap();
        }
        for (from, to) in &edges {
            graph
                .add_edge(Edge::new(format!("n{from}"), format!("n{to}")).unwrap())
                .unwrap();
        }

        let result = critical_path_method(&graph).unwrap();
        for id in graph.node_ids() {
            let slack = result.slack[&id];
            prop_assert!(slack >= -1e-9);
        }
        for id in &result.path {
            prop_assert!(result.slack[id].abs() < 1e-9);
        }
    }
}

/// Label keys matching the sensitive-substring list are redacted in [`Graph::to_json`] regardless
/// of case or what else is in the key.
#[test]
fn to_json_redacts_any_label_key_containing_a_sensitive_substring() {
    let graph = Graph::new("redaction");
    let node = Node::new("a", "a", "vpc")
        .unwrap()
        .with_label("DB_PASSWORD", "hunter2")
        .with_label("region", "us-east-1");
    graph.add_node(node).unwrap();

    let json = graph.to_json().unwrap();
    let labels = &json["nodes"]["a"]["labels"];
    assert_eq!(labels["DB_PASSWORD"], "[REDACTED]");
    assert_eq!(labels["region"], "us-east-1");
}
