//! Turns a validated, acyclic graph into ordered stages of parallel-eligible operations.
//!
//! Six strategies trade speed, cost, risk, and API rate limits against each other (see
//! [`SchedulerStrategy`]); all six share the same contract: every operation in stage *k* must have
//! every dependency satisfied by stage *k-1* or earlier. [`schedule`] rejects any graph that fails
//! [`crate::graph::Graph::validate`] before dispatching to a strategy.

mod batch_optimized;
mod critical_path_first;
mod greedy;
mod resource_leveling;
mod risk_based;

use crate::error::Result;
use crate::graph::Graph;
use crate::node::Node;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which of the six scheduling strategies to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerStrategy {
    Greedy,
    CriticalPathFirst,
    RiskBasedEarly,
    RiskBasedLate,
    ResourceLeveling,
    BatchOptimized,
}

impl Default for SchedulerStrategy {
    fn default() -> Self {
        SchedulerStrategy::Greedy
    }
}

/// Scheduler configuration. Matches the reference engine's builder-with-defaults idiom: plain
/// struct, [`Default`] impl carrying the documented defaults, chained `with_*` setters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub strategy: SchedulerStrategy,
    pub max_parallel_ops: usize,
    pub max_api_calls_per_sec: u32,
    pub prefer_idempotent: bool,
    pub max_memory_mb: Option<u64>,
    pub max_cpu_cores: Option<u32>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            strategy: SchedulerStrategy::default(),
            max_parallel_ops: 5,
            max_api_calls_per_sec: 100,
            prefer_idempotent: false,
            max_memory_mb: None,
            max_cpu_cores: None,
        }
    }
}

impl ScheduleConfig {
    pub fn with_strategy(mut self, strategy: SchedulerStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_parallel_ops(mut self, max_parallel_ops: usize) -> Self {
        self.max_parallel_ops = max_parallel_ops;
        self
    }

    pub fn with_max_api_calls_per_sec(mut self, max_api_calls_per_sec: u32) -> Self {
        self.max_api_calls_per_sec = max_api_calls_per_sec;
        self
    }

    pub fn with_prefer_idempotent(mut self, prefer_idempotent: bool) -> Self {
        self.prefer_idempotent = prefer_idempotent;
        self
    }

    pub fn with_max_memory_mb(mut self, max_memory_mb: u64) -> Self {
        self.max_memory_mb = Some(max_memory_mb);
        self
    }

    pub fn with_max_cpu_cores(mut self, max_cpu_cores: u32) -> Self {
        self.max_cpu_cores = Some(max_cpu_cores);
        self
    }
}

/// The ordered output of a scheduling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub stages: Vec<Vec<Node>>,
    pub strategy: SchedulerStrategy,
    pub estimated_duration: f64,
    pub max_parallel_ops: usize,
    pub created_at: DateTime<Utc>,
}

fn stage_duration(stage: &[Node]) -> f64 {
    stage.iter().map(|n| n.estimated_duration_secs).fold(0.0_f64, f64::max)
}

fn chunk_by(nodes: Vec<Node>, size: usize) -> Vec<Vec<Node>> {
    if size == 0 {
        return vec![nodes];
    }
    nodes.chunks(size.max(1)).map(|c| c.to_vec()).collect()
}

/// Resolve a node ID into its [`Node`], panicking only if the graph changed out from under the
/// caller between reads — callers always pass IDs this module itself just enumerated.
fn resolve(graph: &Graph, ids: &[String]) -> Vec<Node> {
    ids.iter().filter_map(|id| graph.get_node(id)).collect()
}

/// Produce a [`Schedule`] from a validated, acyclic graph under the chosen strategy. Fails
/// immediately (without computing anything) if the graph does not pass
/// [`crate::graph::Graph::validate`].
pub fn schedule(graph: &Graph, config: &ScheduleConfig) -> Result<Schedule> {
    graph.validate()?;

    let stages = match config.strategy {
        SchedulerStrategy::Greedy => greedy::build(graph, config)?,
        SchedulerStrategy::CriticalPathFirst => critical_path_first::build(graph, config)?,
        SchedulerStrategy::RiskBasedEarly => risk_based::build(graph, config, risk_based::Order::Early)?,
        SchedulerStrategy::RiskBasedLate => risk_based::build(graph, config, risk_based::Order::Late)?,
        SchedulerStrategy::ResourceLeveling => resource_leveling::build(graph, config)?,
        SchedulerStrategy::BatchOptimized => batch_optimized::build(graph, config)?,
    };

    let estimated_duration = stages.iter().map(|s| stage_duration(s)).sum();
    tracing::debug!(
        strategy = ?config.strategy,
        stage_count = stages.len(),
        estimated_duration,
        "scheduler strategy invoked"
    );

    Ok(Schedule {
        stages,
        strategy: config.strategy,
        estimated_duration,
        max_parallel_ops: config.max_parallel_ops,
        created_at: Utc::now(),
    })
}

/// Aggregate statistics over a [`Schedule`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScheduleAnalysis {
    pub total_ops: usize,
    pub stage_count: usize,
    pub avg_stage_size: f64,
    pub min_stage_size: usize,
    pub max_stage_size: usize,
    pub parallelization_factor: f64,
    pub efficiency: f64,
}

/// Total ops, stage count, avg/min/max stage size, parallelization factor (ops / stages), and
/// efficiency (parallelization / `max_parallel_ops`, capped at `1.0`).
pub fn analyze_schedule(schedule: &Schedule) -> ScheduleAnalysis {
    let total_ops: usize = schedule.stages.iter().map(Vec::len).sum();
    let stage_count = schedule.stages.len();
    let sizes: Vec<usize> = schedule.stages.iter().map(Vec::len).collect();
    let avg_stage_size = if stage_count == 0 {
        0.0
    } else {
        total_ops as f64 / stage_count as f64
    };
    let min_stage_size = sizes.iter().copied().min().unwrap_or(0);
    let max_stage_size = sizes.iter().copied().max().unwrap_or(0);
    let parallelization_factor = if stage_count == 0 {
        0.0
    } else {
        total_ops as f64 / stage_count as f64
    };
    let efficiency = if schedule.max_parallel_ops == 0 {
        0.0
    } else {
        (parallelization_factor / schedule.max_parallel_ops as f64).min(1.0)
    };

    ScheduleAnalysis {
        total_ops,
        stage_count,
        avg_stage_size,
        min_stage_size,
        max_stage_size,
        parallelization_factor,
        efficiency,
    }
}

/// A comparison between two schedules, e.g. before/after an [`crate::optimizer`] pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleComparison {
    pub duration_delta: f64,
    pub stage_count_delta: i64,
    pub percentage_change: f64,
    pub recommendation: String,
}

/// Diffs two schedules' durations and stage counts. The percentage change is
/// `100 * |d1 - d2| / max(d1, d2)` (corrected from the reference's arithmetic issue — see
/// `DESIGN.md`).
pub fn compare_schedules(a: &Schedule, b: &Schedule) -> ScheduleComparison {
    let duration_delta = b.estimated_duration - a.estimated_duration;
    let stage_count_delta = b.stages.len() as i64 - a.stages.len() as i64;
    let max_duration = a.estimated_duration.max(b.estimated_duration);
    let percentage_change = if max_duration <= 0.0 {
        0.0
    } else {
        100.0 * duration_delta.abs() / max_duration
    };

    let recommendation = if duration_delta < -1e-9 {
        format!(
            "schedule b is faster by {:.1}% ({:.1}s saved)",
            percentage_change,
            duration_delta.abs()
        )
    } else if duration_delta > 1e-9 {
        format!(
            "schedule a is faster by {:.1}% ({:.1}s saved)",
            percentage_change, duration_delta
        )
    } else {
        "schedules have equivalent estimated duration".to_string()
    };

    ScheduleComparison {
        duration_delta,
        stage_count_delta,
        percentage_change,
        recommendation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Edge;
    use crate::node::Node;

    fn node(id: &str, duration: f64) -> Node {
        Node::new(id, id, "vpc").unwrap().with_duration(duration, duration, duration).unwrap()
    }

    #[test]
    fn schedule_rejects_cyclic_graph() {
        let graph = Graph::new("g");
        graph.add_node(node("a", 1.0)).unwrap();
        graph.add_node(node("b", 1.0)).unwrap();
        graph.add_edge(Edge::new("a", "b").unwrap()).unwrap();
        graph.add_edge(Edge::new("b", "a").unwrap()).unwrap();

        let err = schedule(&graph, &ScheduleConfig::default()).unwrap_err();
        assert!(matches!(err, crate::error::PlanError::Cycle { .. }));
    }

    #[test]
    fn linear_chain_greedy_yields_three_stages() {
        let graph = Graph::new("g");
        for (id, duration) in [("a", 10.0), ("b", 20.0), ("c", 15.0)] {
            graph.add_node(node(id, duration)).unwrap();
        }
        graph.add_edge(Edge::new("b", "a").unwrap()).unwrap();
        graph.add_edge(Edge::new("c", "b").unwrap()).unwrap();

        let result = schedule(&graph, &ScheduleConfig::default()).unwrap();
        assert_eq!(result.stages.len(), 3);
        for stage in &result.stages {
            assert_eq!(stage.len(), 1);
        }
    }

    #[test]
    fn fan_out_duration_is_root_plus_max_child() {
        let graph = Graph::new("g");
        graph.add_node(node("root", 1.0)).unwrap();
        for (id, duration) in [("c1", 1.0), ("c2", 2.0), ("c3", 3.0), ("c4", 4.0), ("c5", 5.0)] {
            graph.add_node(node(id, duration)).unwrap();
            graph.add_edge(Edge::new(id, "root").unwrap()).unwrap();
        }

        let result = schedule(&graph, &ScheduleConfig::default().with_max_parallel_ops(5)).unwrap();
        assert_eq!(result.stages.len(), 2);
        assert_eq!(result.stages[0].len(), 1);
        assert_eq!(result.stages[0][0].id, "root");
        assert_eq!(result.stages[1].len(), 5);
        assert_eq!(result.estimated_duration, 6.0);
    }

    #[test]
    fn schedule_stages_respect_dependencies() {
        let graph = Graph::new("g");
        for id in ["a", "b", "c", "d"] {
            graph.add_node(node(id, 1.0)).unwrap();
        }
        graph.add_edge(Edge::new("b", "a").unwrap()).unwrap();
        graph.add_edge(Edge::new("c", "b").unwrap()).unwrap();
        graph.add_edge(Edge::new("d", "b").unwrap()).unwrap();

        let result = schedule(&graph, &ScheduleConfig::default()).unwrap();
        let stage_of = |id: &str| {
            result
                .stages
                .iter()
                .position(|s| s.iter().any(|n| n.id == id))
                .unwrap()
        };
        assert!(stage_of("a") < stage_of("b"));
        assert!(stage_of("b") < stage_of("c"));
        assert!(stage_of("b") < stage_of("d"));
    }

    #[test]
    fn analysis_reports_parallelization_and_efficiency() {
        let graph = Graph::new("g");
        graph.add_node(node("root", 1.0)).unwrap();
        for id in ["c1", "c2", "c3", "c4", "c5"] {
            graph.add_node(node(id, 1.0)).unwrap();
            graph.add_edge(Edge::new(id, "root").unwrap()).unwrap();
        }
        let result = schedule(&graph, &ScheduleConfig::default().with_max_parallel_ops(5)).unwrap();
        let analysis = analyze_schedule(&result);
        assert_eq!(analysis.total_ops, 6);
        assert_eq!(analysis.stage_count, 2);
        assert_eq!(analysis.parallelization_factor, 3.0);
        assert!(analysis.efficiency <= 1.0);
    }

    #[test]
    fn compare_schedules_percentage_uses_max_denominator() {
        let graph = Graph::new("g");
        graph.add_node(node("a", 10.0)).unwrap();
        let fast = schedule(&graph, &ScheduleConfig::default()).unwrap();

        let mut slow = fast.clone();
        slow.estimated_duration = 20.0;

        let comparison = compare_schedules(&fast, &slow);
        assert_eq!(comparison.percentage_change, 50.0);
    }
}
