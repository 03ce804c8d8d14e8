//! What-if scenario evaluation: apply a list of edits to a cloned graph and diff the results.

use super::{analyze, AnalysisResult};
use crate::edge::Edge;
use crate::error::Result;
use crate::graph::Graph;
use crate::node::Node;
use serde::{Deserialize, Serialize};

/// One hypothetical mutation to try against a cloned graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GraphEdit {
    AddNode(Node),
    RemoveNode(String),
    AddEdge(Edge),
    RemoveEdge { from: String, to: String },
}

/// The outcome of applying a batch of [`GraphEdit`]s to a graph and re-analyzing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub duration_delta: f64,
    pub stage_count_delta: i64,
    pub parallelism_delta: f64,
    pub risk_delta: f64,
    pub new_critical_path: Vec<String>,
}

/// Average parallel-group size (`total_nodes / number of levels`), the same "how many ops could run
/// concurrently on average" notion the scheduler's `parallelization_factor` captures.
fn parallelism_factor(analysis: &AnalysisResult) -> f64 {
    if analysis.parallel_groups.is_empty() {
        0.0
    } else {
        analysis.total_nodes as f64 / analysis.parallel_groups.len() as f64
    }
}

pub fn apply(graph: &Graph, edits: &[GraphEdit]) -> Result<WhatIfResult> {
    let baseline = analyze(graph)?;
    let scenario = graph.clone_deep();

    let mut errors = Vec::new();
    for edit in edits {
        let outcome = match edit {
            GraphEdit::AddNode(node) => scenario.add_node(node.clone()),
            GraphEdit::RemoveNode(id) => scenario.remove_node(id),
            GraphEdit::AddEdge(edge) => scenario.add_edge(edge.clone()),
            GraphEdit::RemoveEdge { from, to } => scenario.remove_edge(from, to),
        };
        if let Err(err) = outcome {
            errors.push(err.to_string());
        }
    }

    if !errors.is_empty() {
        return Ok(WhatIfResult {
            valid: false,
            errors,
            duration_delta: 0.0,
            stage_count_delta: 0,
            parallelism_delta: 0.0,
            risk_delta: 0.0,
            new_critical_path: Vec::new(),
        });
    }

    let scenario_analysis: AnalysisResult = match analyze(&scenario) {
        Ok(a) => a,
        Err(err) => {
            return Ok(WhatIfResult {
                valid: false,
                errors: vec![err.to_string()],
                duration_delta: 0.0,
                stage_count_delta: 0,
                parallelism_delta: 0.0,
                risk_delta: 0.0,
                new_critical_path: Vec::new(),
            })
        }
    };

    Ok(WhatIfResult {
        valid: true,
        errors: Vec::new(),
        duration_delta: scenario_analysis.critical_path.project_duration
            - baseline.critical_path.project_duration,
        stage_count_delta: scenario_analysis.parallel_groups.len() as i64
            - baseline.parallel_groups.len() as i64,
        parallelism_delta: parallelism_factor(&scenario_analysis) - parallelism_factor(&baseline),
        risk_delta: scenario_analysis.risk.mean_score - baseline.risk.mean_score,
        new_critical_path: scenario_analysis.critical_path.path,
    })
}
