//! Graph-level analysis: bottleneck detection, risk scoring, what-if scenarios, and suggestions.
//!
//! [`analyze`] is the entry point. It validates the graph (refusing with [`crate::error::PlanError::Cycle`]
//! if one is present), computes levels, the critical path, and parallel groups once, then derives
//! bottlenecks, risk scores, and suggestion strings from those results without re-running the
//! underlying algorithms.

mod bottleneck;
mod risk;
mod whatif;

pub use bottleneck::Bottleneck;
pub use risk::{RiskBand, RiskReport, RiskScore};
pub use whatif::{GraphEdit, WhatIfResult};

use crate::algorithms::{self, CriticalPathResult};
use crate::error::Result;
use crate::graph::Graph;

/// The full output of [`analyze`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisResult {
    pub total_nodes: usize,
    pub max_level: u32,
    pub critical_path: CriticalPathResult,
    pub parallel_groups: Vec<Vec<String>>,
    pub bottlenecks: Vec<Bottleneck>,
    pub risk: RiskReport,
    pub suggestions: Vec<String>,
}

pub fn analyze(graph: &Graph) -> Result<AnalysisResult> {
    graph.validate()?;

    let critical_path = algorithms::critical_path_method(graph)?;
    let parallel_groups = algorithms::compute_parallel_groups(graph)?;
    let total_nodes = graph.node_count();
    let max_level = parallel_groups.len().saturating_sub(1) as u32;

    let bottlenecks = bottleneck::detect(graph, &critical_path)?;
    let risk = risk::score(graph, &critical_path)?;
    let suggestions = suggest(&bottlenecks, &risk, &critical_path);

    Ok(AnalysisResult {
        total_nodes,
        max_level,
        critical_path,
        parallel_groups,
        bottlenecks,
        risk,
        suggestions,
    })
}

fn suggest(bottlenecks: &[Bottleneck], risk: &RiskReport, critical_path: &CriticalPathResult) -> Vec<String> {
    let mut suggestions = Vec::new();
    if !bottlenecks.is_empty() {
        suggestions.push(format!(
            "{} bottleneck operation(s) found; consider splitting or parallelizing them",
            bottlenecks.len()
        ));
    }
    if matches!(risk.band, RiskBand::High | RiskBand::Critical) {
        suggestions.push(format!(
            "overall risk band is {:?}; review high-risk operations before executing",
            risk.band
        ));
    }
    if critical_path.project_duration > 300.0 {
        suggestions.push(format!(
            "critical path is {:.0}s; look for opportunities to shorten or parallelize it",
            critical_path.project_duration
        ));
    }
    if suggestions.is_empty() {
        suggestions.push("no significant issues detected".to_string());
    }
    suggestions
}
