//! Per-node and whole-graph risk scoring.

use crate::algorithms::CriticalPathResult;
use crate::error::Result;
use crate::graph::Graph;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const DESTRUCTIVE_BONUS: f64 = 20.0;
const CRITICAL_PATH_BONUS: f64 = 10.0;

/// A single node's computed risk score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScore {
    pub node_id: String,
    pub score: f64,
    pub destructive: bool,
    pub on_critical_path: bool,
}

/// Graph-wide risk band, derived from the mean of all node scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskBand {
    fn from_mean(mean: f64) -> Self {
        if mean >= 80.0 {
            RiskBand::Critical
        } else if mean >= 60.0 {
            RiskBand::High
        } else if mean >= 40.0 {
            RiskBand::Medium
        } else {
            RiskBand::Low
        }
    }
}

/// Whole-graph risk summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub mean_score: f64,
    pub band: RiskBand,
    /// All node scores, sorted descending.
    pub high_risk: Vec<RiskScore>,
    /// Subset of `high_risk` that also sits on the critical path.
    pub critical_risk: Vec<RiskScore>,
}

pub fn score(graph: &Graph, critical_path: &CriticalPathResult) -> Result<RiskReport> {
    let critical_ids: HashSet<&str> = critical_path.path.iter().map(String::as_str).collect();

    let mut scores: Vec<RiskScore> = graph
        .node_ids()
        .into_iter()
        .filter_map(|id| graph.get_node(&id))
        .map(|node| {
            let on_critical_path = critical_ids.contains(node.id.as_str());
            let mut value = node.risk_level.base_score();
            if node.destructive {
                value += DESTRUCTIVE_BONUS;
            }
            if on_critical_path {
                value += CRITICAL_PATH_BONUS;
            }
            RiskScore {
                node_id: node.id,
                score: value,
                destructive: node.destructive,
                on_critical_path,
            }
        })
        .collect();

    scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let mean_score = if scores.is_empty() {
        0.0
    } else {
        scores.iter().map(|s| s.score).sum::<f64>() / scores.len() as f64
    };
    let band = RiskBand::from_mean(mean_score);
    let critical_risk: Vec<RiskScore> = scores.iter().filter(|s| s.on_critical_path).cloned().collect();

    Ok(RiskReport { mean_score, band, high_risk: scores, critical_risk })
}
