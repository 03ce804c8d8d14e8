//! BatchOptimized strategy: within a level, group by resource kind, then by priority.

use super::{chunk_by, resolve, ScheduleConfig};
use crate::error::Result;
use crate::graph::Graph;
use crate::node::Node;

pub fn build(graph: &Graph, config: &ScheduleConfig) -> Result<Vec<Vec<Node>>> {
    let groups = crate::algorithms::compute_parallel_groups(graph)?;
    let mut stages = Vec::new();
    for level_ids in groups {
        let mut nodes = resolve(graph, &level_ids);
        nodes.sort_by(|a, b| {
            a.resource_kind
                .cmp(&b.resource_kind)
                .then_with(|| b.priority.cmp(&a.priority))
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut batch_start = 0;
        while batch_start < nodes.len() {
            let kind = nodes[batch_start].resource_kind.clone();
            let mut batch_end = batch_start;
            while batch_end < nodes.len() && nodes[batch_end].resource_kind == kind {
                batch_end += 1;
            }
            let batch: Vec<Node> = nodes[batch_start..batch_end].to_vec();
            stages.extend(chunk_by(batch, config.max_parallel_ops));
            batch_start = batch_end;
        }
    }
    Ok(stages)
}
