//! Strongly-connected components via Tarjan's algorithm.

use crate::graph::{Graph, GraphInner};
use std::collections::HashMap;

struct TarjanState {
    index_counter: usize,
    index: HashMap<String, usize>,
    lowlink: HashMap<String, usize>,
    on_stack: HashMap<String, bool>,
    stack: Vec<String>,
    components: Vec<Vec<String>>,
}

fn strongconnect(inner: &GraphInner, state: &mut TarjanState, id: &str) {
    state.index.insert(id.to_string(), state.index_counter);
    state.lowlink.insert(id.to_string(), state.index_counter);
    state.index_counter += 1;
    state.stack.push(id.to_string());
    state.on_stack.insert(id.to_string(), true);

    if let Some(edges) = inner.forward.get(id) {
        let mut targets: Vec<&str> = edges.iter().map(|e| e.to.as_str()).collect();
        targets.sort();
        for target in targets {
            if !state.index.contains_key(target) {
                strongconnect(inner, state, target);
                let target_low = state.lowlink[target];
                let entry = state.lowlink.get_mut(id).unwrap();
                *entry = (*entry).min(target_low);
            } else if *state.on_stack.get(target).unwrap_or(&false) {
                let target_index = state.index[target];
                let entry = state.lowlink.get_mut(id).unwrap();
                *entry = (*entry).min(target_index);
            }
        }
    }

    if state.lowlink[id] == state.index[id] {
        let mut component = Vec::new();
        loop {
            let member = state.stack.pop().expect("component root must be on stack");
            state.on_stack.insert(member.clone(), false);
            let is_root = member == id;
            component.push(member);
            if is_root {
                break;
            }
        }
        state.components.push(component);
    }
}

/// Every strongly-connected component of the graph, each popped when a Tarjan root is found. A DAG
/// yields one singleton component per node.
pub fn strongly_connected_components(graph: &Graph) -> Vec<Vec<String>> {
    graph.with_read(|inner| {
        let mut state = TarjanState {
            index_counter: 0,
            index: HashMap::new(),
            lowlink: HashMap::new(),
            on_stack: HashMap::new(),
            stack: Vec::new(),
            components: Vec::new(),
        };

        let mut ids: Vec<String> = inner.nodes.keys().cloned().collect();
        ids.sort();
        for id in ids {
            if !state.index.contains_key(&id) {
                strongconnect(inner, &mut state, &id);
            }
        }
        state.components
    })
}
