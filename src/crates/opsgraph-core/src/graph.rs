//! The in-memory DAG: nodes, directed edges, dual adjacency, and the operations that keep them
//! consistent.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                         Graph                              │
//! │   Arc<RwLock<GraphInner>>                                   │
//! │                                                               │
//! │   nodes:   { id -> Node }                                     │
//! │   forward: { id -> [Edge] }   "id depends on each Edge.to"     │
//! │   reverse: { id -> [Edge] }   "each Edge.from depends on id"    │
//! │                                                                   │
//! │   forward["A"] = [Edge{from:A,to:B}]  <-->  reverse["B"] = [Edge{from:A,to:B}]
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Every public method takes the single read-write lock over the whole graph: a read lock for
//! observers, a write lock for mutators. No method holding the lock ever calls another public
//! (locking) method on the same `Graph` — internal logic operates on `&GraphInner`/`&mut GraphInner`
//! directly via [`Graph::with_read`]/[`Graph::with_write`], which take the lock exactly once per
//! public call.
//!
//! # Example
//!
//! ```rust
//! use opsgraph_core::graph::Graph;
//! use opsgraph_core::node::Node;
//! use opsgraph_core::edge::Edge;
//!
//! let graph = Graph::new("example");
//! graph.add_node(Node::new("a", "Node A", "vpc").unwrap()).unwrap();
//! graph.add_node(Node::new("b", "Node B", "vpc").unwrap()).unwrap();
//! graph.add_edge(Edge::new("a", "b").unwrap()).unwrap();
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.edge_count(), 1);
//! ```

use crate::edge::Edge;
use crate::error::{PlanError, Result};
use crate::node::{is_sensitive_label_key, Node};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Metadata describing a graph as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub extra: HashMap<String, String>,
}

impl GraphMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now(),
            extra: HashMap::new(),
        }
    }
}

/// The lock-free graph state. Every field is directly accessible to sibling modules in this crate
/// (algorithms, rules, analyzer, scheduler, optimizer, partitioner) so they can operate on a
/// `&GraphInner` obtained from [`Graph::with_read`]/[`Graph::with_write`] without taking the lock a
/// second time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphInner {
    pub nodes: HashMap<String, Node>,
    pub forward: HashMap<String, Vec<Edge>>,
    pub reverse: HashMap<String, Vec<Edge>>,
    pub metadata: GraphMetadata,
    pub critical_path: Vec<String>,
    pub total_duration: f64,
    pub max_level: u32,
}

impl GraphInner {
    fn new(metadata: GraphMetadata) -> Self {
        Self {
            nodes: HashMap::new(),
            forward: HashMap::new(),
            reverse: HashMap::new(),
            metadata,
            critical_path: Vec::new(),
            total_duration: 0.0,
            max_level: 0,
        }
    }
}

/// A directed acyclic (once validated) graph of planned operations, shared safely across threads.
#[derive(Clone)]
pub struct Graph {
    inner: Arc<RwLock<GraphInner>>,
}

impl Graph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(GraphInner::new(GraphMetadata::new(name)))),
        }
    }

    pub fn with_metadata(metadata: GraphMetadata) -> Self {
        Self {
            inner: Arc::new(RwLock::new(GraphInner::new(metadata))),
        }
    }

    /// Take the read lock once and hand the closure a lock-free view. Used by every observer method
    /// in this crate; never call this from within a closure already holding the lock.
    pub(crate) fn with_read<R>(&self, f: impl FnOnce(&GraphInner) -> R) -> R {
        let guard = self.inner.read().expect("graph lock poisoned");
        f(&guard)
    }

    /// Take the write lock once and hand the closure a lock-free mutable view.
    pub(crate) fn with_write<R>(&self, f: impl FnOnce(&mut GraphInner) -> R) -> R {
        let mut guard = self.inner.write().expect("graph lock poisoned");
        f(&mut guard)
    }

    pub fn add_node(&self, node: Node) -> Result<()> {
        self.with_write(|inner| {
            if inner.nodes.contains_key(&node.id) {
                return Err(PlanError::invalid_input(format!(
                    "node '{}' already exists",
                    node.id
                )));
            }
            let id = node.id.clone();
            inner.nodes.insert(id.clone(), node);
            inner.forward.entry(id.clone()).or_default();
            inner.reverse.entry(id).or_default();
            Ok(())
        })
    }

    pub fn remove_node(&self, id: &str) -> Result<()> {
        self.with_write(|inner| {
            if !inner.nodes.contains_key(id) {
                return Err(PlanError::not_found(format!("node '{id}' not found")));
            }
            inner.nodes.remove(id);

            let forward_edges = inner.forward.remove(id).unwrap_or_default();
            for edge in &forward_edges {
                if let Some(reverse) = inner.reverse.get_mut(&edge.to) {
                    reverse.retain(|e| e.from != id);
                }
            }

            let reverse_edges = inner.reverse.remove(id).unwrap_or_default();
            for edge in &reverse_edges {
                if let Some(forward) = inner.forward.get_mut(&edge.from) {
                    forward.retain(|e| e.to != id);
                }
                if let Some(node) = inner.nodes.get_mut(&edge.from) {
                    node.dependencies.retain(|dep| dep != id);
                }
            }
            Ok(())
        })
    }

    /// Defaults are applied by [`Edge::new`]; this does not itself reject duplicate `(from, to)`
    /// pairs — callers wanting deduplication check [`Graph::get_edges`] first.
    pub fn add_edge(&self, edge: Edge) -> Result<()> {
        self.with_write(|inner| {
            if !inner.nodes.contains_key(&edge.from) {
                return Err(PlanError::invalid_input(format!(
                    "edge source '{}' is not a node in the graph",
                    edge.from
                )));
            }
            if !inner.nodes.contains_key(&edge.to) {
                return Err(PlanError::invalid_input(format!(
                    "edge target '{}' is not a node in the graph",
                    edge.to
                )));
            }
            inner.forward.entry(edge.from.clone()).or_default().push(edge.clone());
            inner.reverse.entry(edge.to.clone()).or_default().push(edge.clone());
            if let Some(node) = inner.nodes.get_mut(&edge.from) {
                node.dependencies.push(edge.to.clone());
            }
            Ok(())
        })
    }

    pub fn remove_edge(&self, from: &str, to: &str) -> Result<()> {
        self.with_write(|inner| {
            let forward = inner.forward.get_mut(from);
            let removed = match forward {
                Some(edges) => {
                    let before = edges.len();
                    edges.retain(|e| e.to != to);
                    before != edges.len()
                }
                None => false,
            };
            if !removed {
                return Err(PlanError::not_found(format!("no edge '{from}' -> '{to}'")));
            }
            if let Some(edges) = inner.reverse.get_mut(to) {
                edges.retain(|e| e.from != from);
            }
            if let Some(node) = inner.nodes.get_mut(from) {
                node.dependencies.retain(|dep| dep != to);
            }
            Ok(())
        })
    }

    pub fn get_node(&self, id: &str) -> Option<Node> {
        self.with_read(|inner| inner.nodes.get(id).cloned())
    }

    pub fn get_edges(&self, from: &str) -> Vec<Edge> {
        self.with_read(|inner| inner.forward.get(from).cloned().unwrap_or_default())
    }

    pub fn get_incoming_edges(&self, to: &str) -> Vec<Edge> {
        self.with_read(|inner| inner.reverse.get(to).cloned().unwrap_or_default())
    }

    /// IDs that `id` depends on (its forward-edge targets).
    pub fn get_dependencies(&self, id: &str) -> Vec<String> {
        self.with_read(|inner| {
            inner
                .forward
                .get(id)
                .map(|edges| edges.iter().map(|e| e.to.clone()).collect())
                .unwrap_or_default()
        })
    }

    /// IDs that depend on `id` (its reverse-edge sources).
    pub fn get_dependents(&self, id: &str) -> Vec<String> {
        self.with_read(|inner| {
            inner
                .reverse
                .get(id)
                .map(|edges| edges.iter().map(|e| e.from.clone()).collect())
                .unwrap_or_default()
        })
    }

    pub fn node_count(&self) -> usize {
        self.with_read(|inner| inner.nodes.len())
    }

    pub fn edge_count(&self) -> usize {
        self.with_read(|inner| inner.forward.values().map(Vec::len).sum())
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.with_read(|inner| inner.nodes.keys().cloned().collect())
    }

    /// Returns `(true, cycle_path)` if the graph has a cycle; the path contains each node on the
    /// cycle once, starting and ending at the re-entry node.
    pub fn has_cycle(&self) -> (bool, Vec<String>) {
        self.with_read(has_cycle_internal)
    }

    /// Deep copy: nodes (labels and dependency slice copied), edges (including the embedded
    /// condition tree, which is ordinary data here so it copies structurally), and the computed
    /// scalar/slice fields. Mutating the clone never affects the source.
    pub fn clone_deep(&self) -> Graph {
        let cloned_inner = self.with_read(|inner| inner.clone());
        Graph {
            inner: Arc::new(RwLock::new(cloned_inner)),
        }
    }

    /// Runs `has_cycle`, then confirms every adjacency key references an existing node, then checks
    /// forward/reverse symmetry. Reports the first inconsistency found.
    pub fn validate(&self) -> Result<()> {
        self.with_read(|inner| {
            let (has_cycle, path) = has_cycle_internal(inner);
            if has_cycle {
                return Err(PlanError::cycle(path));
            }

            for (id, edges) in &inner.forward {
                if !inner.nodes.contains_key(id) {
                    return Err(PlanError::inconsistent_graph(format!(
                        "forward adjacency key '{id}' is not a node"
                    )));
                }
                for edge in edges {
                    if !inner.nodes.contains_key(&edge.to) {
                        return Err(PlanError::inconsistent_graph(format!(
                            "edge '{}' -> '{}' has a dangling target",
                            edge.from, edge.to
                        )));
                    }
                }
            }

            for (from, edges) in &inner.forward {
                for edge in edges {
                    let mirrored = inner
                        .reverse
                        .get(&edge.to)
                        .map(|reverse_edges| reverse_edges.iter().any(|e| &e.from == from))
                        .unwrap_or(false);
                    if !mirrored {
                        return Err(PlanError::inconsistent_graph(format!(
                            "edge '{from}' -> '{}' has no mirrored reverse entry",
                            edge.to
                        )));
                    }
                }
            }

            Ok(())
        })
    }

    /// Pretty-printed JSON of a sanitized view: labels whose key (case-insensitively) contains
    /// `password`, `api_key`, `apikey`, `token`, `secret`, `credential`, or `auth` are rewritten to
    /// the literal string `[REDACTED]`. All other fields serialize directly.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        self.with_read(|inner| {
            let mut value = serde_json::to_value(inner)?;
            if let Some(nodes) = value.get_mut("nodes").and_then(|n| n.as_object_mut()) {
                for node_value in nodes.values_mut() {
                    if let Some(labels) = node_value.get_mut("labels").and_then(|l| l.as_object_mut()) {
                        for (key, label_value) in labels.iter_mut() {
                            if is_sensitive_label_key(key) {
                                *label_value = serde_json::Value::String("[REDACTED]".to_string());
                            }
                        }
                    }
                }
            }
            Ok(value)
        })
    }

    pub fn get_root_nodes(&self) -> Vec<String> {
        self.with_read(|inner| {
            inner
                .nodes
                .keys()
                .filter(|id| inner.reverse.get(*id).map(|e| e.is_empty()).unwrap_or(true))
                .cloned()
                .collect()
        })
    }

    pub fn get_leaf_nodes(&self) -> Vec<String> {
        self.with_read(|inner| {
            inner
                .nodes
                .keys()
                .filter(|id| inner.forward.get(*id).map(|e| e.is_empty()).unwrap_or(true))
                .cloned()
                .collect()
        })
    }

    pub fn get_nodes_by_level(&self, level: u32) -> Vec<String> {
        self.with_read(|inner| {
            inner
                .nodes
                .values()
                .filter(|n| n.level == level)
                .map(|n| n.id.clone())
                .collect()
        })
    }

    pub fn get_nodes_by_type(&self, resource_kind: &str) -> Vec<String> {
        self.with_read(|inner| {
            inner
                .nodes
                .values()
                .filter(|n| n.resource_kind == resource_kind)
                .map(|n| n.id.clone())
                .collect()
        })
    }

    /// DFS reachability over forward edges.
    pub fn is_reachable(&self, from: &str, to: &str) -> bool {
        self.with_read(|inner| is_reachable_internal(inner, from, to))
    }

    /// BFS shortest path over forward edges; `None` if unreachable.
    pub fn get_path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        self.with_read(|inner| get_path_internal(inner, from, to))
    }

    /// Resets every node's level to 0, takes a topological order, then assigns
    /// `level(n) = 1 + max(level(d) for d in dependencies(n))`, sources at 0. Updates `max_level`.
    pub fn compute_levels(&self) -> Result<()> {
        self.with_write(compute_levels_internal)
    }

    pub fn metadata(&self) -> GraphMetadata {
        self.with_read(|inner| inner.metadata.clone())
    }

    pub fn critical_path(&self) -> Vec<String> {
        self.with_read(|inner| inner.critical_path.clone())
    }

    pub fn total_duration(&self) -> f64 {
        self.with_read(|inner| inner.total_duration)
    }

    pub fn max_level(&self) -> u32 {
        self.with_read(|inner| inner.max_level)
    }
}

/// Assumes lock held. DFS cycle detection; reconstructs the cycle by walking parent pointers from
/// the re-entry node.
pub(crate) fn has_cycle_internal(inner: &GraphInner) -> (bool, Vec<String>) {
    #[derive(PartialEq, Eq, Clone, Copy)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    let mut marks: HashMap<String, Mark> = inner.nodes.keys().map(|id| (id.clone(), Mark::Unvisited)).collect();
    let mut parent: HashMap<String, String> = HashMap::new();

    let mut ids: Vec<String> = inner.nodes.keys().cloned().collect();
    ids.sort();

    for start in ids {
        if marks[&start] != Mark::Unvisited {
            continue;
        }
        let mut stack = vec![(start, false)];
        while let Some((id, processed)) = stack.pop() {
            if processed {
                marks.insert(id, Mark::Done);
                continue;
            }
            if marks.get(&id).copied() == Some(Mark::InProgress) {
                continue;
            }
            marks.insert(id.clone(), Mark::InProgress);
            stack.push((id.clone(), true));

            if let Some(edges) = inner.forward.get(&id) {
                let mut targets: Vec<&Edge> = edges.iter().collect();
                targets.sort_by(|a, b| a.to.cmp(&b.to));
                for edge in targets {
                    match marks.get(&edge.to).copied().unwrap_or(Mark::Unvisited) {
                        Mark::Unvisited => {
                            parent.insert(edge.to.clone(), id.clone());
                            stack.push((edge.to.clone(), false));
                        }
                        Mark::InProgress => {
                            let mut path = vec![edge.to.clone()];
                            let mut cur = id.clone();
                            while cur != edge.to {
                                path.push(cur.clone());
                                cur = match parent.get(&cur) {
                                    Some(p) => p.clone(),
                                    None => break,
                                };
                            }
                            path.push(edge.to.clone());
                            path.reverse();
                            return (true, path);
                        }
                        Mark::Done => {}
                    }
                }
            }
        }
    }

    (false, Vec::new())
}

pub(crate) fn is_reachable_internal(inner: &GraphInner, from: &str, to: &str) -> bool {
    if from == to {
        return true;
    }
    let mut visited = std::collections::HashSet::new();
    let mut stack = vec![from.to_string()];
    while let Some(id) = stack.pop() {
        if id == to {
            return true;
        }
        if !visited.insert(id.clone()) {
            continue;
        }
        if let Some(edges) = inner.forward.get(&id) {
            for edge in edges {
                if !visited.contains(&edge.to) {
                    stack.push(edge.to.clone());
                }
            }
        }
    }
    false
}

pub(crate) fn get_path_internal(inner: &GraphInner, from: &str, to: &str) -> Option<Vec<String>> {
    if from == to {
        return Some(vec![from.to_string()]);
    }
    let mut visited = std::collections::HashSet::new();
    let mut queue = std::collections::VecDeque::new();
    let mut parent: HashMap<String, String> = HashMap::new();
    queue.push_back(from.to_string());
    visited.insert(from.to_string());

    while let Some(id) = queue.pop_front() {
        if let Some(edges) = inner.forward.get(&id) {
            let mut targets: Vec<&Edge> = edges.iter().collect();
            targets.sort_by(|a, b| a.to.cmp(&b.to));
            for edge in targets {
                if !visited.insert(edge.to.clone()) {
                    continue;
                }
                parent.insert(edge.to.clone(), id.clone());
                if edge.to == to {
                    let mut path = vec![to.to_string()];
                    let mut cur = id.clone();
                    loop {
                        path.push(cur.clone());
                        if cur == from {
                            break;
                        }
                        cur = parent.get(&cur).expect("parent recorded for every visited node").clone();
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(edge.to.clone());
            }
        }
    }
    None
}

/// Assumes lock held (called from [`Graph::compute_levels`], which takes the write lock exactly
/// once).
pub(crate) fn compute_levels_internal(inner: &mut GraphInner) -> Result<()> {
    for node in inner.nodes.values_mut() {
        node.level = 0;
    }

    let order = crate::algorithms::topo::topological_sort_internal(inner)?;
    let mut max_level = 0u32;
    for id in &order {
        let deps = inner.forward.get(id).cloned().unwrap_or_default();
        let level = deps
            .iter()
            .map(|e| inner.nodes.get(&e.to).map(|n| n.level).unwrap_or(0))
            .max()
            .map(|m| m + 1)
            .unwrap_or(0);
        if let Some(node) = inner.nodes.get_mut(id) {
            node.level = level;
        }
        max_level = max_level.max(level);
    }
    inner.max_level = max_level;
    Ok(())
}
