//! Graph algorithms: topological ordering, the critical path method, strongly-connected
//! components, transitive closure/reduction, and level-based parallel grouping.
//!
//! Every function here either takes a read lock once (observers) or a write lock once (the handful
//! that cache results onto the graph, like [`critical_path::critical_path_method`] and
//! [`levels::compute_parallel_groups`]) — none of them re-enter the graph's public API while holding
//! that lock.

pub mod closure;
pub mod critical_path;
pub mod levels;
pub mod paths;
pub mod scc;
pub mod topo;

pub use closure::{transitive_closure, transitive_reduction};
pub use critical_path::{critical_path_method, longest_path, CriticalPathResult};
pub use levels::{compute_parallel_groups, get_critical_nodes};
pub use paths::all_paths;
pub use scc::strongly_connected_components;
pub use topo::{topological_sort, topological_sort_dfs};
