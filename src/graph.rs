//! Dependency graph module.
//!
//! Provides the `DependencyGraph` type, which records which computed stats
//! depend on which keys. Edges point from a dependency to its dependent, so
//! the outgoing neighbours of a key are exactly the stats to refresh when it
//! changes. The graph is kept acyclic: a dependency set that would close a
//! cycle is rejected and the previous set restored.

use crate::error::StatError;
use crate::stat_id::StatId;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// A directed acyclic graph of computed-stat dependencies.
///
/// # Examples
///
/// ```rust
/// use zzattr::graph::DependencyGraph;
/// use zzattr::StatId;
///
/// let mut graph = DependencyGraph::new();
/// let str_id = StatId::from_str("STR");
/// let atk_id = StatId::from_str("ATK");
///
/// // ATK depends on STR
/// graph.set_dependencies(&atk_id, [str_id.clone()]).unwrap();
/// assert_eq!(graph.dependents_of(&str_id), vec![atk_id.clone()]);
///
/// // STR depending on ATK would close a cycle
/// assert!(graph.set_dependencies(&str_id, [atk_id]).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<StatId, ()>,
    node_map: HashMap<StatId, NodeIndex>,
}

impl DependencyGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph if it doesn't exist and return its index.
    pub fn add_node(&mut self, stat_id: StatId) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&stat_id) {
            idx
        } else {
            let idx = self.graph.add_node(stat_id.clone());
            self.node_map.insert(stat_id, idx);
            idx
        }
    }

    /// Check if a node exists in the graph.
    pub fn contains_node(&self, stat_id: &StatId) -> bool {
        self.node_map.contains_key(stat_id)
    }

    /// Replace the dependency set of `stat`.
    ///
    /// If the new edges would introduce a cycle the previous dependency set
    /// is restored and `StatError::Cycle` is returned.
    ///
    /// # Arguments
    ///
    /// * `stat` - The dependent stat
    /// * `dependencies` - Every key `stat` reads
    pub fn set_dependencies(
        &mut self,
        stat: &StatId,
        dependencies: impl IntoIterator<Item = StatId>,
    ) -> Result<(), StatError> {
        let previous = self.dependencies_of(stat);
        self.clear_dependencies(stat);

        let to_idx = self.add_node(stat.clone());
        for dependency in dependencies {
            let from_idx = self.add_node(dependency);
            if self.graph.find_edge(from_idx, to_idx).is_none() {
                self.graph.add_edge(from_idx, to_idx, ());
            }
        }

        if let Err(cycle) = self.detect_cycles() {
            self.clear_dependencies(stat);
            for dependency in previous {
                let from_idx = self.add_node(dependency);
                self.graph.add_edge(from_idx, to_idx, ());
            }
            return Err(cycle);
        }

        Ok(())
    }

    /// Remove every dependency edge of `stat`. The node itself stays.
    pub fn clear_dependencies(&mut self, stat: &StatId) {
        let Some(&idx) = self.node_map.get(stat) else {
            return;
        };
        // Edge removal shifts indices, so always remove the first remaining one.
        loop {
            let next = self
                .graph
                .edges_directed(idx, Direction::Incoming)
                .next()
                .map(|edge| edge.id());
            let Some(edge) = next else {
                break;
            };
            self.graph.remove_edge(edge);
        }
    }

    /// Keys that `stat` depends on.
    pub fn dependencies_of(&self, stat: &StatId) -> Vec<StatId> {
        self.neighbors(stat, Direction::Incoming)
    }

    /// Stats that depend on `stat`.
    pub fn dependents_of(&self, stat: &StatId) -> Vec<StatId> {
        self.neighbors(stat, Direction::Outgoing)
    }

    fn neighbors(&self, stat: &StatId, direction: Direction) -> Vec<StatId> {
        match self.node_map.get(stat) {
            Some(&idx) => self
                .graph
                .neighbors_directed(idx, direction)
                .map(|neighbor| self.graph[neighbor].clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Detect cycles in the graph.
    ///
    /// Uses depth-first search; on failure the returned path starts and ends
    /// with the same stat.
    pub fn detect_cycles(&self) -> Result<(), StatError> {
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();

        for node_idx in self.graph.node_indices() {
            if !visited.contains(&node_idx) {
                let mut cycle_path = Vec::new();
                if let Some(cycle) =
                    self.dfs_cycle_detect(node_idx, &mut visited, &mut rec_stack, &mut cycle_path)
                {
                    return Err(cycle);
                }
            }
        }

        Ok(())
    }

    fn dfs_cycle_detect(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        rec_stack: &mut HashSet<NodeIndex>,
        cycle_path: &mut Vec<StatId>,
    ) -> Option<StatError> {
        visited.insert(node);
        rec_stack.insert(node);
        cycle_path.push(self.graph[node].clone());

        for neighbor in self.graph.neighbors_directed(node, Direction::Outgoing) {
            if !visited.contains(&neighbor) {
                if let Some(cycle) = self.dfs_cycle_detect(neighbor, visited, rec_stack, cycle_path)
                {
                    return Some(cycle);
                }
            } else if rec_stack.contains(&neighbor) {
                let neighbor_stat = self.graph[neighbor].clone();
                let start = cycle_path
                    .iter()
                    .position(|stat| stat == &neighbor_stat)
                    .unwrap_or(0);
                let mut path = cycle_path[start..].to_vec();
                path.push(neighbor_stat);
                return Some(StatError::Cycle { path });
            }
        }

        rec_stack.remove(&node);
        cycle_path.pop();
        None
    }

    /// Every node, dependencies before dependents.
    pub fn topological_sort(&self) -> Result<Vec<StatId>, StatError> {
        self.detect_cycles()?;

        toposort(&self.graph, None)
            .map(|indices| {
                indices
                    .into_iter()
                    .map(|idx| self.graph[idx].clone())
                    .collect()
            })
            .map_err(|cycle| StatError::Cycle {
                path: vec![self.graph[cycle.node_id()].clone()],
            })
    }

    /// Get all nodes in the graph.
    pub fn nodes(&self) -> Vec<StatId> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].clone())
            .collect()
    }
}
