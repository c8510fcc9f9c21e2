//! Module dependency graph.
//!
//! Nodes are project modules and edges point from a consumer to the producer it depends
//! on. The processing order is the depth-first post-order from the root modules, which
//! visits producers before their consumers whenever the graph allows it.

use log::debug;
use petgraph::{
    Direction,
    algo::tarjan_scc,
    graph::{DiGraph, NodeIndex},
    visit::DfsPostOrder,
};
use rustc_hash::{FxHashMap, FxHashSet};

/// Unique identifier for a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(u32);

impl ModuleId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Processing order computed from the graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingOrder {
    /// Post-order of the modules reachable from the roots
    pub ordered: Vec<ModuleId>,
    /// Modules outside the roots' closure, in load order
    pub detached: Vec<ModuleId>,
}

impl ProcessingOrder {
    /// Every module, graph-ordered ones first
    pub fn iter(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.ordered.iter().chain(&self.detached).copied()
    }

    pub fn len(&self) -> usize {
        self.ordered.len() + self.detached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct ModuleGraph {
    graph: DiGraph<ModuleId, ()>,
    node_indices: FxHashMap<ModuleId, NodeIndex>,
    next_module_id: u32,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module; ids are handed out in insertion order
    pub fn add_module(&mut self) -> ModuleId {
        let id = ModuleId::new(self.next_module_id);
        self.next_module_id += 1;
        let node = self.graph.add_node(id);
        self.node_indices.insert(id, node);
        id
    }

    pub fn module_count(&self) -> usize {
        self.node_indices.len()
    }

    /// Record that `consumer` depends on `producer`
    pub fn add_dependency(&mut self, consumer: ModuleId, producer: ModuleId) {
        if consumer == producer {
            return;
        }
        if let (Some(&from), Some(&to)) = (
            self.node_indices.get(&consumer),
            self.node_indices.get(&producer),
        ) && !self.graph.contains_edge(from, to)
        {
            self.graph.add_edge(from, to, ());
        }
    }

    /// Modules nothing else depends on, in id order
    pub fn roots(&self) -> Vec<ModuleId> {
        let mut roots: Vec<ModuleId> = self
            .graph
            .node_indices()
            .filter(|&node| {
                self.graph
                    .neighbors_directed(node, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|node| self.graph[node])
            .collect();
        roots.sort_unstable();
        roots
    }

    /// Depth-first post-order from `roots`; unreachable modules follow in id order
    pub fn processing_order(&self, roots: &[ModuleId]) -> ProcessingOrder {
        let mut ordered = Vec::with_capacity(self.module_count());
        let mut seen = FxHashSet::default();
        let mut dfs = DfsPostOrder::empty(&self.graph);

        for root in roots {
            let Some(&node) = self.node_indices.get(root) else {
                continue;
            };
            if seen.contains(root) {
                continue;
            }
            dfs.move_to(node);
            while let Some(visited) = dfs.next(&self.graph) {
                let id = self.graph[visited];
                if seen.insert(id) {
                    ordered.push(id);
                }
            }
        }

        let mut detached: Vec<ModuleId> = self
            .node_indices
            .keys()
            .filter(|id| !seen.contains(*id))
            .copied()
            .collect();
        detached.sort_unstable();

        debug!(
            "Processing order: {} ordered, {} detached",
            ordered.len(),
            detached.len()
        );
        ProcessingOrder { ordered, detached }
    }

    /// Strongly connected components with more than one module, i.e. import cycles
    pub fn find_cycles(&self) -> Vec<Vec<ModuleId>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|component| {
                let mut ids: Vec<ModuleId> =
                    component.into_iter().map(|node| self.graph[node]).collect();
                ids.sort_unstable();
                ids
            })
            .collect()
    }
}
