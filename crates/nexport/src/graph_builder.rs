//! Builds the [`ModuleGraph`] of a [`ModuleSet`] and derives its processing order.
//!
//! Module ids mirror load order: the module at index `i` of the set is `ModuleId(i)`.

use log::{debug, warn};

use crate::{
    module_graph::{ModuleGraph, ModuleId, ProcessingOrder},
    module_set::ModuleSet,
    resolver::{ModuleResolver, canonicalize_path},
    visitors::collect_dependencies,
};

/// Builds the dependency graph of a module set
#[derive(Debug)]
pub struct GraphBuilder<'a> {
    modules: &'a ModuleSet,
    resolver: &'a mut ModuleResolver,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(modules: &'a ModuleSet, resolver: &'a mut ModuleResolver) -> Self {
        Self { modules, resolver }
    }

    /// Add a node per module and an edge per resolvable dependency
    pub fn build(&mut self) -> ModuleGraph {
        let mut graph = ModuleGraph::new();
        for _ in self.modules.iter() {
            graph.add_module();
        }

        let mut edges = 0usize;
        for (index, module) in self.modules.iter().enumerate() {
            let consumer = module_id(index);
            for specifier in collect_dependencies(module) {
                let Some(path) = self.resolver.resolve(&specifier, module.path()) else {
                    continue;
                };
                let Some(producer) = self.modules.index_of(&path) else {
                    continue;
                };
                graph.add_dependency(consumer, module_id(producer));
                edges += 1;
            }
        }
        debug!(
            "Built module graph with {} modules and {edges} dependency edges",
            graph.module_count()
        );

        for cycle in graph.find_cycles() {
            let paths: Vec<_> = cycle
                .iter()
                .map(|id| self.modules.module(id.index()).path().display().to_string())
                .collect();
            debug!("Import cycle: {}", paths.join(" -> "));
        }
        graph
    }
}

/// Order in which modules are converted and rewritten.
///
/// Starts from the `entry` modules when any are configured and loaded, otherwise from
/// every module nothing else depends on.
pub fn processing_order(graph: &ModuleGraph, modules: &ModuleSet, entry: &[String]) -> ProcessingOrder {
    let mut roots = Vec::new();
    for entry in entry {
        let path = canonicalize_path(modules.root().join(entry));
        match modules.index_of(&path) {
            Some(index) => roots.push(module_id(index)),
            None => warn!("Entry module {} is not part of the project files", path.display()),
        }
    }
    if roots.is_empty() {
        roots = graph.roots();
    }
    graph.processing_order(&roots)
}

fn module_id(index: usize) -> ModuleId {
    ModuleId::new(u32::try_from(index).unwrap_or(u32::MAX))
}
