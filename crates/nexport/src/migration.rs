//! Migration pipeline.
//!
//! Stages run in a fixed order over one in-memory [`ModuleSet`]:
//! 1. Module graph and processing order
//! 2. Exclusion scan (runtime loaders)
//! 3. Export conversion
//! 4. Reference rewriting, repeated until the registry is stable
//! 5. Alias normalization
//! 6. Mock factory fixes
//!
//! Nothing touches the disk until the final flush.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    alias_normalizer::normalize_aliases,
    config::{Config, Settings, build_glob_set},
    converter::{ConversionOutcome, ConversionPolicy, convert_modules},
    exclusion::ExclusionSet,
    graph_builder::{GraphBuilder, processing_order},
    mock_fixer::fix_mock_calls,
    module_set::ModuleSet,
    registry::{CanonicalExportRegistry, NameConflict},
    resolver::ModuleResolver,
    rewriter::ReferenceRewriter,
    tsconfig::{TsConfig, find_config},
};

/// Summary of a migration run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Modules that now export their former default by name, with that name
    pub converted: Vec<(PathBuf, String)>,
    /// Modules kept as default exports because a runtime loader reaches them
    pub excluded: Vec<PathBuf>,
    /// Modules with more than one default export candidate
    pub ambiguous: Vec<PathBuf>,
    pub conflicts: Vec<NameConflict>,
    pub files_written: usize,
}

/// Run the migration for the project described by `config` and write the results
pub fn migrate(config: &Config) -> Result<MigrationReport> {
    let Some(tsconfig_path) = find_config(&config.root) else {
        info!(
            "No tsconfig.json or jsconfig.json in {}, nothing to migrate",
            config.root.display()
        );
        return Ok(MigrationReport::default());
    };
    let tsconfig = TsConfig::load(&tsconfig_path)?;
    debug!("Using {}", tsconfig_path.display());

    let mut modules = ModuleSet::load(config)?;
    let mut report = migrate_modules(&mut modules, tsconfig, &config.settings)?;

    info!("Writing changes");
    report.files_written = modules.flush().context("Failed to write migrated modules")?;
    info!(
        "Migration finished: {} modules converted, {} files written",
        report.converted.len(),
        report.files_written
    );
    Ok(report)
}

/// Run every stage over already loaded modules without writing anything
pub fn migrate_modules(
    modules: &mut ModuleSet,
    tsconfig: TsConfig,
    settings: &Settings,
) -> Result<MigrationReport> {
    let non_convertible = build_glob_set(&settings.non_convertible)?;
    let mut resolver = ModuleResolver::new(modules.root(), tsconfig, settings.extensions.clone());

    info!("Building module graph");
    let graph = GraphBuilder::new(modules, &mut resolver).build();
    let order = processing_order(&graph, modules, &settings.entry);

    info!("Scanning for runtime loaders");
    let exclusions = ExclusionSet::scan(modules, &mut resolver, &settings.lazy_helpers);
    let policy = ConversionPolicy::new(modules, &exclusions, &non_convertible);

    info!("Converting default exports");
    let mut registry = CanonicalExportRegistry::new();
    let conversions = convert_modules(modules, &order, &policy, &mut registry);

    info!("Rewriting references");
    ReferenceRewriter::new(&mut resolver, &policy, &mut registry).run(modules, &order);

    info!("Removing redundant aliases");
    normalize_aliases(modules, &mut resolver, &registry);

    info!("Fixing mock factories");
    fix_mock_calls(modules, &mut resolver, &registry, &settings.mock_namespaces);

    Ok(MigrationReport {
        converted: registry
            .converted()
            .map(|(path, name)| (path.to_path_buf(), name.to_owned()))
            .collect(),
        excluded: exclusions
            .iter()
            .filter(|(path, _)| modules.get(path).is_some())
            .map(|(path, _)| path.to_path_buf())
            .collect(),
        ambiguous: conversions
            .into_iter()
            .filter(|conversion| matches!(conversion.outcome, ConversionOutcome::Ambiguous { .. }))
            .map(|conversion| conversion.path)
            .collect(),
        conflicts: registry.conflicts().to_vec(),
        files_written: 0,
    })
}
