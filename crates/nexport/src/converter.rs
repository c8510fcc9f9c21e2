//! Export conversion.
//!
//! Turns a default export bound to a local top-level declaration into a named export of
//! that declaration and records the chosen name in the registry.

use std::{
    ops::Range,
    path::{Path, PathBuf},
};

use globset::GlobSet;
use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use crate::{
    edits::{TextEdit, statement_removal_range},
    exclusion::ExclusionSet,
    module_graph::ProcessingOrder,
    module_set::ModuleSet,
    registry::CanonicalExportRegistry,
    source_module::SourceModule,
    visitors::{DefaultExport, DefaultForm, LocalDefault, LoaderKind, analyze_default_export, exported_names},
};

/// Why a module keeps its default export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepReason {
    /// Loaded at runtime by `require()` or a lazy-loading helper
    Excluded(LoaderKind),
    /// Matched by a non-convertible glob
    NonConvertible,
    /// Not selected by the work-on glob
    OutsideWorkSet,
}

/// Which modules may lose their default export
#[derive(Debug, Clone, Default)]
pub struct ConversionPolicy {
    kept: FxHashMap<PathBuf, KeepReason>,
}

impl ConversionPolicy {
    pub fn new(modules: &ModuleSet, exclusions: &ExclusionSet, non_convertible: &GlobSet) -> Self {
        let mut kept = FxHashMap::default();
        for module in modules.iter() {
            let path = module.path();
            let reason = if let Some(kind) = exclusions.kind(path) {
                Some(KeepReason::Excluded(kind))
            } else if path
                .strip_prefix(modules.root())
                .is_ok_and(|relative| non_convertible.is_match(relative))
            {
                Some(KeepReason::NonConvertible)
            } else if !modules.is_work_target(path) {
                Some(KeepReason::OutsideWorkSet)
            } else {
                None
            };
            if let Some(reason) = reason {
                kept.insert(path.to_path_buf(), reason);
            }
        }
        Self { kept }
    }

    pub fn keep_reason(&self, path: &Path) -> Option<KeepReason> {
        self.kept.get(path).copied()
    }

    pub fn may_convert(&self, path: &Path) -> bool {
        !self.kept.contains_key(path)
    }
}

/// What happened to a module's default export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    Converted { name: String },
    Kept(KeepReason),
    NoDefault,
    /// Inline expression or anonymous declaration
    Inline,
    /// Default names an identifier with no top-level binding
    Unbound { name: String },
    Ambiguous { candidates: usize },
    /// Default forwarded from another module; the reference rewriter handles it
    Deferred,
    /// The module is already registered under another name
    Conflict { registered: String },
    /// The edits could not be applied
    Failed,
}

/// Per-module result of [`convert_modules`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleConversion {
    pub path: PathBuf,
    pub outcome: ConversionOutcome,
}

/// Convert every eligible module, in processing order
pub fn convert_modules(
    modules: &mut ModuleSet,
    order: &ProcessingOrder,
    policy: &ConversionPolicy,
    registry: &mut CanonicalExportRegistry,
) -> Vec<ModuleConversion> {
    let mut conversions = Vec::with_capacity(order.len());
    for id in order.iter() {
        let module = modules.module_mut(id.index());
        let outcome = convert_module(module, policy, registry);
        debug!("{}: {outcome:?}", module.path().display());
        conversions.push(ModuleConversion {
            path: module.path().to_path_buf(),
            outcome,
        });
    }

    let converted = conversions
        .iter()
        .filter(|conversion| matches!(conversion.outcome, ConversionOutcome::Converted { .. }))
        .count();
    info!("Converted {converted} default exports to named exports");
    conversions
}

/// Convert the default export of a single module
pub fn convert_module(
    module: &mut SourceModule,
    policy: &ConversionPolicy,
    registry: &mut CanonicalExportRegistry,
) -> ConversionOutcome {
    let local = match analyze_default_export(module) {
        DefaultExport::None => return ConversionOutcome::NoDefault,
        _ if !policy.may_convert(module.path()) => {
            return policy
                .keep_reason(module.path())
                .map_or(ConversionOutcome::NoDefault, ConversionOutcome::Kept);
        }
        DefaultExport::Ambiguous { candidates } => {
            warn!(
                "{} has {candidates} default exports, leaving it unchanged",
                module.path().display()
            );
            return ConversionOutcome::Ambiguous { candidates };
        }
        DefaultExport::Inline => return ConversionOutcome::Inline,
        DefaultExport::Unbound { name } => return ConversionOutcome::Unbound { name },
        DefaultExport::Forwarded(_) | DefaultExport::Reexported(_) => {
            return ConversionOutcome::Deferred;
        }
        DefaultExport::Local(local) => local,
    };

    if let Some(registered) = registry
        .canonical_name(module.path())
        .filter(|registered| *registered != local.name)
        .map(str::to_owned)
    {
        // Recorded as a conflict; the module keeps its default
        registry.register(module.path(), &local.name);
        return ConversionOutcome::Conflict { registered };
    }

    let edits = conversion_edits(module, &local);
    if let Err(err) = module.apply(edits) {
        warn!("Failed to convert {}: {err:#}", module.path().display());
        return ConversionOutcome::Failed;
    }
    registry.register(module.path(), &local.name);
    ConversionOutcome::Converted { name: local.name }
}

/// Edits turning `local` into a named export of the same name
pub fn conversion_edits(module: &SourceModule, local: &LocalDefault) -> Vec<TextEdit> {
    let already_exported = exported_names(module).contains(&local.name);
    let mut edits = Vec::new();
    match &local.form {
        DefaultForm::Expression { statement } => {
            edits.push(TextEdit::delete(statement_removal_range(
                module.source(),
                statement.clone(),
            )));
            if !already_exported {
                edits.extend(
                    local
                        .declarations
                        .iter()
                        .filter(|declaration| !declaration.exported)
                        .map(|declaration| TextEdit::insert(declaration.start, "export ")),
                );
            }
        }
        DefaultForm::Specifier {
            statement,
            specifiers,
            index,
        } => {
            if already_exported {
                edits.push(remove_specifier(module, statement, specifiers, *index));
            } else {
                edits.push(TextEdit::replace(specifiers[*index].clone(), local.name.clone()));
            }
        }
        DefaultForm::NamedDeclaration { keywords, .. } => {
            let replacement = if already_exported { "" } else { "export " };
            edits.push(TextEdit::replace(keywords.clone(), replacement));
        }
    }
    edits
}

/// Edit removing the specifier at `index` from a `{ ... }` list, or the whole statement
/// when it is the only one
pub(crate) fn remove_specifier(
    module: &SourceModule,
    statement: &Range<usize>,
    specifiers: &[Range<usize>],
    index: usize,
) -> TextEdit {
    if specifiers.len() <= 1 {
        return TextEdit::delete(statement_removal_range(module.source(), statement.clone()));
    }
    if let Some(next) = specifiers.get(index + 1) {
        TextEdit::delete(specifiers[index].start..next.start)
    } else {
        TextEdit::delete(specifiers[index - 1].end..specifiers[index].end)
    }
}
