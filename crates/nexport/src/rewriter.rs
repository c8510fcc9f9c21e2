//! Reference rewriting.
//!
//! Every module is revisited in processing order and the statements that depended on a
//! converted default export are rewritten against the registry:
//!
//! - `import L from './x'` becomes `import { C } from './x'`, renaming `L` to `C` through
//!   its lexical references when that is safe and aliasing it (`{ C as L }`) otherwise.
//! - `export { default } from './x'` and `export { default as A } from './x'` name `C`
//!   instead of `default`; the un-aliased form makes `C` the module's own canonical name.
//! - A default that forwards an imported binding `N` becomes a named export of `N`; the
//!   import keeps binding `N` (`{ C as N }`) so `N` stays the module's export name.
//!
//! Passes repeat until one registers nothing new.

use std::ops::Range;

use log::{debug, info, warn};
use rustc_hash::FxHashSet;
use swc_common::Span;
use swc_ecma_ast::{
    ExportSpecifier, ImportDecl, ImportSpecifier, ModuleDecl, ModuleExportName, ModuleItem,
    NamedExport,
};

use crate::{
    converter::{ConversionPolicy, remove_specifier},
    edits::{TextEdit, statement_removal_range},
    module_graph::ProcessingOrder,
    module_set::ModuleSet,
    registry::{CanonicalExportRegistry, Registration},
    resolver::ModuleResolver,
    source_module::SourceModule,
    visitors::{
        DefaultExport, DefaultForm, RenameSite, analyze_default_export, export_name,
        exported_names, plan_rename,
    },
};

/// Registry change that takes effect once a module's edits are applied
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingRegistration {
    Canonical(String),
    Alias { alias: String, canonical: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    pub passes: usize,
    /// Edits applied across all passes
    pub edits: usize,
    /// Modules that received a canonical name from the rewriter
    pub registrations: usize,
}

#[derive(Debug)]
pub struct ReferenceRewriter<'a> {
    resolver: &'a mut ModuleResolver,
    policy: &'a ConversionPolicy,
    registry: &'a mut CanonicalExportRegistry,
}

impl<'a> ReferenceRewriter<'a> {
    pub fn new(
        resolver: &'a mut ModuleResolver,
        policy: &'a ConversionPolicy,
        registry: &'a mut CanonicalExportRegistry,
    ) -> Self {
        Self {
            resolver,
            policy,
            registry,
        }
    }

    /// Rewrite every module until the registry stops growing
    pub fn run(&mut self, modules: &mut ModuleSet, order: &ProcessingOrder) -> RewriteSummary {
        let max_passes = modules.len().max(1);
        let mut summary = RewriteSummary::default();
        loop {
            summary.passes += 1;
            let mut registered = 0;
            for id in order.iter() {
                let (edits, registrations) = self.rewrite_module(modules, id.index());
                summary.edits += edits;
                registered += registrations;
            }
            summary.registrations += registered;
            debug!(
                "Rewrite pass {} registered {registered} modules",
                summary.passes
            );
            if registered == 0 || summary.passes >= max_passes {
                break;
            }
        }
        info!(
            "Rewrote references with {} edits in {} passes",
            summary.edits, summary.passes
        );
        summary
    }

    /// Returns the number of applied edits and of new registrations
    fn rewrite_module(&mut self, modules: &mut ModuleSet, index: usize) -> (usize, usize) {
        let (edits, pending) = self.reference_edits(modules.module(index));
        let (mut applied, mut registered) = self.commit(modules.module_mut(index), edits, pending);

        if let Some((edits, pending)) = self.forwarding_edits(modules.module(index)) {
            let (more_applied, more_registered) =
                self.commit(modules.module_mut(index), edits, pending);
            applied += more_applied;
            registered += more_registered;
        }
        (applied, registered)
    }

    fn commit(
        &mut self,
        module: &mut SourceModule,
        edits: Vec<TextEdit>,
        pending: Vec<PendingRegistration>,
    ) -> (usize, usize) {
        if edits.is_empty() {
            return (0, 0);
        }
        let applied = match module.apply(edits) {
            Ok(applied) => applied,
            Err(err) => {
                warn!("Leaving references in {} unchanged: {err:#}", module.path().display());
                return (0, 0);
            }
        };

        let mut registered = 0;
        for registration in pending {
            match registration {
                PendingRegistration::Canonical(name) => {
                    if self.registry.register(module.path(), &name) == Registration::Added {
                        registered += 1;
                    }
                }
                PendingRegistration::Alias { alias, canonical } => {
                    self.registry.register_alias(module.path(), &alias, &canonical);
                }
            }
        }
        (applied, registered)
    }

    /// Edits for default imports and default re-exports of registered modules
    fn reference_edits(
        &mut self,
        module: &SourceModule,
    ) -> (Vec<TextEdit>, Vec<PendingRegistration>) {
        let mut edits = Vec::new();
        let mut pending = Vec::new();
        let mut claimed = FxHashSet::default();
        let mut adopted = self.registry.canonical_name(module.path()).map(str::to_owned);
        let exported = exported_names(module);
        let forwarded = self.forwarded_name(module);

        for (index, item) in module.ast().body.iter().enumerate() {
            match item {
                ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
                    self.rewrite_import(module, import, forwarded.as_deref(), &mut claimed, &mut edits);
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(export)) if export.src.is_some() => {
                    let statement = module.item_start(index)..module.range(export.span).end;
                    self.rewrite_reexport(
                        module,
                        export,
                        &statement,
                        &exported,
                        &mut adopted,
                        &mut edits,
                        &mut pending,
                    );
                }
                _ => {}
            }
        }
        (edits, pending)
    }

    /// Local binding a convertible module forwards as its default
    fn forwarded_name(&self, module: &SourceModule) -> Option<String> {
        if !self.policy.may_convert(module.path()) || self.registry.contains(module.path()) {
            return None;
        }
        match analyze_default_export(module) {
            DefaultExport::Forwarded(forwarded) => Some(forwarded.name),
            _ => None,
        }
    }

    fn canonical_for(&mut self, module: &SourceModule, specifier: &str) -> Option<String> {
        let target = self.resolver.resolve(specifier, module.path())?;
        self.registry.canonical_name(&target).map(str::to_owned)
    }

    fn rewrite_import(
        &mut self,
        module: &SourceModule,
        import: &ImportDecl,
        forwarded: Option<&str>,
        claimed: &mut FxHashSet<String>,
        edits: &mut Vec<TextEdit>,
    ) {
        let Some((position, local)) = import
            .specifiers
            .iter()
            .enumerate()
            .find_map(|(position, specifier)| {
                default_binding(module, specifier).map(|local| (position, local))
            })
        else {
            return;
        };
        let source = module.string_value(&import.src);
        let Some(canonical) = self.canonical_for(module, &source) else {
            return;
        };

        let binding = if forwarded == Some(local.as_str()) {
            // The forwarded binding is the name this module will export
            claimed.insert(local.clone());
            if local == canonical {
                canonical
            } else {
                format!("{canonical} as {local}")
            }
        } else {
            bind_canonical(module, &local, &canonical, claimed, edits)
        };
        debug!(
            "{}: default import of '{source}' becomes {{ {binding} }}",
            module.path().display()
        );

        let namespace = import.specifiers.iter().find_map(|specifier| match specifier {
            ImportSpecifier::Namespace(namespace) => Some(namespace),
            _ => None,
        });
        if let Some(namespace) = namespace {
            // `import L, * as NS` has no named-import equivalent; split the statement
            let statement = module.range(import.span);
            let source_range = module.range(import.src.span);
            let quoted = &module.source()[source_range.clone()];
            let tail = &module.source()[source_range.end..statement.end];
            let keyword = if import.type_only { "import type" } else { "import" };
            edits.push(TextEdit::replace(
                statement,
                format!(
                    "{keyword} {} from {quoted}{tail}\n{keyword} {{ {binding} }} from {quoted}{tail}",
                    module.text(namespace.span)
                ),
            ));
            return;
        }

        let mut names: Vec<String> = import
            .specifiers
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != position)
            .filter_map(|(_, specifier)| match specifier {
                ImportSpecifier::Named(named) => {
                    let text = module.text(named.span);
                    Some(if named.is_type_only && !text.starts_with("type ") {
                        format!("type {text}")
                    } else {
                        text.to_owned()
                    })
                }
                _ => None,
            })
            .collect();
        names.push(binding);
        edits.push(TextEdit::replace(
            import_clause_range(module, import),
            format!("{{ {} }}", names.join(", ")),
        ));
    }

    #[allow(clippy::too_many_arguments)]
    fn rewrite_reexport(
        &mut self,
        module: &SourceModule,
        export: &NamedExport,
        statement: &Range<usize>,
        exported: &FxHashSet<String>,
        adopted: &mut Option<String>,
        edits: &mut Vec<TextEdit>,
        pending: &mut Vec<PendingRegistration>,
    ) {
        let Some(src) = &export.src else {
            return;
        };
        let has_default = export.specifiers.iter().any(|specifier| {
            matches!(specifier, ExportSpecifier::Named(named) if export_name(module, &named.orig) == "default")
        });
        if !has_default {
            return;
        }
        let Some(canonical) = self.canonical_for(module, &module.string_value(src)) else {
            return;
        };

        let ranges: Vec<Range<usize>> = export
            .specifiers
            .iter()
            .map(|specifier| module.range(export_specifier_span(specifier)))
            .collect();
        for (position, specifier) in export.specifiers.iter().enumerate() {
            let ExportSpecifier::Named(named) = specifier else {
                continue;
            };
            if export_name(module, &named.orig) != "default" {
                continue;
            }
            let alias = named
                .exported
                .as_ref()
                .filter(|alias| export_name(module, alias) != "default");

            let Some(alias) = alias else {
                let may_adopt = self.policy.may_convert(module.path())
                    && adopted.as_deref().is_none_or(|name| name == canonical);
                if !may_adopt {
                    edits.push(TextEdit::replace(
                        ranges[position].clone(),
                        format!("{canonical} as default"),
                    ));
                    continue;
                }
                if exported.contains(&canonical) {
                    edits.push(remove_specifier(module, statement, &ranges, position));
                } else {
                    edits.push(TextEdit::replace(ranges[position].clone(), canonical.clone()));
                }
                *adopted = Some(canonical.clone());
                pending.push(PendingRegistration::Canonical(canonical.clone()));
                continue;
            };

            let alias_name = export_name(module, alias);
            if alias_name == canonical {
                edits.push(TextEdit::replace(ranges[position].clone(), canonical.clone()));
                continue;
            }
            let alias_text = module.text(module_export_name_span(alias));
            edits.push(TextEdit::replace(
                ranges[position].clone(),
                format!("{canonical} as {alias_text}"),
            ));
            pending.push(PendingRegistration::Alias {
                alias: alias_name,
                canonical: canonical.clone(),
            });
        }
    }

    /// Edits turning a forwarded default into a named export of the forwarded binding
    fn forwarding_edits(
        &self,
        module: &SourceModule,
    ) -> Option<(Vec<TextEdit>, Vec<PendingRegistration>)> {
        if !self.policy.may_convert(module.path()) || self.registry.contains(module.path()) {
            return None;
        }
        let (name, form) = match analyze_default_export(module) {
            DefaultExport::Forwarded(forwarded) => (forwarded.name, forwarded.form),
            DefaultExport::Reexported(reexported)
                if reexported.name != "default" && is_identifier(&reexported.name) =>
            {
                (reexported.name, reexported.form)
            }
            _ => return None,
        };

        let already_exported = exported_names(module).contains(&name);
        let edit = match &form {
            DefaultForm::Expression { statement } if already_exported => TextEdit::delete(
                statement_removal_range(module.source(), statement.clone()),
            ),
            DefaultForm::Expression { statement } => {
                TextEdit::replace(statement.clone(), format!("export {{ {name} }};"))
            }
            DefaultForm::Specifier {
                statement,
                specifiers,
                index,
            } if already_exported => remove_specifier(module, statement, specifiers, *index),
            DefaultForm::Specifier {
                specifiers, index, ..
            } => TextEdit::replace(specifiers[*index].clone(), name.clone()),
            DefaultForm::NamedDeclaration { .. } => return None,
        };
        debug!(
            "{}: forwarded default becomes named export '{name}'",
            module.path().display()
        );
        Some((vec![edit], vec![PendingRegistration::Canonical(name)]))
    }
}

/// Local name bound to the default export by an import specifier
fn default_binding(module: &SourceModule, specifier: &ImportSpecifier) -> Option<String> {
    match specifier {
        ImportSpecifier::Default(default) => Some(default.local.sym.to_string()),
        ImportSpecifier::Named(named)
            if named
                .imported
                .as_ref()
                .is_some_and(|imported| export_name(module, imported) == "default") =>
        {
            Some(named.local.sym.to_string())
        }
        _ => None,
    }
}

/// Specifier text binding `canonical`, renaming `local` when that keeps every reference
/// pointing at the import
fn bind_canonical(
    module: &SourceModule,
    local: &str,
    canonical: &str,
    claimed: &mut FxHashSet<String>,
    edits: &mut Vec<TextEdit>,
) -> String {
    if local == canonical {
        claimed.insert(canonical.to_owned());
        return canonical.to_owned();
    }
    if !claimed.contains(canonical) {
        let plan = plan_rename(module.ast(), local, canonical);
        if plan.is_safe() {
            claimed.insert(canonical.to_owned());
            edits.extend(
                plan.sites
                    .iter()
                    .map(|site| rename_edit(module, *site, local, canonical)),
            );
            return canonical.to_owned();
        }
        debug!(
            "{}: keeping alias {canonical} as {local} ({plan:?})",
            module.path().display()
        );
    }
    format!("{canonical} as {local}")
}

fn rename_edit(module: &SourceModule, site: RenameSite, local: &str, canonical: &str) -> TextEdit {
    match site {
        RenameSite::Reference(span) => TextEdit::replace(module.range(span), canonical),
        RenameSite::Shorthand(span) => {
            TextEdit::replace(module.range(span), format!("{local}: {canonical}"))
        }
        RenameSite::LocalExport {
            span,
            aliased: false,
        } => TextEdit::replace(module.range(span), format!("{canonical} as {local}")),
        RenameSite::LocalExport { span, aliased: true } => {
            TextEdit::replace(module.range(span), canonical)
        }
    }
}

/// Range from the first binding of an import through its closing `}`
fn import_clause_range(module: &SourceModule, import: &ImportDecl) -> Range<usize> {
    let source = module.source();
    let statement = module.range(import.span);
    let source_start = module.range(import.src.span).start;
    let spans: Vec<Range<usize>> = import
        .specifiers
        .iter()
        .map(|specifier| module.range(import_specifier_span(specifier)))
        .collect();
    let (Some(first), Some(last)) = (spans.first(), spans.last()) else {
        return statement;
    };

    let start = match import.specifiers.first() {
        Some(ImportSpecifier::Default(_)) => first.start,
        _ => source[statement.start..first.start]
            .rfind('{')
            .map_or(first.start, |offset| statement.start + offset),
    };
    let end = source[last.end..source_start]
        .rfind('}')
        .map_or(last.end, |offset| last.end + offset + 1);
    start..end
}

fn import_specifier_span(specifier: &ImportSpecifier) -> Span {
    match specifier {
        ImportSpecifier::Named(named) => named.span,
        ImportSpecifier::Default(default) => default.span,
        ImportSpecifier::Namespace(namespace) => namespace.span,
    }
}

fn export_specifier_span(specifier: &ExportSpecifier) -> Span {
    match specifier {
        ExportSpecifier::Named(named) => named.span,
        ExportSpecifier::Namespace(namespace) => namespace.span,
        ExportSpecifier::Default(default) => default.exported.span,
    }
}

fn module_export_name_span(name: &ModuleExportName) -> Span {
    match name {
        ModuleExportName::Ident(ident) => ident.span,
        ModuleExportName::Str(literal) => literal.span,
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use anyhow::Result;
    use globset::GlobSet;
    use insta::assert_snapshot;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        config::Config,
        converter::convert_modules,
        exclusion::ExclusionSet,
        graph_builder::{GraphBuilder, processing_order},
        tsconfig::TsConfig,
    };

    struct Project {
        _temp_dir: TempDir,
        root: PathBuf,
        modules: ModuleSet,
        registry: CanonicalExportRegistry,
    }

    impl Project {
        fn source(&self, relative: &str) -> &str {
            self.modules
                .get(&self.root.join(relative))
                .map(SourceModule::source)
                .unwrap_or_default()
        }

        fn canonical(&self, relative: &str) -> Option<&str> {
            self.registry.canonical_name(&self.root.join(relative))
        }
    }

    fn run(files: &[(&str, &str)]) -> Result<Project> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;
        for (relative, content) in files {
            let path = root.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
        }

        let config = Config::new(&root, "**/*", None);
        let mut modules = ModuleSet::load(&config)?;
        let mut resolver = ModuleResolver::new(&root, TsConfig::default(), config.settings.extensions.clone());
        let graph = GraphBuilder::new(&modules, &mut resolver).build();
        let order = processing_order(&graph, &modules, &[]);
        let exclusions = ExclusionSet::scan(&modules, &mut resolver, &config.settings.lazy_helpers);
        let policy = ConversionPolicy::new(&modules, &exclusions, &GlobSet::empty());
        let mut registry = CanonicalExportRegistry::new();

        convert_modules(&mut modules, &order, &policy, &mut registry);
        ReferenceRewriter::new(&mut resolver, &policy, &mut registry).run(&mut modules, &order);
        Ok(Project {
            _temp_dir: temp_dir,
            root,
            modules,
            registry,
        })
    }

    #[test]
    fn test_default_import_merges_with_named_imports() -> Result<()> {
        let project = run(&[
            ("Video.tsx", "export const format = 1;\nconst Video = () => null;\nexport default Video;\n"),
            (
                "App.tsx",
                "import Video, { format } from './Video';\n\nexport const App = () => <Video format={format} />;\n",
            ),
        ])?;
        assert_snapshot!(project.source("App.tsx"), @r"
        import { format, Video } from './Video';

        export const App = () => <Video format={format} />;
        ");
        Ok(())
    }

    #[test]
    fn test_local_name_is_renamed_through_references() -> Result<()> {
        let project = run(&[
            ("Video.ts", "function Video() {}\nexport default Video;\n"),
            (
                "player.ts",
                "import Clip from './Video';\n\nexport const config = { Clip };\nfunction play(Clip: number) {\n  return Clip;\n}\nClip();\nexport { Clip };\n",
            ),
        ])?;
        assert_snapshot!(project.source("player.ts"), @r"
        import { Video } from './Video';

        export const config = { Clip: Video };
        function play(Clip: number) {
          return Clip;
        }
        Video();
        export { Video as Clip };
        ");
        Ok(())
    }

    #[test]
    fn test_unsafe_rename_keeps_alias() -> Result<()> {
        let project = run(&[
            ("Video.ts", "function Video() {}\nexport default Video;\n"),
            (
                "player.ts",
                "import Clip from './Video';\n\nfunction play(Video: number) {\n  return Clip(Video);\n}\n",
            ),
        ])?;
        assert!(project.source("player.ts").starts_with("import { Video as Clip } from './Video';\n"));
        assert!(project.source("player.ts").contains("return Clip(Video);"));
        Ok(())
    }

    #[test]
    fn test_reexport_alias_is_preserved() -> Result<()> {
        let project = run(&[
            ("Button.tsx", "const Button = () => null;\nexport default Button;\n"),
            ("A.ts", "export { default as ButtonRenamed } from './Button';\n"),
            ("usage.ts", "import { ButtonRenamed } from './A';\nButtonRenamed();\n"),
        ])?;
        assert_eq!(project.source("Button.tsx"), "export const Button = () => null;\n");
        assert_eq!(
            project.source("A.ts"),
            "export { Button as ButtonRenamed } from './Button';\n"
        );
        assert_eq!(
            project.source("usage.ts"),
            "import { ButtonRenamed } from './A';\nButtonRenamed();\n"
        );
        assert_eq!(
            project
                .registry
                .alias_target(&project.root.join("A.ts"), "ButtonRenamed"),
            Some("Button")
        );
        Ok(())
    }

    #[test]
    fn test_default_reexport_extends_the_chain() -> Result<()> {
        let project = run(&[
            ("ui/Button.tsx", "const Button = () => null;\nexport default Button;\n"),
            ("ui/index.ts", "export { default } from './Button';\n"),
            ("App.tsx", "import Button from './ui';\nButton();\n"),
        ])?;
        assert_eq!(project.source("ui/index.ts"), "export { Button } from './Button';\n");
        assert_eq!(project.canonical("ui/index.ts"), Some("Button"));
        assert_eq!(project.source("App.tsx"), "import { Button } from './ui';\nButton();\n");
        Ok(())
    }

    #[test]
    fn test_forwarded_default_is_adopted_by_barrel() -> Result<()> {
        let project = run(&[
            ("media/Player.ts", "const Player = 1;\nexport default Player;\n"),
            ("media/index.ts", "import Player from './Player';\n\nexport default Player;\n"),
            ("main.ts", "import Media from './media';\nconsole.log(Media);\n"),
        ])?;
        assert_snapshot!(project.source("media/index.ts"), @r"
        import { Player } from './Player';

        export { Player };
        ");
        assert_eq!(project.canonical("media/index.ts"), Some("Player"));
        assert_eq!(
            project.source("main.ts"),
            "import { Player } from './media';\nconsole.log(Player);\n"
        );
        Ok(())
    }

    #[test]
    fn test_barrel_keeps_its_forwarded_local_name() -> Result<()> {
        let project = run(&[
            ("ui/Button.tsx", "const Button = () => null;\nexport default Button;\n"),
            ("barrel.ts", "import Btn from './ui/Button';\nexport { Btn as default };\n"),
            ("use.tsx", "import Btn from './barrel';\nBtn();\n"),
        ])?;
        assert_eq!(
            project.source("barrel.ts"),
            "import { Button as Btn } from './ui/Button';\nexport { Btn };\n"
        );
        assert_eq!(project.canonical("barrel.ts"), Some("Btn"));
        assert_eq!(project.source("use.tsx"), "import { Btn } from './barrel';\nBtn();\n");
        Ok(())
    }

    #[test]
    fn test_default_reexport_of_a_kept_module_is_aliased() -> Result<()> {
        let project = run(&[
            ("Button.tsx", "const Button = () => null;\nexport default Button;\n"),
            ("legacy.ts", "export { default } from './Button';\n"),
            ("boot.js", "const legacy = require('./legacy');\n"),
        ])?;
        assert_eq!(project.source("Button.tsx"), "export const Button = () => null;\n");
        assert_eq!(
            project.source("legacy.ts"),
            "export { Button as default } from './Button';\n"
        );
        assert_eq!(project.canonical("legacy.ts"), None);
        Ok(())
    }

    #[test]
    fn test_namespace_import_is_split() -> Result<()> {
        let project = run(&[
            ("Video.ts", "export const a = 1;\nconst Video = 2;\nexport default Video;\n"),
            ("main.ts", "import Video, * as all from \"./Video\";\nconsole.log(Video, all.a);\n"),
        ])?;
        assert_eq!(
            project.source("main.ts"),
            "import * as all from \"./Video\";\nimport { Video } from \"./Video\";\nconsole.log(Video, all.a);\n"
        );
        Ok(())
    }

    #[test]
    fn test_excluded_module_keeps_default_imports() -> Result<()> {
        let project = run(&[
            ("Video.tsx", "const Video = () => null;\nexport default Video;\n"),
            (
                "App.tsx",
                "import Video from './Video';\nconst Lazy = lazy(() => import('./Video'));\nexport { Video, Lazy };\n",
            ),
        ])?;
        assert_eq!(
            project.source("Video.tsx"),
            "const Video = () => null;\nexport default Video;\n"
        );
        assert!(project.source("App.tsx").starts_with("import Video from './Video';"));
        assert!(project.registry.is_empty());
        Ok(())
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("Button"));
        assert!(is_identifier("$store"));
        assert!(!is_identifier("kebab-case"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier(""));
    }
}
