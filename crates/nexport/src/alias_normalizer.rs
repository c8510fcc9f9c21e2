//! Removes aliases that restate the name they alias, e.g. `{ Video as Video }`.
//!
//! Only statements targeting a registered module are touched, plus the aliases a barrel
//! re-exports renamed defaults under. Imports of packages never are.

use log::{info, warn};
use swc_ecma_ast::{ExportSpecifier, ImportSpecifier, ModuleDecl, ModuleExportName, ModuleItem};

use crate::{
    edits::TextEdit,
    module_set::ModuleSet,
    registry::CanonicalExportRegistry,
    resolver::ModuleResolver,
    source_module::SourceModule,
};

/// Strip redundant aliases in every module; returns the number of aliases removed
pub fn normalize_aliases(
    modules: &mut ModuleSet,
    resolver: &mut ModuleResolver,
    registry: &CanonicalExportRegistry,
) -> usize {
    let mut removed = 0;
    for index in 0..modules.len() {
        let edits = alias_edits(modules.module(index), resolver, registry);
        if edits.is_empty() {
            continue;
        }
        let module = modules.module_mut(index);
        match module.apply(edits) {
            Ok(applied) => removed += applied,
            Err(err) => warn!("Keeping aliases in {}: {err:#}", module.path().display()),
        }
    }
    info!("Removed {removed} redundant aliases");
    removed
}

fn alias_edits(
    module: &SourceModule,
    resolver: &mut ModuleResolver,
    registry: &CanonicalExportRegistry,
) -> Vec<TextEdit> {
    let mut edits = Vec::new();
    for item in &module.ast().body {
        let ModuleItem::ModuleDecl(decl) = item else {
            continue;
        };
        let (src, redundant) = match decl {
            ModuleDecl::Import(import) => {
                let redundant: Vec<_> = import
                    .specifiers
                    .iter()
                    .filter_map(|specifier| match specifier {
                        ImportSpecifier::Named(named) => match &named.imported {
                            Some(ModuleExportName::Ident(imported))
                                if imported.sym == named.local.sym =>
                            {
                                Some((
                                    imported.sym.to_string(),
                                    module.range(imported.span).end..module.range(named.local.span).end,
                                ))
                            }
                            _ => None,
                        },
                        _ => None,
                    })
                    .collect();
                (&import.src, redundant)
            }
            ModuleDecl::ExportNamed(export) => {
                let Some(src) = &export.src else {
                    continue;
                };
                let redundant: Vec<_> = export
                    .specifiers
                    .iter()
                    .filter_map(|specifier| match specifier {
                        ExportSpecifier::Named(named) => match (&named.orig, &named.exported) {
                            (ModuleExportName::Ident(orig), Some(ModuleExportName::Ident(exported)))
                                if orig.sym == exported.sym =>
                            {
                                Some((
                                    orig.sym.to_string(),
                                    module.range(orig.span).end..module.range(exported.span).end,
                                ))
                            }
                            _ => None,
                        },
                        _ => None,
                    })
                    .collect();
                (src, redundant)
            }
            _ => continue,
        };
        if redundant.is_empty() {
            continue;
        }

        let Some(target) = resolver.resolve(&module.string_value(src), module.path()) else {
            continue;
        };
        edits.extend(
            redundant
                .into_iter()
                .filter(|(name, _)| {
                    registry.contains(&target) || registry.exports_name(&target, name)
                })
                .map(|(_, range)| TextEdit::delete(range)),
        );
    }
    edits
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use tempfile::TempDir;

    use super::*;
    use crate::{config::Config, tsconfig::TsConfig};

    #[test]
    fn test_redundant_aliases_of_registered_modules_are_removed() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;
        fs::write(root.join("Video.ts"), "export const Video = 1;\nexport const Clip = 2;\n")?;
        fs::write(root.join("Other.ts"), "export const Other = 1;\n")?;
        fs::write(
            root.join("main.ts"),
            "import { Video as Video, Clip as Movie } from './Video';\nimport { Other as Other } from './Other';\nimport { useState as useState } from 'react';\nexport { Video as Video } from './Video';\n",
        )?;

        let config = Config::new(&root, "*.ts", None);
        let mut modules = ModuleSet::load(&config)?;
        let mut resolver = ModuleResolver::new(&root, TsConfig::default(), config.settings.extensions.clone());
        let mut registry = CanonicalExportRegistry::new();
        registry.register(&root.join("Video.ts"), "Video");

        assert_eq!(normalize_aliases(&mut modules, &mut resolver, &registry), 2);
        let main = modules.get(&root.join("main.ts")).map(SourceModule::source);
        assert_eq!(
            main,
            Some(
                "import { Video, Clip as Movie } from './Video';\nimport { Other as Other } from './Other';\nimport { useState as useState } from 'react';\nexport { Video } from './Video';\n"
            )
        );
        Ok(())
    }

    #[test]
    fn test_aliases_re_exported_by_a_barrel_are_normalized() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;
        fs::write(root.join("Button.ts"), "export const Button = 1;
")?;
        fs::write(
            root.join("A.ts"),
            "export { Button as ButtonRenamed } from './Button';
export const Other = 2;
",
        )?;
        fs::write(
            root.join("main.ts"),
            "import { ButtonRenamed as ButtonRenamed, Other as Other } from './A';
",
        )?;

        let config = Config::new(&root, "*.ts", None);
        let mut modules = ModuleSet::load(&config)?;
        let mut resolver = ModuleResolver::new(&root, TsConfig::default(), config.settings.extensions.clone());
        let mut registry = CanonicalExportRegistry::new();
        registry.register(&root.join("Button.ts"), "Button");
        registry.register_alias(&root.join("A.ts"), "ButtonRenamed", "Button");

        assert_eq!(normalize_aliases(&mut modules, &mut resolver, &registry), 1);
        let main = modules.get(&root.join("main.ts")).map(SourceModule::source);
        assert_eq!(
            main,
            Some("import { ButtonRenamed, Other as Other } from './A';
")
        );
        Ok(())
    }
}
