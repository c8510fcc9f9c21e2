//! Modules whose default export must survive the migration.
//!
//! A module loaded through `require()` or through a lazy-loading helper is read by its
//! `default` property at runtime, so renaming its export would break the loader.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info};

use crate::{
    module_set::ModuleSet,
    resolver::ModuleResolver,
    visitors::{LoaderKind, collect_loader_calls},
};

/// Resolved paths of modules that keep their default export, with the first loader kind
/// that reached each one
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    paths: IndexMap<PathBuf, LoaderKind>,
}

impl ExclusionSet {
    /// Scan every module for loader calls and resolve their targets
    pub fn scan(modules: &ModuleSet, resolver: &mut ModuleResolver, lazy_helpers: &[String]) -> Self {
        let mut set = Self::default();
        for module in modules.iter() {
            for call in collect_loader_calls(module, lazy_helpers) {
                let Some(path) = resolver.resolve(&call.specifier, module.path()) else {
                    debug!(
                        "Ignoring unresolvable loader target '{}' in {}",
                        call.specifier,
                        module.path().display()
                    );
                    continue;
                };
                debug!(
                    "{} is loaded by {:?} from {}",
                    path.display(),
                    call.kind,
                    module.path().display()
                );
                set.insert(path, call.kind);
            }
        }
        info!("Excluded {} modules reached by runtime loaders", set.len());
        set
    }

    pub fn insert(&mut self, path: PathBuf, kind: LoaderKind) {
        self.paths.entry(path).or_insert(kind);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains_key(path)
    }

    pub fn kind(&self, path: &Path) -> Option<LoaderKind> {
        self.paths.get(path).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, LoaderKind)> {
        self.paths.iter().map(|(path, kind)| (path.as_path(), *kind))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use tempfile::TempDir;

    use super::*;
    use crate::{config::Config, tsconfig::TsConfig};

    #[test]
    fn test_require_and_lazy_targets_are_excluded() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;
        fs::create_dir_all(root.join("src"))?;
        fs::write(
            root.join("src/App.tsx"),
            "import { lazy } from 'react';\nimport Player from './Player';\nconst Video = lazy(() => import('./Video'));\nconst legacy = require('./legacy');\nconst chart = require('chart.js');\n",
        )?;
        fs::write(root.join("src/Video.tsx"), "const Video = 1;\nexport default Video;\n")?;
        fs::write(root.join("src/Player.tsx"), "const Player = 1;\nexport default Player;\n")?;
        fs::write(root.join("src/legacy.js"), "module.exports = {};\n")?;

        let config = Config::new(&root, "src/**/*", None);
        let modules = ModuleSet::load(&config)?;
        let mut resolver = ModuleResolver::new(&root, TsConfig::default(), config.settings.extensions.clone());
        let exclusions = ExclusionSet::scan(&modules, &mut resolver, &config.settings.lazy_helpers);

        assert_eq!(exclusions.len(), 2);
        assert_eq!(exclusions.kind(&root.join("src/Video.tsx")), Some(LoaderKind::Lazy));
        assert_eq!(exclusions.kind(&root.join("src/legacy.js")), Some(LoaderKind::Require));
        assert!(!exclusions.contains(&root.join("src/Player.tsx")));
        Ok(())
    }
}
