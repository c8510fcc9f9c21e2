//! Canonical export registry.
//!
//! The registry is the single source of truth for names chosen during a run: it maps
//! the path of every module whose default export became a named export to that name.
//! Modules re-exporting renamed defaults under an alias also record `alias -> canonical`.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, warn};

/// Canonical name of a converted module, plus the aliases it re-exports others under
#[derive(Debug, Clone, PartialEq, Eq)]
struct ExportEntry {
    canonical: String,
    /// Alias written by this module -> canonical name it stands for
    aliases: IndexMap<String, String>,
}

/// A later attempt to register a different name for an already registered module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameConflict {
    pub path: PathBuf,
    pub registered: String,
    pub rejected: String,
}

/// Result of [`CanonicalExportRegistry::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// The same name was already registered
    Unchanged,
    /// A different name was already registered; the existing one is kept
    Conflict,
}

#[derive(Debug, Clone, Default)]
pub struct CanonicalExportRegistry {
    entries: IndexMap<PathBuf, ExportEntry>,
    conflicts: Vec<NameConflict>,
}

impl CanonicalExportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` as the canonical export of `path`. The first registration wins.
    pub fn register(&mut self, path: &Path, name: &str) -> Registration {
        if let Some(entry) = self.entries.get_mut(path) {
            if entry.canonical == name {
                return Registration::Unchanged;
            }
            if entry.canonical.is_empty() {
                debug!("Registered {} as '{name}'", path.display());
                entry.canonical = name.to_owned();
                return Registration::Added;
            }
            warn!(
                "{} is already registered as '{}', ignoring '{name}'",
                path.display(),
                entry.canonical
            );
            self.conflicts.push(NameConflict {
                path: path.to_path_buf(),
                registered: entry.canonical.clone(),
                rejected: name.to_owned(),
            });
            return Registration::Conflict;
        }

        debug!("Registered {} as '{name}'", path.display());
        self.entries.insert(
            path.to_path_buf(),
            ExportEntry {
                canonical: name.to_owned(),
                aliases: IndexMap::new(),
            },
        );
        Registration::Added
    }

    /// Record that `path` re-exports `canonical` under `alias`
    pub fn register_alias(&mut self, path: &Path, alias: &str, canonical: &str) {
        let entry = self
            .entries
            .entry(path.to_path_buf())
            .or_insert_with(|| ExportEntry {
                canonical: String::new(),
                aliases: IndexMap::new(),
            });
        entry
            .aliases
            .entry(alias.to_owned())
            .or_insert_with(|| canonical.to_owned());
    }

    /// Canonical name registered for `path`
    pub fn canonical_name(&self, path: &Path) -> Option<&str> {
        self.entries
            .get(path)
            .map(|entry| entry.canonical.as_str())
            .filter(|name| !name.is_empty())
    }

    /// Canonical name behind an alias re-exported by `path`
    pub fn alias_target(&self, path: &Path, alias: &str) -> Option<&str> {
        self.entries
            .get(path)
            .and_then(|entry| entry.aliases.get(alias))
            .map(String::as_str)
    }

    /// Whether `name` is an export `path` gained during the run, as its canonical name or
    /// as an alias of a renamed default
    pub fn exports_name(&self, path: &Path, name: &str) -> bool {
        self.canonical_name(path) == Some(name) || self.alias_target(path, name).is_some()
    }

    /// Whether `path` has a registered canonical name
    pub fn contains(&self, path: &Path) -> bool {
        self.canonical_name(path).is_some()
    }

    /// Every module with a canonical name, in registration order
    pub fn converted(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.canonical.is_empty())
            .map(|(path, entry)| (path.as_path(), entry.canonical.as_str()))
    }

    pub fn conflicts(&self) -> &[NameConflict] {
        &self.conflicts
    }

    /// Number of modules with a canonical name
    pub fn len(&self) -> usize {
        self.converted().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_registration_wins() {
        let mut registry = CanonicalExportRegistry::new();
        let path = Path::new("/project/src/Video.tsx");

        assert_eq!(registry.register(path, "Video"), Registration::Added);
        assert_eq!(registry.register(path, "Video"), Registration::Unchanged);
        assert_eq!(registry.register(path, "Player"), Registration::Conflict);

        assert_eq!(registry.canonical_name(path), Some("Video"));
        assert_eq!(
            registry.conflicts(),
            &[NameConflict {
                path: path.to_path_buf(),
                registered: "Video".to_owned(),
                rejected: "Player".to_owned(),
            }]
        );
    }

    #[test]
    fn test_aliases_do_not_register_a_canonical_name() {
        let mut registry = CanonicalExportRegistry::new();
        let barrel = Path::new("/project/src/index.ts");

        registry.register_alias(barrel, "ButtonRenamed", "Button");
        assert_eq!(registry.alias_target(barrel, "ButtonRenamed"), Some("Button"));
        assert!(!registry.contains(barrel));
        assert!(registry.is_empty());

        assert!(registry.exports_name(barrel, "ButtonRenamed"));
        assert!(!registry.exports_name(barrel, "Button"));

        assert_eq!(registry.register(barrel, "Icons"), Registration::Added);
        assert!(registry.exports_name(barrel, "Icons"));
        assert_eq!(registry.alias_target(barrel, "ButtonRenamed"), Some("Button"));
        assert_eq!(registry.converted().collect::<Vec<_>>(), vec![(barrel, "Icons")]);
    }
}
