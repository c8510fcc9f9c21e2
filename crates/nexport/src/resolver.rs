use std::{
    ffi::OsStr,
    path::{Component, Path, PathBuf},
};

use log::{debug, trace, warn};
use rustc_hash::FxHashMap;

use crate::tsconfig::TsConfig;

/// Source extensions that a `.js`-style specifier may stand for
const TYPESCRIPT_SUBSTITUTES: &[(&str, &[&str])] = &[
    ("js", &["ts", "tsx"]),
    ("jsx", &["tsx"]),
    ("mjs", &["mts"]),
    ("cjs", &["cts"]),
];

/// Resolves module specifiers to canonical paths of project files
#[derive(Debug)]
pub struct ModuleResolver {
    root: PathBuf,
    tsconfig: TsConfig,
    /// Extensions probed for extensionless specifiers, in order
    extensions: Vec<String>,
    /// Cache keyed by (importing directory, specifier)
    cache: FxHashMap<(PathBuf, String), Option<PathBuf>>,
}

impl ModuleResolver {
    pub fn new(root: &Path, tsconfig: TsConfig, extensions: Vec<String>) -> Self {
        Self {
            root: canonicalize_path(root.to_path_buf()),
            tsconfig,
            extensions,
            cache: FxHashMap::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `specifier` as written in the module at `from`.
    ///
    /// Returns the canonical path of a project file, or `None` when the specifier cannot
    /// be resolved or points outside the project (packages, `node_modules`).
    pub fn resolve(&mut self, specifier: &str, from: &Path) -> Option<PathBuf> {
        let directory = from.parent().unwrap_or(&self.root).to_path_buf();
        let key = (directory, specifier.to_owned());
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }

        let resolved = self
            .resolve_uncached(specifier, &key.0)
            .filter(|path| self.is_project_file(path));
        match &resolved {
            Some(path) => trace!("Resolved '{specifier}' from {} to {}", key.0.display(), path.display()),
            None => debug!("Could not resolve '{specifier}' from {} to a project file", key.0.display()),
        }
        self.cache.insert(key, resolved.clone());
        resolved
    }

    fn resolve_uncached(&self, specifier: &str, directory: &Path) -> Option<PathBuf> {
        if is_relative(specifier) || Path::new(specifier).is_absolute() {
            return self.probe(&directory.join(specifier));
        }

        for (pattern, substitutions) in &self.tsconfig.paths {
            let Some(captured) = match_pattern(pattern, specifier) else {
                continue;
            };
            for substitution in substitutions {
                let candidate = PathBuf::from(substitution.to_string_lossy().replacen('*', captured, 1));
                if let Some(found) = self.probe(&candidate) {
                    return Some(found);
                }
            }
        }

        let base_url = self.tsconfig.base_url.as_ref()?;
        self.probe(&base_url.join(specifier))
    }

    /// Find the file a specifier path stands for
    fn probe(&self, candidate: &Path) -> Option<PathBuf> {
        let candidate = normalize(candidate);

        if candidate.is_file() && self.has_source_extension(&candidate) {
            return Some(canonicalize_path(candidate));
        }

        if let Some(extension) = candidate.extension().and_then(OsStr::to_str)
            && let Some((_, substitutes)) = TYPESCRIPT_SUBSTITUTES
                .iter()
                .find(|(written, _)| *written == extension)
        {
            for substitute in *substitutes {
                let typescript = candidate.with_extension(substitute);
                if typescript.is_file() {
                    return Some(canonicalize_path(typescript));
                }
            }
        }

        for extension in &self.extensions {
            let mut with_extension = candidate.clone().into_os_string();
            with_extension.push(".");
            with_extension.push(extension);
            let with_extension = PathBuf::from(with_extension);
            if with_extension.is_file() {
                return Some(canonicalize_path(with_extension));
            }
        }

        if candidate.is_dir() {
            for extension in &self.extensions {
                let index = candidate.join(format!("index.{extension}"));
                if index.is_file() {
                    return Some(canonicalize_path(index));
                }
            }
        }

        None
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|extension| self.extensions.iter().any(|known| known == extension))
    }

    /// Inside the project root and not part of an installed package
    fn is_project_file(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
            && !path
                .components()
                .any(|component| component.as_os_str() == "node_modules")
    }
}

/// Canonicalize a path, falling back to the input when that fails
pub(crate) fn canonicalize_path(path: PathBuf) -> PathBuf {
    match path.canonicalize() {
        Ok(canonical) => canonical,
        Err(e) => {
            warn!("Failed to canonicalize path {}: {}", path.display(), e);
            path
        }
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Match a `paths` pattern, returning the text captured by its `*`
fn match_pattern<'a>(pattern: &str, specifier: &'a str) -> Option<&'a str> {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => specifier
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(suffix)),
        None => (pattern == specifier).then_some(""),
    }
}

/// Resolve `.` and `..` components lexically
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use indexmap::IndexMap;
    use tempfile::TempDir;

    use super::*;

    fn create_test_file(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    fn extensions() -> Vec<String> {
        ["ts", "tsx", "js", "jsx", "mjs", "cjs"]
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn test_relative_resolution_probes_extensions_and_index() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;
        create_test_file(&root.join("src/App.tsx"), "")?;
        create_test_file(&root.join("src/Video.tsx"), "")?;
        create_test_file(&root.join("src/components/index.ts"), "")?;
        create_test_file(&root.join("src/util.ts"), "")?;

        let mut resolver = ModuleResolver::new(&root, TsConfig::default(), extensions());
        let from = root.join("src/App.tsx");

        assert_eq!(resolver.resolve("./Video", &from), Some(root.join("src/Video.tsx")));
        assert_eq!(
            resolver.resolve("./components", &from),
            Some(root.join("src/components/index.ts"))
        );
        assert_eq!(resolver.resolve("./util.js", &from), Some(root.join("src/util.ts")));
        assert_eq!(resolver.resolve("./missing", &from), None);
        Ok(())
    }

    #[test]
    fn test_paths_and_base_url() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;
        create_test_file(&root.join("src/App.tsx"), "")?;
        create_test_file(&root.join("src/ui/Button.tsx"), "")?;
        create_test_file(&root.join("src/lib/format.ts"), "")?;

        let mut paths = IndexMap::new();
        paths.insert("@ui/*".to_owned(), vec![root.join("src/ui/*")]);
        let tsconfig = TsConfig {
            base_url: Some(root.join("src")),
            paths,
        };
        let mut resolver = ModuleResolver::new(&root, tsconfig, extensions());
        let from = root.join("src/App.tsx");

        assert_eq!(resolver.resolve("@ui/Button", &from), Some(root.join("src/ui/Button.tsx")));
        assert_eq!(resolver.resolve("lib/format", &from), Some(root.join("src/lib/format.ts")));
        assert_eq!(resolver.resolve("react", &from), None);
        Ok(())
    }

    #[test]
    fn test_node_modules_and_outside_root_are_not_project_files() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let base = temp_dir.path().canonicalize()?;
        let root = base.join("project");
        create_test_file(&root.join("src/App.tsx"), "")?;
        create_test_file(&root.join("node_modules/pkg/index.js"), "")?;
        create_test_file(&base.join("shared/theme.ts"), "")?;

        let mut resolver = ModuleResolver::new(&root, TsConfig::default(), extensions());
        let from = root.join("src/App.tsx");

        assert_eq!(resolver.resolve("../node_modules/pkg", &from), None);
        assert_eq!(resolver.resolve("../../shared/theme", &from), None);
        assert_eq!(resolver.resolve("./App", &from), Some(root.join("src/App.tsx")));
        Ok(())
    }

    #[test]
    fn test_match_pattern() {
        assert_eq!(match_pattern("@/*", "@/components/Button"), Some("components/Button"));
        assert_eq!(match_pattern("*.svg", "icon.svg"), Some("icon"));
        assert_eq!(match_pattern("config", "config"), Some(""));
        assert_eq!(match_pattern("@/*", "react"), None);
    }
}
