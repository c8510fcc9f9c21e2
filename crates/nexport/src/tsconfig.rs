//! `tsconfig.json` / `jsconfig.json` loading.
//!
//! Only the compiler options that affect module resolution are read: `baseUrl` and
//! `paths`. `extends` chains are followed for relative paths, with child options
//! overriding the ones they inherit.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use log::debug;
use rustc_hash::FxHashSet;
use serde::Deserialize;

/// Configuration file names probed in the project root, in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &["tsconfig.json", "jsconfig.json"];

/// A single configuration file as written on disk
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TsConfigFile {
    extends: Option<Extends>,
    compiler_options: Option<CompilerOptions>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Extends {
    One(String),
    Many(Vec<String>),
}

impl Extends {
    fn paths(&self) -> &[String] {
        match self {
            Self::One(path) => std::slice::from_ref(path),
            Self::Many(paths) => paths,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompilerOptions {
    base_url: Option<String>,
    /// Insertion order is kept; the first matching pattern wins
    paths: Option<IndexMap<String, Vec<String>>>,
}

/// Module resolution options with every path made absolute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TsConfig {
    /// Directory bare specifiers are resolved against, if configured
    pub base_url: Option<PathBuf>,
    /// `paths` patterns mapped to absolute substitution templates
    pub paths: IndexMap<String, Vec<PathBuf>>,
}

impl TsConfig {
    /// Load `path` and every configuration it extends
    pub fn load(path: &Path) -> Result<Self> {
        let mut visited = FxHashSet::default();
        load_recursive(path, &mut visited)
    }
}

/// Locate the project's configuration file in `root`
pub fn find_config(root: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| root.join(name))
        .find(|candidate| candidate.is_file())
}

fn load_recursive(path: &Path, visited: &mut FxHashSet<PathBuf>) -> Result<TsConfig> {
    let canonical = fs::canonicalize(path)
        .with_context(|| format!("Failed to locate TypeScript config {}", path.display()))?;
    if !visited.insert(canonical.clone()) {
        bail!("Circular `extends` chain through {}", canonical.display());
    }

    let content = fs::read_to_string(&canonical)
        .with_context(|| format!("Failed to read TypeScript config {}", canonical.display()))?;
    // tsconfig files are JSONC: comments and trailing commas are common
    let file: TsConfigFile = json5::from_str(&content)
        .with_context(|| format!("Failed to parse TypeScript config {}", canonical.display()))?;
    let config_dir = canonical.parent().unwrap_or_else(|| Path::new("."));

    let mut resolved = TsConfig::default();
    for parent in file.extends.iter().flat_map(Extends::paths) {
        match extended_config_path(config_dir, parent) {
            Some(parent_path) => {
                let inherited = load_recursive(&parent_path, visited)?;
                if inherited.base_url.is_some() {
                    resolved.base_url = inherited.base_url;
                }
                resolved.paths.extend(inherited.paths);
            }
            None => debug!(
                "Not following `extends: {parent}` from {}",
                canonical.display()
            ),
        }
    }

    if let Some(options) = file.compiler_options {
        if let Some(base_url) = options.base_url {
            resolved.base_url = Some(config_dir.join(base_url));
        }
        if let Some(paths) = options.paths {
            let anchor = resolved
                .base_url
                .clone()
                .unwrap_or_else(|| config_dir.to_path_buf());
            // Child patterns replace inherited ones with the same key
            for (pattern, substitutions) in paths {
                let absolute = substitutions
                    .into_iter()
                    .map(|substitution| anchor.join(substitution))
                    .collect();
                resolved.paths.insert(pattern, absolute);
            }
        }
    }

    Ok(resolved)
}

/// Path of a relative `extends` target; package references are not followed
fn extended_config_path(config_dir: &Path, extends: &str) -> Option<PathBuf> {
    if !(extends.starts_with("./") || extends.starts_with("../") || Path::new(extends).is_absolute())
    {
        return None;
    }
    let candidate = config_dir.join(extends);
    if candidate.is_file() {
        return Some(candidate);
    }
    let with_extension = config_dir.join(format!("{extends}.json"));
    with_extension.is_file().then_some(with_extension)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_comments_and_trailing_commas_are_accepted() {
        let temp = TempDir::new().expect("temp dir");
        fs::write(
            temp.path().join("tsconfig.json"),
            r#"{
  // line comment
  "compilerOptions": {
    /* block */ "baseUrl": "./src",
    "paths": { "@/*": ["a//b/*", "c/*d*/",], },
  },
}"#,
        )
        .expect("write tsconfig");

        let config = TsConfig::load(&temp.path().join("tsconfig.json")).expect("config loads");
        let root = fs::canonicalize(temp.path()).expect("canonical temp dir");
        assert_eq!(config.base_url, Some(root.join("./src")));
        assert_eq!(
            config.paths["@/*"],
            vec![root.join("./src").join("a//b/*"), root.join("./src").join("c/*d*/")]
        );
    }

    #[test]
    fn test_extends_merges_paths_and_base_url() {
        let temp = TempDir::new().expect("temp dir");
        let root = fs::canonicalize(temp.path()).expect("canonical temp dir");
        fs::create_dir_all(root.join("config")).expect("create config dir");
        fs::write(
            root.join("config/base.json"),
            r#"{ "compilerOptions": { "baseUrl": "..", "paths": { "@/*": ["src/*"], "~/*": ["lib/*"] } } }"#,
        )
        .expect("write base config");
        fs::write(
            root.join("tsconfig.json"),
            r#"{ "extends": "./config/base", "compilerOptions": { "paths": { "@/*": ["app/*"] } } }"#,
        )
        .expect("write tsconfig");

        let config = TsConfig::load(&root.join("tsconfig.json")).expect("config loads");
        assert_eq!(config.base_url, Some(root.join("config/..")));
        assert_eq!(config.paths["@/*"], vec![root.join("config/../app/*")]);
        assert_eq!(config.paths["~/*"], vec![root.join("config/../lib/*")]);
    }

    #[test]
    fn test_circular_extends_is_an_error() {
        let temp = TempDir::new().expect("temp dir");
        fs::write(temp.path().join("a.json"), r#"{ "extends": "./b.json" }"#).expect("write a");
        fs::write(temp.path().join("b.json"), r#"{ "extends": ["./a.json"] }"#).expect("write b");
        assert!(TsConfig::load(&temp.path().join("a.json")).is_err());
    }

    #[test]
    fn test_package_extends_is_ignored() {
        let temp = TempDir::new().expect("temp dir");
        fs::write(
            temp.path().join("tsconfig.json"),
            r#"{ "extends": "@tsconfig/node20/tsconfig.json" }"#,
        )
        .expect("write tsconfig");
        let config = TsConfig::load(&temp.path().join("tsconfig.json")).expect("config loads");
        assert_eq!(config, TsConfig::default());
    }

    #[test]
    fn test_find_config_prefers_tsconfig() {
        let temp = TempDir::new().expect("temp dir");
        assert_eq!(find_config(temp.path()), None);
        fs::write(temp.path().join("jsconfig.json"), "{}").expect("write jsconfig");
        assert_eq!(
            find_config(temp.path()),
            Some(temp.path().join("jsconfig.json"))
        );
        fs::write(temp.path().join("tsconfig.json"), "{}").expect("write tsconfig");
        assert_eq!(
            find_config(temp.path()),
            Some(temp.path().join("tsconfig.json"))
        );
    }
}
