//! Run configuration.
//!
//! Tool settings come from `nexport.toml` in the project root, then from the user
//! configuration directory, then from built-in defaults.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use etcetera::{BaseStrategy, choose_base_strategy};
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use log::debug;
use serde::Deserialize;

/// Settings file name, looked up in the project root and the user config directory
pub const SETTINGS_FILE_NAME: &str = "nexport.toml";

/// Tool settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Globs of modules that must keep their default export (framework entry points)
    pub non_convertible: Vec<String>,
    /// Call names treated as lazy-loading wrappers around `import()`
    pub lazy_helpers: Vec<String>,
    /// Objects whose `.mock(path, factory)` calls register module mocks
    pub mock_namespaces: Vec<String>,
    /// Modules the processing order starts from, relative to the project root
    pub entry: Vec<String>,
    /// Extensions probed when resolving extensionless specifiers
    pub extensions: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            non_convertible: vec!["**/*.page.{ts,tsx,js,jsx}".to_owned()],
            lazy_helpers: vec!["lazy".to_owned()],
            mock_namespaces: vec!["jest".to_owned(), "vi".to_owned()],
            entry: Vec::new(),
            extensions: ["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    /// Settings for a project rooted at `root`
    pub fn load(root: &Path) -> Result<Self> {
        let project = root.join(SETTINGS_FILE_NAME);
        if project.is_file() {
            debug!("Using project settings {}", project.display());
            return Self::from_file(&project);
        }
        if let Some(user) = user_settings_path()
            && user.is_file()
        {
            debug!("Using user settings {}", user.display());
            return Self::from_file(&user);
        }
        Ok(Self::default())
    }
}

/// `<config_dir>/nexport/nexport.toml`, when a home directory can be determined
fn user_settings_path() -> Option<PathBuf> {
    let strategy = choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("nexport").join(SETTINGS_FILE_NAME))
}

/// Everything a migration run needs to know
#[derive(Debug, Clone)]
pub struct Config {
    /// Project root; holds `tsconfig.json` and anchors every glob
    pub root: PathBuf,
    /// Glob selecting the project's modules
    pub project_files: String,
    /// Glob narrowing which modules may be converted
    pub work_on: Option<String>,
    pub settings: Settings,
}

impl Config {
    /// Configuration with default settings
    pub fn new(root: impl Into<PathBuf>, project_files: impl Into<String>, work_on: Option<String>) -> Self {
        Self {
            root: root.into(),
            project_files: project_files.into(),
            work_on: work_on.filter(|glob| !glob.trim().is_empty()),
            settings: Settings::default(),
        }
    }

    /// Configuration with settings read from disk
    pub fn load(root: impl Into<PathBuf>, project_files: impl Into<String>, work_on: Option<String>) -> Result<Self> {
        let mut config = Self::new(root, project_files, work_on);
        config.settings = Settings::load(&config.root)?;
        Ok(config)
    }
}

/// Glob with `*` confined to one path segment
pub(crate) fn build_glob(pattern: &str) -> Result<Glob> {
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("Invalid glob pattern '{pattern}'"))
}

pub(crate) fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(build_glob(pattern)?);
    }
    builder.build().context("Failed to compile glob patterns")
}
