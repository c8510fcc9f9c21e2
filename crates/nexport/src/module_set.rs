//! The set of project modules a migration run operates on.
//!
//! Files are read once when the set is loaded and written once by [`ModuleSet::flush`].

use std::{
    ffi::OsStr,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use globset::GlobMatcher;
use log::{debug, info, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use tempfile::NamedTempFile;
use walkdir::{DirEntry, WalkDir};

use crate::{
    config::{Config, build_glob},
    resolver::canonicalize_path,
    source_module::{SUPPORTED_EXTENSIONS, SourceModule},
};

/// Directories never scanned for project modules
const IGNORED_DIRECTORIES: &[&str] = &["node_modules", ".git"];

#[derive(Debug)]
pub struct ModuleSet {
    root: PathBuf,
    modules: Vec<SourceModule>,
    by_path: FxHashMap<PathBuf, usize>,
    /// Modules selected by the work-on glob; `None` selects every module
    work_on: Option<FxHashSet<PathBuf>>,
}

impl ModuleSet {
    /// Scan the project root for modules matching the configured globs
    pub fn load(config: &Config) -> Result<Self> {
        let root = canonicalize_path(config.root.clone());
        let project = build_glob(&config.project_files)?.compile_matcher();
        let work_on = config
            .work_on
            .as_deref()
            .map(|pattern| build_glob(pattern).map(|glob| glob.compile_matcher()))
            .transpose()?;

        let mut set = Self::new(root.clone());
        let mut work_set = work_on.as_ref().map(|_| FxHashSet::default());

        for entry in WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_ignored_dir(entry))
        {
            let entry = entry.with_context(|| format!("Failed to scan {}", root.display()))?;
            if !entry.file_type().is_file() || !has_supported_extension(entry.path()) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&root) else {
                continue;
            };
            if !project.is_match(relative) {
                continue;
            }

            let path = canonicalize_path(entry.path().to_path_buf());
            let source = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let module = match SourceModule::parse(path.clone(), source) {
                Ok(module) => module,
                Err(err) => {
                    warn!("Skipping {}: {err:#}", path.display());
                    continue;
                }
            };

            if let (Some(matcher), Some(selected)) = (&work_on, &mut work_set)
                && matches_relative(matcher, &root, &path)
            {
                selected.insert(path.clone());
            }
            set.insert(module);
        }

        set.work_on = work_set;
        info!(
            "Loaded {} modules ({} selected for conversion)",
            set.len(),
            set.work_on.as_ref().map_or(set.len(), FxHashSet::len)
        );
        Ok(set)
    }

    /// Empty set rooted at `root`
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            modules: Vec::new(),
            by_path: FxHashMap::default(),
            work_on: None,
        }
    }

    /// Add a parsed module; a module with the same path is replaced
    pub fn insert(&mut self, module: SourceModule) {
        let path = module.path().to_path_buf();
        if let Some(&index) = self.by_path.get(&path) {
            self.modules[index] = module;
        } else {
            self.by_path.insert(path, self.modules.len());
            self.modules.push(module);
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Modules in load order
    pub fn iter(&self) -> impl Iterator<Item = &SourceModule> {
        self.modules.iter()
    }

    pub fn index_of(&self, path: &Path) -> Option<usize> {
        self.by_path.get(path).copied()
    }

    pub fn get(&self, path: &Path) -> Option<&SourceModule> {
        self.index_of(path).map(|index| &self.modules[index])
    }

    pub fn module(&self, index: usize) -> &SourceModule {
        &self.modules[index]
    }

    pub fn module_mut(&mut self, index: usize) -> &mut SourceModule {
        &mut self.modules[index]
    }

    /// Whether `path` may have its default export converted
    pub fn is_work_target(&self, path: &Path) -> bool {
        self.work_on
            .as_ref()
            .is_none_or(|selected| selected.contains(path))
    }

    /// Write every changed module back to disk.
    ///
    /// All new contents are staged next to their targets first; the originals are only
    /// replaced once every file has been staged. Returns the number of files written.
    pub fn flush(&self) -> Result<usize> {
        let mut staged = Vec::new();
        for module in self.modules.iter().filter(|module| module.is_dirty()) {
            let path = module.path();
            let directory = path.parent().unwrap_or(&self.root);
            let mut temp = NamedTempFile::new_in(directory)
                .with_context(|| format!("Failed to stage changes for {}", path.display()))?;
            temp.write_all(module.source().as_bytes())
                .with_context(|| format!("Failed to stage changes for {}", path.display()))?;
            if let Ok(metadata) = fs::metadata(path) {
                fs::set_permissions(temp.path(), metadata.permissions())
                    .with_context(|| format!("Failed to copy permissions of {}", path.display()))?;
            }
            staged.push((temp, path));
        }

        let written = staged.len();
        for (temp, path) in staged {
            temp.persist(path)
                .map_err(|err| err.error)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            debug!("Wrote {}", path.display());
        }
        Ok(written)
    }
}

fn is_ignored_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| IGNORED_DIRECTORIES.contains(&name))
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|extension| SUPPORTED_EXTENSIONS.contains(&extension))
}

fn matches_relative(matcher: &GlobMatcher, root: &Path, path: &Path) -> bool {
    path.strip_prefix(root)
        .is_ok_and(|relative| matcher.is_match(relative))
}
