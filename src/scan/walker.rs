//! Filesystem walker for full context scans

use crate::error::ContextError;
use crate::filter::CompiledFilter;
use crate::matcher::ContextFileMatcher;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use walkdir::{DirEntry, WalkDir};

/// Filesystem walker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Whether to follow symbolic links (default: false for determinism)
    #[serde(default)]
    pub follow_symlinks: bool,
    /// Directory names never descended into
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,
}

fn default_ignore_dirs() -> Vec<String> {
    vec![
        ".git".to_string(),
        "node_modules".to_string(),
        "target".to_string(),
    ]
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            ignore_dirs: default_ignore_dirs(),
        }
    }
}

/// Filesystem walker
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: PathBuf, config: WalkerConfig) -> Self {
        Self { root, config }
    }

    /// Collect every file under the root accepted by the context predicate.
    ///
    /// Returns paths sorted for determinism. A missing root yields no files.
    pub fn matching_files(
        &self,
        recursive: bool,
        filter: &CompiledFilter,
    ) -> Result<Vec<PathBuf>, ContextError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let walker = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .max_depth(if recursive { usize::MAX } else { 1 });

        let matcher = ContextFileMatcher::new(&self.root, recursive, filter)
            .with_ignore_dirs(&self.config.ignore_dirs);
        let mut files = Vec::new();
        for entry in walker
            .into_iter()
            .filter_entry(|entry| !self.should_ignore(entry))
        {
            let entry = entry.map_err(|e| ContextError::Scan {
                root: self.root.clone(),
                reason: format!("Failed to walk directory: {}", e),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if matcher.matches(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }

    fn should_ignore(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        self.config.ignore_dirs.iter().any(|ignored| *ignored == name)
    }
}
