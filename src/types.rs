//! Core value types shared across resolution, caching and generation.

use crate::error::ContextError;
use crate::filter::ContextFilter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How the generated context module loads the files it exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextMode {
    /// Lookup returns the module value directly
    Sync,
    /// Files are bundled with the context module, lookup returns a resolved promise
    Eager,
    /// Files are loaded on first access, lookup returns a promise
    Lazy,
    /// Same load shape as `Lazy`
    LazyOnce,
}

impl ContextMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextMode::Sync => "sync",
            ContextMode::Eager => "eager",
            ContextMode::Lazy => "lazy",
            ContextMode::LazyOnce => "lazy-once",
        }
    }

    /// Whether referenced files are pulled into the bundle alongside the context module.
    pub fn includes_files_inline(&self) -> bool {
        matches!(self, ContextMode::Sync | ContextMode::Eager)
    }
}

impl fmt::Display for ContextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextMode {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sync" => Ok(ContextMode::Sync),
            "eager" => Ok(ContextMode::Eager),
            "lazy" => Ok(ContextMode::Lazy),
            "lazy-once" => Ok(ContextMode::LazyOnce),
            other => Err(ContextError::UnsupportedMode(other.to_string())),
        }
    }
}

/// A context request: which files under `root` to expose and how to load them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextCriteria {
    /// Absolute directory the request is anchored at
    pub root: PathBuf,
    /// Whether files in subdirectories of `root` qualify
    pub recursive: bool,
    /// Filter tested against `./`-prefixed root-relative paths
    pub filter: ContextFilter,
    pub mode: ContextMode,
}

impl ContextCriteria {
    pub fn new(
        root: impl Into<PathBuf>,
        recursive: bool,
        filter: ContextFilter,
        mode: ContextMode,
    ) -> Result<Self, ContextError> {
        let root = root.into();
        if !root.is_absolute() {
            return Err(ContextError::RelativeRoot(root));
        }
        Ok(Self {
            root,
            recursive,
            filter,
            mode,
        })
    }

    /// The subset of the criteria the bulk matcher needs.
    pub fn match_query(&self) -> MatchQuery {
        MatchQuery {
            recursive: self.recursive,
            filter: self.filter.clone(),
        }
    }
}

/// Recursion and filter settings handed to the bulk matcher
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchQuery {
    pub recursive: bool,
    pub filter: ContextFilter,
}

/// Files added and removed since the previous resolution of one context module.
///
/// `added` keeps first-seen order so newly matched files are appended deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeltaHint {
    pub added: Vec<PathBuf>,
    pub removed: BTreeSet<PathBuf>,
}

impl DeltaHint {
    pub fn new<A, R>(added: A, removed: R) -> Self
    where
        A: IntoIterator<Item = PathBuf>,
        R: IntoIterator<Item = PathBuf>,
    {
        let mut hint = DeltaHint::default();
        for path in added {
            hint.push_added(path);
        }
        hint.removed.extend(removed);
        hint
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    fn push_added(&mut self, path: PathBuf) {
        if !self.added.contains(&path) {
            self.added.push(path);
        }
    }

    /// Fold a later delta into this one.
    ///
    /// A path removed after it was added is dropped from `added`; a path re-added after
    /// removal stays in both, which the removals-then-additions patch order turns into
    /// an append.
    pub fn merge(&mut self, later: DeltaHint) {
        for path in &later.removed {
            self.added.retain(|p| p != path);
        }
        self.removed.extend(later.removed);
        for path in later.added {
            self.push_added(path);
        }
    }

    /// Keep only the paths that live under `root`.
    pub fn scoped_to(&self, root: &Path) -> DeltaHint {
        DeltaHint {
            added: self
                .added
                .iter()
                .filter(|p| p.starts_with(root))
                .cloned()
                .collect(),
            removed: self
                .removed
                .iter()
                .filter(|p| p.starts_with(root))
                .cloned()
                .collect(),
        }
    }
}

/// Per-rebuild change notification from the module graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphDelta {
    pub added_files: Vec<PathBuf>,
    pub deleted_files: Vec<PathBuf>,
}
