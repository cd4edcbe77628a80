//! Per-context matched file sets
//!
//! Each context module instance (keyed by its synthetic path) owns one ordered list of
//! matching files. The first resolution, and any resolution without a delta hint,
//! performs a full scan through the [`BulkMatcher`]. Once a baseline exists, a delta
//! hint is applied as a patch: removals first, then additions that pass the context
//! matcher are appended. A removed directory takes every file below it along.
//! Patch cost is proportional to the delta and the baseline, never the tree.
//!
//! List order is insertion order. Existing files keep their relative order and new
//! files go to the end, so a no-op delta never reorders the generated table.

use crate::error::ContextError;
use crate::filter::CompiledFilter;
use crate::matcher::ContextFileMatcher;
use crate::scan::BulkMatcher;
use crate::types::{ContextCriteria, DeltaHint};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Which update strategies the cache may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanPolicy {
    /// Patch an existing baseline when a delta hint is supplied
    #[default]
    Incremental,
    /// Ignore delta hints and rescan on every resolution
    AlwaysFull,
}

/// Strategy used for one resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStrategy {
    FullScan,
    Patch { added: usize, removed: usize },
}

/// Result of resolving a context's file set
#[derive(Debug, Clone)]
pub struct FileSetResolution {
    pub files: Vec<PathBuf>,
    pub strategy: ScanStrategy,
}

#[derive(Debug, Clone, Default)]
struct MatchedFileSet {
    files: Vec<PathBuf>,
    members: HashSet<PathBuf>,
}

impl MatchedFileSet {
    fn from_scan(files: Vec<PathBuf>) -> Self {
        let mut set = MatchedFileSet::default();
        for file in files {
            set.push(file);
        }
        set
    }

    fn push(&mut self, file: PathBuf) -> bool {
        if self.members.insert(file.clone()) {
            self.files.push(file);
            true
        } else {
            false
        }
    }

    fn apply(&mut self, delta: &DeltaHint, matcher: &ContextFileMatcher<'_>) -> ScanStrategy {
        let before = self.files.len();
        if !delta.removed.is_empty() {
            let gone = |file: &PathBuf| file.ancestors().any(|p| delta.removed.contains(p));
            self.files.retain(|file| !gone(file));
            self.members.retain(|file| !gone(file));
        }
        let removed = before - self.files.len();

        let mut added = 0;
        for file in &delta.added {
            if !self.members.contains(file) && matcher.matches(file) && self.push(file.clone()) {
                added += 1;
            }
        }

        ScanStrategy::Patch { added, removed }
    }
}

/// Owns the matched file set of every context module instance
pub struct ContextFileSetCache {
    entries: RwLock<HashMap<String, MatchedFileSet>>,
    bulk_matcher: Arc<dyn BulkMatcher>,
    policy: ScanPolicy,
}

impl ContextFileSetCache {
    pub fn new(bulk_matcher: Arc<dyn BulkMatcher>, policy: ScanPolicy) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            bulk_matcher,
            policy,
        }
    }

    pub fn policy(&self) -> ScanPolicy {
        self.policy
    }

    /// Resolve the current file list for the context module at `key`.
    ///
    /// The returned list becomes the baseline for the next call.
    #[instrument(skip(self, criteria, filter, delta), fields(root = %criteria.root.display()))]
    pub async fn resolve(
        &self,
        key: &str,
        criteria: &ContextCriteria,
        filter: &CompiledFilter,
        delta: Option<&DeltaHint>,
    ) -> Result<FileSetResolution, ContextError> {
        if let (Some(delta), ScanPolicy::Incremental) = (delta, self.policy) {
            let mut entries = self.entries.write();
            if let Some(entry) = entries.get_mut(key) {
                let matcher = ContextFileMatcher::new(&criteria.root, criteria.recursive, filter)
                    .with_ignore_dirs(self.bulk_matcher.ignore_dirs());
                let strategy = entry.apply(delta, &matcher);
                debug!(?strategy, files = entry.files.len(), "Patched context file set");
                return Ok(FileSetResolution {
                    files: entry.files.clone(),
                    strategy,
                });
            }
        }

        let scanned = self
            .bulk_matcher
            .match_all_files(&criteria.root, &criteria.match_query())
            .await?;
        let entry = MatchedFileSet::from_scan(scanned);
        let files = entry.files.clone();
        self.entries.write().insert(key.to_string(), entry);

        debug!(files = files.len(), "Full scan of context file set");
        Ok(FileSetResolution {
            files,
            strategy: ScanStrategy::FullScan,
        })
    }

    /// Current baseline for `key`, if it has been resolved.
    pub fn baseline(&self, key: &str) -> Option<Vec<PathBuf>> {
        self.entries.read().get(key).map(|entry| entry.files.clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Drop the baseline of a context module that is no longer referenced.
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
