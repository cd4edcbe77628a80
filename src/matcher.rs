//! Context file matching
//!
//! Decides whether a single candidate file belongs to a context. The same predicate
//! backs both the incremental patch in the file-set cache and the reference bulk
//! scanner, so a patched baseline and a fresh scan agree on membership. That includes
//! the scanner's ignored directories: a file below one is never a member.

use crate::filter::CompiledFilter;
use crate::paths::{relative_to, to_request_path};
use std::path::{Component, Path};

/// Test `candidate` against a context rooted at `root`.
///
/// The candidate must be strictly inside `root` (a direct child unless `recursive`),
/// and its `./`-prefixed root-relative path must satisfy `filter`.
pub fn matches(root: &Path, candidate: &Path, recursive: bool, filter: &CompiledFilter) -> bool {
    let Some(rel) = relative_to(root, candidate) else {
        return false;
    };
    if !recursive && rel.components().count() > 1 {
        return false;
    }
    filter.is_match(&to_request_path(&rel))
}

/// Whether a root-relative file path sits below a directory named in `ignore_dirs`.
///
/// Only the directory components are tested, never the file name itself, and never
/// anything above the context root.
pub fn in_ignored_dir(rel: &Path, ignore_dirs: &[String]) -> bool {
    let Some(parent) = rel.parent() else {
        return false;
    };
    parent.components().any(|component| match component {
        Component::Normal(name) => ignore_dirs.iter().any(|dir| name == dir.as_str()),
        _ => false,
    })
}

/// A context's matching criteria bound together for repeated tests
#[derive(Debug, Clone, Copy)]
pub struct ContextFileMatcher<'a> {
    root: &'a Path,
    recursive: bool,
    filter: &'a CompiledFilter,
    ignore_dirs: &'a [String],
}

impl<'a> ContextFileMatcher<'a> {
    pub fn new(root: &'a Path, recursive: bool, filter: &'a CompiledFilter) -> Self {
        Self {
            root,
            recursive,
            filter,
            ignore_dirs: &[],
        }
    }

    /// Reject files below any directory named in `ignore_dirs`.
    pub fn with_ignore_dirs(mut self, ignore_dirs: &'a [String]) -> Self {
        self.ignore_dirs = ignore_dirs;
        self
    }

    pub fn matches(&self, candidate: &Path) -> bool {
        if !self.ignore_dirs.is_empty() {
            match relative_to(self.root, candidate) {
                Some(rel) if in_ignored_dir(&rel, self.ignore_dirs) => return false,
                Some(_) => {}
                None => return false,
            }
        }
        matches(self.root, candidate, self.recursive, self.filter)
    }
}
