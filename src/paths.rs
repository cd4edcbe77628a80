//! Path normalization utilities
//!
//! Everything here is lexical: context matching and identity keys must not depend on
//! whether a path currently exists on disk. Only [`canonicalize_root`] touches the
//! filesystem, for user-supplied roots.

use crate::error::ContextError;
use std::path::{Component, Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Normalize a path string for keys and display (without filesystem access)
///
/// Unicode is normalized to NFC and trailing separators are removed (except root).
pub fn normalize_path_string(path: &str) -> String {
    let normalized: String = path.nfc().collect();
    trim_trailing_separators(&normalized).to_string()
}

/// Strip trailing `/` or `\` separators, keeping a lone root separator.
pub fn trim_trailing_separators(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() && !path.is_empty() {
        &path[..1]
    } else {
        trimmed
    }
}

/// Fold `.` and `..` components without consulting the filesystem.
///
/// `..` at the start of a relative path is kept; `..` directly under the root is dropped.
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Path of `candidate` relative to `root`, or `None` when it is not strictly inside.
pub fn relative_to(root: &Path, candidate: &Path) -> Option<PathBuf> {
    let root = lexical_normalize(root);
    let candidate = lexical_normalize(candidate);
    let rel = candidate.strip_prefix(&root).ok()?;
    if rel.as_os_str().is_empty() || rel.is_absolute() {
        return None;
    }
    if matches!(rel.components().next(), Some(Component::ParentDir)) {
        return None;
    }
    Some(rel.to_path_buf())
}

/// `./`-prefixed, `/`-separated request string for a root-relative path.
///
/// The same string is produced on every platform so filters written against the
/// `./dir/file` convention behave identically everywhere.
pub fn to_request_path(rel: &Path) -> String {
    let joined = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    format!("./{}", joined.nfc().collect::<String>())
}

/// Resolve a user-supplied directory to an absolute, canonical path.
pub fn canonicalize_root(path: &Path) -> Result<PathBuf, ContextError> {
    dunce::canonicalize(path).map_err(|e| ContextError::Scan {
        root: path.to_path_buf(),
        reason: format!("Failed to canonicalize path: {}", e),
    })
}
