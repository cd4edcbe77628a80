//! Context identity: canonical keys, hashes and synthetic module paths
//!
//! A context module lives in the module graph under a synthetic path:
//!
//! ```text
//! <directory>?ctx=<hash>
//! ```
//!
//! where `hash` is a 160-bit BLAKE3 digest of the canonical key
//! `root mode [recursive] /filter/flags`. Two contexts anchored at the same directory
//! but with different criteria therefore never share a graph key, and the directory
//! can always be recovered by cutting at the marker.

use crate::error::ContextError;
use crate::filter::CompiledFilter;
use crate::paths::{normalize_path_string, trim_trailing_separators};
use crate::types::ContextCriteria;
use blake3::Hasher;

/// Delimiter between the directory and the context hash in a synthetic path.
pub const SYNTHETIC_MARKER: &str = "?ctx=";

/// Hash length in bytes (160 bits).
pub const HASH_LEN: usize = 20;

const RECURSIVE_MARKER: &str = "recursive";
const KEY_SEPARATOR: &str = " ";

/// Canonical key plus its digest
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextIdentityKey {
    pub key: String,
    pub hash: String,
}

impl ContextIdentityKey {
    pub fn for_criteria(criteria: &ContextCriteria) -> Result<Self, ContextError> {
        let key = compute_key(criteria)?;
        let hash = compute_hash(&key);
        Ok(Self { key, hash })
    }

    /// Same as [`for_criteria`](Self::for_criteria) with an already compiled filter.
    pub fn with_compiled(criteria: &ContextCriteria, filter: &CompiledFilter) -> Self {
        let key = join_key(criteria, filter.canonical());
        let hash = compute_hash(&key);
        Self { key, hash }
    }
}

/// Build the canonical key for a context request.
///
/// Segments are joined in fixed order; empty segments are skipped so a non-recursive
/// context never yields a double separator.
pub fn compute_key(criteria: &ContextCriteria) -> Result<String, ContextError> {
    let filter = criteria.filter.canonical()?;
    Ok(join_key(criteria, &filter))
}

fn join_key(criteria: &ContextCriteria, filter_canonical: &str) -> String {
    let root = normalize_path_string(&criteria.root.to_string_lossy());
    let recursion = if criteria.recursive {
        RECURSIVE_MARKER
    } else {
        ""
    };
    [root.as_str(), criteria.mode.as_str(), recursion, filter_canonical]
        .iter()
        .filter(|segment| !segment.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR)
}

/// Fixed-length hex digest of a key. Deterministic and unsalted.
pub fn compute_hash(key: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(b"context:");
    hasher.update(key.as_bytes());
    let mut out = [0u8; HASH_LEN];
    hasher.finalize_xof().fill(&mut out);
    hex::encode(out)
}

/// `<file_path><marker><hash>` for the given criteria.
pub fn build_synthetic_path(
    file_path: &str,
    criteria: &ContextCriteria,
) -> Result<String, ContextError> {
    let identity = ContextIdentityKey::for_criteria(criteria)?;
    Ok(synthetic_path_with_hash(file_path, &identity.hash))
}

pub(crate) fn synthetic_path_with_hash(file_path: &str, hash: &str) -> String {
    format!(
        "{}{}{}",
        trim_trailing_separators(file_path),
        SYNTHETIC_MARKER,
        hash
    )
}

/// Cut a synthetic path at the first marker. Paths without a marker are returned as-is.
pub fn strip_synthetic_path(synthetic_path: &str) -> &str {
    match synthetic_path.find(SYNTHETIC_MARKER) {
        Some(index) => &synthetic_path[..index],
        None => synthetic_path,
    }
}

/// Whether a module graph key names a context module.
pub fn is_synthetic_path(path: &str) -> bool {
    path.contains(SYNTHETIC_MARKER)
}
