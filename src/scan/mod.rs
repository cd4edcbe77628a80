//! Bulk file matching
//!
//! A full scan asks a [`BulkMatcher`] for every file under a context root that passes
//! the context's criteria. The bundler normally supplies its own indexed implementation;
//! [`WalkdirMatcher`] walks the real filesystem and is used by the CLI and tests.

pub mod walker;

pub use walker::{Walker, WalkerConfig};

use crate::error::ContextError;
use crate::types::MatchQuery;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Full-scan matcher interface
#[async_trait]
pub trait BulkMatcher: Send + Sync {
    /// Every file under `root` satisfying `query`, in a stable order.
    async fn match_all_files(
        &self,
        root: &Path,
        query: &MatchQuery,
    ) -> Result<Vec<PathBuf>, ContextError>;

    /// Directory names a scan never descends into. Incremental patches reject files
    /// below them too, so patch and scan agree on membership.
    fn ignore_dirs(&self) -> &[String] {
        &[]
    }
}

/// [`BulkMatcher`] backed by a blocking directory walk
#[derive(Debug, Clone, Default)]
pub struct WalkdirMatcher {
    config: WalkerConfig,
}

impl WalkdirMatcher {
    pub fn new(config: WalkerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl BulkMatcher for WalkdirMatcher {
    async fn match_all_files(
        &self,
        root: &Path,
        query: &MatchQuery,
    ) -> Result<Vec<PathBuf>, ContextError> {
        let filter = query.filter.compile()?;
        let walker = Walker::with_config(root.to_path_buf(), self.config.clone());
        let recursive = query.recursive;
        let root_buf = root.to_path_buf();

        let files = tokio::task::spawn_blocking(move || walker.matching_files(recursive, &filter))
            .await
            .map_err(|e| ContextError::Scan {
                root: root_buf,
                reason: format!("Scan task failed: {}", e),
            })??;

        debug!(root = %root.display(), matched = files.len(), "Bulk scan complete");
        Ok(files)
    }

    fn ignore_dirs(&self) -> &[String] {
        &self.config.ignore_dirs
    }
}
