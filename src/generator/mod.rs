//! Context module generation
//!
//! Turns a resolved file list into the virtual module a dynamic require evaluates to.
//! Generation is two steps: [`ContextModuleGenerator::build_ir`] decides the module's
//! shape from the mode and file list, and [`render::render`] prints it.
//!
//! | mode                | lookup returns          | entries reference |
//! |---------------------|-------------------------|-------------------|
//! | `sync`              | the value               | `require(path)`   |
//! | `eager`             | resolved promise        | `require(path)`   |
//! | `lazy`, `lazy-once` | resolved promise        | `import(path)`    |
//!
//! With no matched files every mode produces the same empty module.

pub mod ir;
pub mod render;

pub use ir::{ContextModuleIr, LookupWrapper, Reference, TableEntry};
pub use render::MODULE_NOT_FOUND_CODE;

use crate::identity::ContextIdentityKey;
use crate::paths::{relative_to, to_request_path};
use crate::types::ContextMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// How each entry refers to the file it exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceStrategy {
    /// Include the file in the bundle with the context module
    Inline,
    /// Load the file when its entry is first read
    OnDemand,
}

impl ReferenceStrategy {
    pub fn for_mode(mode: ContextMode) -> Self {
        if mode.includes_files_inline() {
            ReferenceStrategy::Inline
        } else {
            ReferenceStrategy::OnDemand
        }
    }

    fn reference(&self, file: &Path) -> Reference {
        let path = file.to_string_lossy().into_owned();
        match self {
            ReferenceStrategy::Inline => Reference::Require(path),
            ReferenceStrategy::OnDemand => Reference::Import(path),
        }
    }
}

/// A generated context module. A new resolution always produces a new value.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedContextModule {
    /// Canonical identity key, embedded in the module as its `id`
    pub id: String,
    pub hash: String,
    /// Module graph key the module is compiled under
    pub synthetic_path: String,
    pub mode: ContextMode,
    pub files: Vec<PathBuf>,
    pub ir: ContextModuleIr,
    pub source: String,
}

impl GeneratedContextModule {
    pub fn keys(&self) -> Vec<&str> {
        self.ir.keys()
    }
}

/// Builds context modules for resolved file lists
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextModuleGenerator;

impl ContextModuleGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Decide the module shape. Files outside `root` are skipped.
    pub fn build_ir(
        &self,
        root: &Path,
        files: &[PathBuf],
        id: &str,
        mode: ContextMode,
        strategy: ReferenceStrategy,
    ) -> ContextModuleIr {
        let entries: Vec<TableEntry> = files
            .iter()
            .filter_map(|file| match relative_to(root, file) {
                Some(rel) => Some(TableEntry {
                    key: to_request_path(&rel),
                    reference: strategy.reference(file),
                }),
                None => {
                    warn!(file = %file.display(), root = %root.display(), "File outside context root skipped");
                    None
                }
            })
            .collect();

        if entries.is_empty() {
            return ContextModuleIr::Empty { id: id.to_string() };
        }

        let lookup = match mode {
            ContextMode::Sync => LookupWrapper::Direct,
            ContextMode::Eager | ContextMode::Lazy | ContextMode::LazyOnce => {
                LookupWrapper::Deferred
            }
        };

        ContextModuleIr::Table {
            id: id.to_string(),
            entries,
            lookup,
        }
    }

    /// Build and render the context module for `files`.
    pub fn generate(
        &self,
        root: &Path,
        files: Vec<PathBuf>,
        identity: &ContextIdentityKey,
        synthetic_path: &str,
        mode: ContextMode,
        strategy: ReferenceStrategy,
    ) -> GeneratedContextModule {
        let ir = self.build_ir(root, &files, &identity.key, mode, strategy);
        let source = render::render(&ir);
        GeneratedContextModule {
            id: identity.key.clone(),
            hash: identity.hash.clone(),
            synthetic_path: synthetic_path.to_string(),
            mode,
            files,
            ir,
            source,
        }
    }
}
