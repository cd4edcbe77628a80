//! reqctx: Context-Module Resolution
//!
//! Resolves directory context requests (a root, a recursion flag, a filter and a load
//! mode) into generated modules that map every matching file to a loader. Each
//! distinct request gets its own module graph key, and the matched file set is kept
//! current incrementally from module graph deltas.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod generator;
pub mod identity;
pub mod logging;
pub mod matcher;
pub mod paths;
pub mod scan;
pub mod service;
pub mod transform;
pub mod types;
pub mod watch;

pub use cache::{ContextFileSetCache, FileSetResolution, ScanPolicy, ScanStrategy};
pub use error::{ContextError, TransformError};
pub use filter::{CompiledFilter, ContextFilter, PatternCache};
pub use generator::{ContextModuleGenerator, GeneratedContextModule, ReferenceStrategy};
pub use identity::{
    build_synthetic_path, compute_hash, compute_key, strip_synthetic_path, ContextIdentityKey,
};
pub use matcher::ContextFileMatcher;
pub use scan::{BulkMatcher, WalkdirMatcher};
pub use service::{ContextResolution, ContextResolutionService};
pub use transform::{CompiledModule, PassthroughTransformer, TransformOptions, VirtualTransformer};
pub use types::{ContextCriteria, ContextMode, DeltaHint, GraphDelta, MatchQuery};
