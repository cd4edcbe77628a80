//! Context resolution service
//!
//! Long-lived owner of the file-set cache, the compiled-pattern cache and the set of
//! context modules the module graph currently holds. One instance per bundler session.
//!
//! Resolution of a context request:
//! 1. compile the filter (memoized per service)
//! 2. derive the identity key and synthetic path
//! 3. resolve the file set (full scan or patch)
//! 4. generate the module with the mode's reference strategy
//! 5. compile it through the [`VirtualTransformer`] at the synthetic path

use crate::cache::{ContextFileSetCache, ScanStrategy};
use crate::config::ResolverConfig;
use crate::error::ContextError;
use crate::filter::{CompiledFilter, PatternCache};
use crate::generator::{ContextModuleGenerator, GeneratedContextModule, ReferenceStrategy};
use crate::identity::{is_synthetic_path, synthetic_path_with_hash, ContextIdentityKey};
use crate::scan::BulkMatcher;
use crate::transform::{CompiledModule, TransformOptions, VirtualTransformer};
use crate::types::{ContextCriteria, DeltaHint, GraphDelta};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Outcome of one resolution
#[derive(Debug, Clone)]
pub struct ContextResolution {
    pub module: GeneratedContextModule,
    pub compiled: CompiledModule,
    pub strategy: ScanStrategy,
}

/// A context module the graph holds, with changes not yet applied to it
#[derive(Debug, Clone)]
struct TrackedContext {
    root: PathBuf,
    pending: Option<DeltaHint>,
}

pub struct ContextResolutionService {
    cache: ContextFileSetCache,
    patterns: PatternCache,
    generator: ContextModuleGenerator,
    transformer: Arc<dyn VirtualTransformer>,
    options: TransformOptions,
    tracked: RwLock<HashMap<String, TrackedContext>>,
}

impl ContextResolutionService {
    pub fn new(
        bulk_matcher: Arc<dyn BulkMatcher>,
        transformer: Arc<dyn VirtualTransformer>,
        config: &ResolverConfig,
    ) -> Self {
        Self {
            cache: ContextFileSetCache::new(bulk_matcher, config.scan_policy),
            patterns: PatternCache::new(),
            generator: ContextModuleGenerator::new(),
            transformer,
            options: config.transform.clone(),
            tracked: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_transform_options(mut self, options: TransformOptions) -> Self {
        self.options = options;
        self
    }

    pub fn cache(&self) -> &ContextFileSetCache {
        &self.cache
    }

    pub fn transform_options(&self) -> &TransformOptions {
        &self.options
    }

    /// Synthetic path the context module for `criteria` is registered under.
    pub fn synthetic_path(
        &self,
        module_path: &Path,
        criteria: &ContextCriteria,
    ) -> Result<String, ContextError> {
        let filter = self.compile_filter(criteria)?;
        let identity = ContextIdentityKey::with_compiled(criteria, &filter);
        Ok(synthetic_path_with_hash(
            &module_path.to_string_lossy(),
            &identity.hash,
        ))
    }

    /// Resolve, generate and compile the context module for `criteria`.
    ///
    /// `module_path` is the directory the synthetic path is built from, normally the
    /// context root. Without `delta` the file set is fully rescanned.
    #[instrument(
        skip(self, module_path, criteria, delta),
        fields(module_path = %module_path.display(), mode = %criteria.mode)
    )]
    pub async fn resolve(
        &self,
        module_path: &Path,
        criteria: &ContextCriteria,
        delta: Option<&DeltaHint>,
    ) -> Result<ContextResolution, ContextError> {
        let filter = self.compile_filter(criteria)?;
        let identity = ContextIdentityKey::with_compiled(criteria, &filter);
        let synthetic_path =
            synthetic_path_with_hash(&module_path.to_string_lossy(), &identity.hash);

        let resolution = self
            .cache
            .resolve(&synthetic_path, criteria, &filter, delta)
            .await?;

        let module = self.generator.generate(
            &criteria.root,
            resolution.files,
            &identity,
            &synthetic_path,
            criteria.mode,
            ReferenceStrategy::for_mode(criteria.mode),
        );

        let compiled = self
            .transformer
            .transform_virtual_file(&synthetic_path, &self.options, module.source.as_bytes())
            .await?;

        // deltas recorded while this resolution was in flight stay pending
        self.tracked
            .write()
            .entry(synthetic_path.clone())
            .and_modify(|context| context.root = criteria.root.clone())
            .or_insert_with(|| TrackedContext {
                root: criteria.root.clone(),
                pending: None,
            });

        info!(
            synthetic_path = %synthetic_path,
            files = module.files.len(),
            strategy = ?resolution.strategy,
            "Resolved context module"
        );

        Ok(ContextResolution {
            module,
            compiled,
            strategy: resolution.strategy,
        })
    }

    /// Transform-slot entry point: recompile the context module using whatever graph
    /// changes were recorded for it since its last resolution.
    ///
    /// On failure the pending delta is put back so the next attempt still sees it.
    pub async fn transform_context_module(
        &self,
        module_path: &Path,
        criteria: &ContextCriteria,
    ) -> Result<CompiledModule, ContextError> {
        let synthetic_path = self.synthetic_path(module_path, criteria)?;
        let pending = self.take_pending(&synthetic_path);

        match self.resolve(module_path, criteria, pending.as_ref()).await {
            Ok(resolution) => Ok(resolution.compiled),
            Err(e) => {
                if let Some(delta) = pending {
                    self.restore_pending(&synthetic_path, &criteria.root, delta);
                }
                Err(e)
            }
        }
    }

    /// Record a module graph change. Returns how many tracked context modules saw a
    /// relevant path.
    ///
    /// Every tracked context still gets a pending (possibly empty) hint, so its next
    /// resolution patches instead of rescanning. Context modules the graph lists are
    /// virtual and never become candidate files.
    pub fn record_graph_delta(&self, delta: &GraphDelta) -> usize {
        let is_file = |path: &&PathBuf| !is_synthetic_path(&path.to_string_lossy());
        let hint = DeltaHint::new(
            delta.added_files.iter().filter(is_file).cloned(),
            delta.deleted_files.iter().filter(is_file).cloned(),
        );
        let mut affected = 0;
        let mut tracked = self.tracked.write();
        for (path, context) in tracked.iter_mut() {
            let scoped = hint.scoped_to(&context.root);
            if !scoped.is_empty() {
                affected += 1;
                debug!(synthetic_path = %path, added = scoped.added.len(), removed = scoped.removed.len(), "Queued delta for context module");
            }
            match context.pending.as_mut() {
                Some(pending) => pending.merge(scoped),
                None => context.pending = Some(scoped),
            }
        }
        affected
    }

    /// Forget a context module the graph no longer references.
    pub fn release(&self, synthetic_path: &str) -> bool {
        let was_tracked = self.tracked.write().remove(synthetic_path).is_some();
        let had_baseline = self.cache.invalidate(synthetic_path);
        was_tracked || had_baseline
    }

    pub fn is_tracked(&self, synthetic_path: &str) -> bool {
        self.tracked.read().contains_key(synthetic_path)
    }

    /// Pending delta for a tracked context, if any.
    pub fn pending_delta(&self, synthetic_path: &str) -> Option<DeltaHint> {
        self.tracked
            .read()
            .get(synthetic_path)
            .and_then(|context| context.pending.clone())
    }

    pub fn tracked_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.tracked.read().keys().cloned().collect();
        paths.sort();
        paths
    }

    fn compile_filter(&self, criteria: &ContextCriteria) -> Result<Arc<CompiledFilter>, ContextError> {
        self.patterns.compile(&criteria.filter)
    }

    fn take_pending(&self, synthetic_path: &str) -> Option<DeltaHint> {
        self.tracked
            .write()
            .get_mut(synthetic_path)
            .and_then(|context| context.pending.take())
    }

    fn restore_pending(&self, synthetic_path: &str, root: &Path, delta: DeltaHint) {
        let mut tracked = self.tracked.write();
        let context = tracked
            .entry(synthetic_path.to_string())
            .or_insert_with(|| TrackedContext {
                root: root.to_path_buf(),
                pending: None,
            });
        match context.pending.take() {
            Some(later) => {
                let mut merged = delta;
                merged.merge(later);
                context.pending = Some(merged);
            }
            None => context.pending = Some(delta),
        }
    }
}
