//! CLI route: run context and command dispatch.

use crate::cli::output::{
    format_generate_json, format_generate_text, format_identity_json, format_identity_text,
    format_watch_update,
};
use crate::cli::parse::{Commands, ContextArgs, OutputFormat};
use crate::config::{ConfigLoader, ReqctxConfig};
use crate::error::ContextError;
use crate::filter::ContextFilter;
use crate::identity::{build_synthetic_path, ContextIdentityKey};
use crate::paths::canonicalize_root;
use crate::scan::WalkdirMatcher;
use crate::service::ContextResolutionService;
use crate::transform::PassthroughTransformer;
use crate::types::{ContextCriteria, ContextMode};
use crate::watch::{ContextWatcher, WatchConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Runtime context for CLI execution: workspace, configuration and the service.
pub struct RunContext {
    workspace_root: PathBuf,
    config: ReqctxConfig,
    service: Arc<ContextResolutionService>,
    runtime: tokio::runtime::Runtime,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ContextError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        let config = config.validated()?;

        let service = Arc::new(ContextResolutionService::new(
            Arc::new(WalkdirMatcher::new(config.resolver.scan.clone())),
            Arc::new(PassthroughTransformer),
            &config.resolver,
        ));

        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| ContextError::ConfigError(format!("Failed to create tokio runtime: {}", e)))?;

        Ok(Self {
            workspace_root,
            config,
            service,
            runtime,
        })
    }

    pub fn config(&self) -> &ReqctxConfig {
        &self.config
    }

    /// Execute a command and return the text to print.
    pub fn execute(&self, command: &Commands) -> Result<String, ContextError> {
        match command {
            Commands::Generate { request, format } => {
                let criteria = self.criteria(request)?;
                let resolution = self.runtime.block_on(self.service.resolve(
                    &criteria.root,
                    &criteria,
                    None,
                ))?;
                match format {
                    OutputFormat::Text => Ok(format_generate_text(&resolution)),
                    OutputFormat::Json => format_generate_json(&resolution),
                }
            }
            Commands::Id { request, format } => {
                let criteria = self.criteria(request)?;
                let identity = ContextIdentityKey::for_criteria(&criteria)?;
                let synthetic_path =
                    build_synthetic_path(&criteria.root.to_string_lossy(), &criteria)?;
                match format {
                    OutputFormat::Text => Ok(format_identity_text(&identity, &synthetic_path)),
                    OutputFormat::Json => format_identity_json(&identity, &synthetic_path),
                }
            }
            Commands::Watch {
                request,
                batch_window_ms,
            } => {
                let criteria = self.criteria(request)?;
                let watch_config = WatchConfig {
                    batch_window_ms: *batch_window_ms,
                    ignore_dirs: self.config.resolver.scan.ignore_dirs.clone(),
                    ..WatchConfig::default()
                };
                let watcher =
                    ContextWatcher::new(Arc::clone(&self.service), criteria, watch_config);
                watcher.run(self.runtime.handle(), |update| {
                    println!("{}", format_watch_update(update));
                })?;
                Ok(String::new())
            }
        }
    }

    /// Build criteria from arguments. The mode is parsed first so an unknown mode is
    /// reported even when the directory does not exist.
    fn criteria(&self, args: &ContextArgs) -> Result<ContextCriteria, ContextError> {
        let mode: ContextMode = args.mode.parse()?;
        let filter = ContextFilter::new(args.filter.clone(), args.flags.clone());
        filter.canonical()?;

        let dir = if args.dir.is_absolute() {
            args.dir.clone()
        } else {
            self.workspace_root.join(&args.dir)
        };
        let root = canonicalize_root(&dir)?;
        info!(root = %root.display(), %mode, "Context request");

        ContextCriteria::new(root, args.recursive, filter, mode)
    }
}
