//! Configuration System
//!
//! Layered configuration for the resolver and its logging. Sources, lowest precedence
//! first: built-in defaults, the global config file, the workspace `config/` files, and
//! `REQCTX_*` environment variables (`__` separates nested keys, e.g.
//! `REQCTX_RESOLVER__SCAN_POLICY=always-full`).

use crate::cache::ScanPolicy;
use crate::error::ContextError;
use crate::logging::LoggingConfig;
use crate::scan::WalkerConfig;
use crate::transform::TransformOptions;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

mod merge_policy;
mod sources;

pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReqctxConfig {
    /// Context resolution settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Context resolution settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Whether delta hints may patch an existing file set
    #[serde(default)]
    pub scan_policy: ScanPolicy,

    /// Reference bulk matcher settings
    #[serde(default)]
    pub scan: WalkerConfig,

    /// Options forwarded to the transformer for every context module
    #[serde(default)]
    pub transform: TransformOptions,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Resolver(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Resolver(msg) => write!(f, "Resolver: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), String> {
        for dir in &self.scan.ignore_dirs {
            if dir.trim().is_empty() {
                return Err("Ignored directory names cannot be empty".to_string());
            }
            if dir.contains('/') || dir.contains('\\') {
                return Err(format!(
                    "Ignored directory '{}' must be a single path component",
                    dir
                ));
            }
        }
        Ok(())
    }
}

impl ReqctxConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.resolver.validate() {
            errors.push(ValidationError::Resolver(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold any problems into a single error.
    pub fn validated(self) -> Result<Self, ContextError> {
        self.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ContextError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })?;
        Ok(self)
    }
}

/// Loads [`ReqctxConfig`] from the layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    pub fn load(workspace_root: &Path) -> Result<ReqctxConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder);
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root);
        let builder = builder.add_source(Self::environment());
        builder.build()?.try_deserialize()
    }

    /// Load configuration from one explicit file (plus environment overrides).
    pub fn load_from_file(path: &Path) -> Result<ReqctxConfig, ConfigError> {
        merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()
    }

    /// Defaults only.
    pub fn defaults() -> Result<ReqctxConfig, ConfigError> {
        merge_policy::builder_with_defaults()?
            .build()?
            .try_deserialize()
    }

    fn environment() -> Environment {
        Environment::with_prefix("REQCTX")
            .prefix_separator("_")
            .separator("__")
    }
}

impl TryFrom<Config> for ReqctxConfig {
    type Error = ConfigError;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        config.try_deserialize()
    }
}
