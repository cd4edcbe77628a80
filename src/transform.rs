//! Compile step for synthesized context modules
//!
//! The bundler's transform pipeline is an external collaborator. A context module is
//! handed to it as if it were a real file living at its synthetic path, so the compiled
//! artifact is cached under a key specific to the context criteria.

use crate::error::TransformError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Options forwarded untouched to the transformer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformOptions {
    /// Target platform, if the bundle is platform specific
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub dev: bool,
    #[serde(default)]
    pub minify: bool,
}

/// Output of the transformer for one virtual file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledModule {
    /// Module graph key the output was compiled under
    pub path: String,
    pub code: String,
    /// Files the compiled code references
    pub dependencies: Vec<PathBuf>,
}

/// Compiles synthesized source as if it were a file at `path`
#[async_trait]
pub trait VirtualTransformer: Send + Sync {
    async fn transform_virtual_file(
        &self,
        path: &str,
        options: &TransformOptions,
        source: &[u8],
    ) -> Result<CompiledModule, TransformError>;
}

/// Transformer that returns the source unchanged.
///
/// Used by the CLI, which only needs to show the generated module. Reports no
/// dependencies; the generated module already lists the files it references.
#[derive(Debug, Clone, Default)]
pub struct PassthroughTransformer;

#[async_trait]
impl VirtualTransformer for PassthroughTransformer {
    async fn transform_virtual_file(
        &self,
        path: &str,
        _options: &TransformOptions,
        source: &[u8],
    ) -> Result<CompiledModule, TransformError> {
        let code = String::from_utf8(source.to_vec())
            .map_err(|e| TransformError::msg(format!("{} is not valid UTF-8: {}", path, e)))?;
        Ok(CompiledModule {
            path: path.to_string(),
            code,
            dependencies: Vec::new(),
        })
    }
}
