//! CLI output: error mapping and formatting of resolution results.

use crate::error::ContextError;
use crate::identity::ContextIdentityKey;
use crate::service::ContextResolution;
use crate::watch::WatchUpdate;
use owo_colors::OwoColorize;
use serde_json::json;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &ContextError) -> String {
    match e {
        ContextError::Configuration { .. } | ContextError::UnsupportedMode(_) => {
            format!("Invalid context request: {}", e)
        }
        _ => e.to_string(),
    }
}

pub fn format_generate_text(resolution: &ContextResolution) -> String {
    resolution.compiled.code.clone()
}

pub fn format_generate_json(resolution: &ContextResolution) -> Result<String, ContextError> {
    let module = &resolution.module;
    let value = json!({
        "id": module.id,
        "hash": module.hash,
        "synthetic_path": module.synthetic_path,
        "mode": module.mode,
        "keys": module.keys(),
        "files": module.files,
        "dependencies": resolution.compiled.dependencies,
        "code": resolution.compiled.code,
    });
    serde_json::to_string_pretty(&value)
        .map_err(|e| ContextError::ConfigError(format!("Failed to serialize output: {}", e)))
}

pub fn format_identity_text(identity: &ContextIdentityKey, synthetic_path: &str) -> String {
    format!(
        "{}\n  {}  {}\n  {}  {}\n  {}  {}",
        "Context identity".bold().underline(),
        "key: ".dimmed(),
        identity.key,
        "hash:".dimmed(),
        identity.hash.cyan(),
        "path:".dimmed(),
        synthetic_path
    )
}

pub fn format_identity_json(
    identity: &ContextIdentityKey,
    synthetic_path: &str,
) -> Result<String, ContextError> {
    let value = json!({
        "key": identity.key,
        "hash": identity.hash,
        "synthetic_path": synthetic_path,
    });
    serde_json::to_string_pretty(&value)
        .map_err(|e| ContextError::ConfigError(format!("Failed to serialize output: {}", e)))
}

pub fn format_watch_update(update: &WatchUpdate) -> String {
    let header = if update.batch == 0 {
        format!("{}", "Initial resolution".bold())
    } else {
        let added = format!("+{}", update.delta.added_files.len());
        let removed = format!("-{}", update.delta.deleted_files.len());
        format!(
            "{} {} ({} added, {} removed)",
            "Batch".bold(),
            update.batch,
            added.green(),
            removed.red()
        )
    };
    format!("{}\n{}", header, update.compiled.code)
}
