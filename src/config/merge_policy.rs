//! Merge rules: defaults, override order, conflict handling.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Later sources override earlier ones key by key; tables are merged, arrays replaced.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("resolver.scan_policy", "incremental")?
        .set_default("resolver.scan.follow_symlinks", false)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")
}
