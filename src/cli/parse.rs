//! CLI parse: clap types for reqctx. No behavior; definitions only.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// reqctx CLI - resolve and generate context modules
#[derive(Parser)]
#[command(name = "reqctx")]
#[command(about = "Resolve directory context requests into generated modules")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the generated module for a context request
    Generate {
        #[command(flatten)]
        request: ContextArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the identity key, hash and synthetic path of a context request
    Id {
        #[command(flatten)]
        request: ContextArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Regenerate the module whenever files appear or disappear
    Watch {
        #[command(flatten)]
        request: ContextArgs,
        /// Batch window in milliseconds
        #[arg(long, default_value = "50")]
        batch_window_ms: u64,
    },
}

/// Arguments describing one context request
#[derive(Args, Debug, Clone)]
pub struct ContextArgs {
    /// Context root directory (relative paths resolve against the workspace)
    pub dir: PathBuf,

    /// Filter pattern tested against `./`-prefixed relative paths
    #[arg(long, default_value = ".*")]
    pub filter: String,

    /// Filter flags (any of g, i, m, s, u, y)
    #[arg(long, default_value = "")]
    pub flags: String,

    /// Include files in subdirectories
    #[arg(long)]
    pub recursive: bool,

    /// Load mode (sync, eager, lazy, lazy-once)
    #[arg(long, default_value = "sync")]
    pub mode: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
