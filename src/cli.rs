//! CLI domain: parse, route and output only.

mod output;
mod parse;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, ContextArgs, OutputFormat};
pub use route::RunContext;
