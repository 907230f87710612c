//! CLI domain: parse, route and output only.
//! Query semantics live in the dependency module; the route table only wires them up.

mod output;
mod parse;
mod route;

pub use output::{map_error, render_snapshot};
pub use parse::{Cli, Commands, OutputFormat};
pub use route::{apply_overrides, load_config, RunContext};
