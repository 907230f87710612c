//! CLI parse: clap types for nodewatch. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// nodewatch - query and watch Nomad cluster nodes
#[derive(Parser, Debug)]
#[command(name = "nodewatch")]
#[command(about = "Query and watch Nomad cluster nodes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root; config/ under it is searched for config files
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Nomad HTTP API address
    #[arg(long)]
    pub address: Option<String>,

    /// Region sent with every request
    #[arg(long)]
    pub region: Option<String>,

    /// Namespace sent with every request
    #[arg(long)]
    pub namespace: Option<String>,

    /// Allow any server to answer (possibly stale) reads
    #[arg(long)]
    pub stale: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(long)]
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
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Look up a single node by identifier
    Node {
        /// Node identifier; empty lists all nodes
        #[arg(default_value = "")]
        id: String,

        /// Write the snapshot to this file using the configured encoding
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// List nodes, optionally in one datacenter (`@dc`)
    Nodes {
        /// `@<datacenter>`, or `@<region>` with --by-region
        #[arg(default_value = "")]
        selector: String,

        /// Treat the selector as a region instead of a datacenter
        #[arg(long)]
        by_region: bool,

        /// Write the snapshot to this file using the configured encoding
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Poll a node list and print it whenever it changes (Ctrl-C to stop)
    Watch {
        /// `@<datacenter>`, or `@<region>` with --by-region
        #[arg(default_value = "")]
        selector: String,

        #[arg(long)]
        by_region: bool,

        /// Rewrite this file with every new snapshot
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Print the effective configuration
    Config,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
