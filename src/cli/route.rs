//! CLI route: run context and the single route table.

use crate::cli::output::render_snapshot;
use crate::cli::parse::{Cli, Commands, OutputFormat};
use crate::client::{ClientSet, NodeClient};
use crate::codec::CodecRegistry;
use crate::config::{ConfigLoader, NodewatchConfig};
use crate::dependency::{Dependency, NodeQuery, QueryKind, Snapshot};
use crate::error::CommandError;
use crate::poll::Poller;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Load configuration the way the CLI does: an explicit `--config` file, or
/// the layered workspace lookup, then CLI flag overrides on top.
pub fn load_config(cli: &Cli) -> Result<NodewatchConfig, CommandError> {
    let mut config = match cli.config {
        Some(ref path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load(&cli.workspace)?,
    };
    apply_overrides(&mut config, cli);
    config.validate()?;
    Ok(config)
}

/// Apply connection flags. Logging flags are applied by the binary before
/// the subscriber is installed.
pub fn apply_overrides(config: &mut NodewatchConfig, cli: &Cli) {
    if let Some(ref address) = cli.address {
        config.nomad.address = address.clone();
    }
    if let Some(ref region) = cli.region {
        config.nomad.region = Some(region.clone());
    }
    if let Some(ref namespace) = cli.namespace {
        config.nomad.namespace = Some(namespace.clone());
    }
    if cli.stale {
        config.nomad.stale = true;
    }
}

fn list_kind(by_region: bool) -> QueryKind {
    if by_region {
        QueryKind::NodesByRegion
    } else {
        QueryKind::NodesByDatacenter
    }
}

/// Runtime context for CLI execution: effective config, clients and codecs.
pub struct RunContext {
    config: NodewatchConfig,
    clients: Arc<ClientSet>,
    codecs: CodecRegistry,
    format: OutputFormat,
}

impl RunContext {
    /// Build the HTTP client from `config`.
    pub fn new(config: NodewatchConfig, format: OutputFormat) -> Result<Self, CommandError> {
        let client = config.nomad.build_client()?;
        Ok(Self::with_client(config, Arc::new(client), format))
    }

    /// Use an already constructed client.
    pub fn with_client(
        config: NodewatchConfig,
        client: Arc<dyn NodeClient>,
        format: OutputFormat,
    ) -> Self {
        let codecs = config.codec.registry();
        Self {
            config,
            clients: Arc::new(ClientSet::new(client)),
            codecs,
            format,
        }
    }

    pub fn config(&self) -> &NodewatchConfig {
        &self.config
    }

    pub fn clients(&self) -> Arc<ClientSet> {
        Arc::clone(&self.clients)
    }

    /// Execute a CLI command via the single route table.
    pub async fn execute(&self, command: &Commands) -> Result<String, CommandError> {
        match command {
            Commands::Node { id, save } => {
                let query = NodeQuery::node(id)?;
                self.run_once(query, save.as_deref()).await
            }
            Commands::Nodes {
                selector,
                by_region,
                save,
            } => {
                let query = NodeQuery::parse(list_kind(*by_region), selector)?;
                self.run_once(query, save.as_deref()).await
            }
            Commands::Watch {
                selector,
                by_region,
                save,
            } => {
                let query = NodeQuery::parse(list_kind(*by_region), selector)?;
                self.run_watch(query, save.as_deref()).await
            }
            Commands::Config => self.config.redacted().to_toml().map_err(CommandError::from),
        }
    }

    async fn run_once(&self, query: NodeQuery, save: Option<&Path>) -> Result<String, CommandError> {
        let opts = self.config.nomad.query_options();
        debug!(query = %query, "Fetching");
        let snapshot = query.fetch(&self.clients, &opts).await?;
        if let Some(path) = save {
            self.save(&query, &snapshot, path)?;
        }
        render_snapshot(&snapshot, self.format)
    }

    async fn run_watch(&self, query: NodeQuery, save: Option<&Path>) -> Result<String, CommandError> {
        let query = Arc::new(query);
        let poller = Arc::new(Poller::new(
            query.clone(),
            self.clients(),
            self.config.nomad.query_options(),
            self.config.poll.clone(),
        ));

        let interrupt = {
            let poller = Arc::clone(&poller);
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("Interrupted");
                        poller.stop();
                    }
                    Err(e) => warn!(error = %e, "Cannot listen for Ctrl-C"),
                }
            })
        };

        let format = self.format;
        let outcome = poller
            .run(|snapshot| {
                match render_snapshot(snapshot, format) {
                    Ok(out) => println!("{}", out),
                    Err(e) => warn!(error = %e, "Failed to render snapshot"),
                }
                if let Some(path) = save {
                    if let Err(e) = self.save(query.as_ref(), snapshot, path) {
                        warn!(error = %e, path = %path.display(), "Failed to save snapshot");
                    }
                }
            })
            .await;
        interrupt.abort();

        Ok(format!(
            "{}: stopped after {} update(s), {} failed fetch(es)",
            query, outcome.emitted, outcome.failures
        ))
    }

    fn save(&self, query: &NodeQuery, snapshot: &Snapshot, path: &Path) -> Result<(), CommandError> {
        let bytes = self.codecs.encode(query.dependency_type(), snapshot)?;
        std::fs::write(path, bytes)?;
        debug!(path = %path.display(), "Snapshot saved");
        Ok(())
    }
}
