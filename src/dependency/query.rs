//! Node query: one type for every selector shape.

use async_trait::async_trait;
use std::fmt;
use tracing::trace;

use super::options::QueryOptions;
use super::selector::{QueryKind, Selector};
use super::snapshot::{self, Snapshot};
use super::stop::StopSignal;
use super::{Dependency, DependencyType};
use crate::client::ClientSet;
use crate::error::{ClientError, DependencyError, FieldError};

/// A requested node dependency.
///
/// Selector and kind are fixed at construction. `fetch` may run concurrently
/// on one instance; `stop` may be called from any task or thread.
#[derive(Debug)]
pub struct NodeQuery {
    kind: QueryKind,
    selector: Selector,
    stop: StopSignal,
}

impl NodeQuery {
    /// Parse with the given grammar.
    pub fn parse(kind: QueryKind, input: &str) -> Result<Self, DependencyError> {
        let selector = kind.parse(input)?;
        Ok(Self {
            kind,
            selector,
            stop: StopSignal::new(),
        })
    }

    /// Single node by identifier: `""` or `<name>`.
    pub fn node(input: &str) -> Result<Self, DependencyError> {
        Self::parse(QueryKind::Node, input)
    }

    /// Node list, optionally filtered by datacenter: `""` or `@<dc>`.
    pub fn nodes(input: &str) -> Result<Self, DependencyError> {
        Self::parse(QueryKind::NodesByDatacenter, input)
    }

    /// Node list, optionally scoped to a region: `""` or `@<region>`.
    pub fn nodes_in_region(input: &str) -> Result<Self, DependencyError> {
        Self::parse(QueryKind::NodesByRegion, input)
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    fn ensure_running(&self) -> Result<(), DependencyError> {
        if self.stop.is_stopped() {
            return Err(DependencyError::Stopped);
        }
        Ok(())
    }

    fn backend_error(&self, source: ClientError) -> DependencyError {
        DependencyError::Backend {
            query: self.to_string(),
            source,
        }
    }

    fn malformed(&self, source: FieldError) -> DependencyError {
        DependencyError::MalformedField {
            query: self.to_string(),
            source,
        }
    }
}

#[async_trait]
impl Dependency for NodeQuery {
    async fn fetch(
        &self,
        clients: &ClientSet,
        opts: &QueryOptions,
    ) -> Result<Snapshot, DependencyError> {
        self.ensure_running()?;

        let opts = opts.merge(&self.selector.overlay());
        let client = clients.nomad();

        match &self.selector {
            Selector::Identifier(id) => {
                trace!(
                    query = %self,
                    path = %opts.request_path(&format!("/v1/node/{}", id)),
                    "GET"
                );

                let (node, meta) = client
                    .node_info(id, &opts)
                    .await
                    .map_err(|e| self.backend_error(e))?;
                self.ensure_running()?;

                trace!(query = %self, "returned node info");

                let record = snapshot::build_single(&node, opts.region.as_deref())
                    .map_err(|e| self.malformed(e))?;

                Ok(Snapshot {
                    nodes: vec![record],
                    meta: meta.into(),
                })
            }
            Selector::Datacenter(_) | Selector::Region(_) | Selector::None => {
                trace!(query = %self, path = %opts.request_path("/v1/nodes"), "GET");

                let (stubs, meta) = client
                    .list_nodes(&opts)
                    .await
                    .map_err(|e| self.backend_error(e))?;
                self.ensure_running()?;

                trace!(query = %self, count = stubs.len(), "returned results");

                Ok(Snapshot {
                    nodes: snapshot::build_list(stubs, opts.region.as_deref()),
                    meta: meta.into(),
                })
            }
        }
    }

    fn can_share(&self) -> bool {
        true
    }

    fn stop(&self) {
        self.stop.stop();
    }

    fn stop_signal(&self) -> Option<&StopSignal> {
        Some(&self.stop)
    }

    fn dependency_type(&self) -> DependencyType {
        DependencyType::Nomad
    }
}

impl fmt::Display for NodeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.selector.value() {
            Some(value) => write!(f, "{}(@{})", self.kind.name(), value),
            None => f.write_str(self.kind.name()),
        }
    }
}
