//! Backend Client Abstraction
//!
//! The cluster operations a node query needs: look one node up by identifier,
//! or list node stubs under a set of query options. [`HttpNodeClient`] talks
//! to the Nomad HTTP API; tests plug in their own implementations.

use crate::dependency::QueryOptions;
use crate::error::ClientError;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub mod http;

pub use http::HttpNodeClient;

/// Full node as returned by a by-identifier lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeEntry {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub datacenter: String,
    #[serde(default)]
    pub status: String,
    /// Fingerprinted attributes; `nomad.advertise.address` holds the `host:port` endpoint.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// Node summary as returned by a list call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeStub {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub datacenter: String,
    #[serde(default)]
    pub status: String,
}

/// Consistency point of a backend read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryMeta {
    pub last_index: u64,
    pub last_contact: Duration,
    pub known_leader: bool,
}

/// Cluster node operations
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Look up a single node by identifier
    async fn node_info(
        &self,
        id: &str,
        opts: &QueryOptions,
    ) -> Result<(NodeEntry, QueryMeta), ClientError>;

    /// List node stubs matching the options
    async fn list_nodes(
        &self,
        opts: &QueryOptions,
    ) -> Result<(Vec<NodeStub>, QueryMeta), ClientError>;

    /// Base address of the backend, for diagnostics
    fn address(&self) -> &str;
}

/// Clients handed to every fetch.
///
/// The Nomad client can be replaced at runtime (e.g. after a config reload);
/// fetches already running keep the client they started with.
pub struct ClientSet {
    nomad: RwLock<Arc<dyn NodeClient>>,
}

impl ClientSet {
    pub fn new(nomad: Arc<dyn NodeClient>) -> Self {
        Self {
            nomad: RwLock::new(nomad),
        }
    }

    /// Current Nomad client.
    pub fn nomad(&self) -> Arc<dyn NodeClient> {
        Arc::clone(&self.nomad.read())
    }

    /// Swap the Nomad client, returning the previous one.
    pub fn replace_nomad(&self, nomad: Arc<dyn NodeClient>) -> Arc<dyn NodeClient> {
        std::mem::replace(&mut *self.nomad.write(), nomad)
    }
}

impl std::fmt::Debug for ClientSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSet")
            .field("nomad", &self.nomad.read().address())
            .finish()
    }
}

#[cfg(test)]
pub struct MockNodeClient {
    address: String,
    nodes: Vec<NodeStub>,
    calls: parking_lot::Mutex<usize>,
}

#[cfg(test)]
impl MockNodeClient {
    pub fn new(address: &str, nodes: Vec<NodeStub>) -> Self {
        Self {
            address: address.to_string(),
            nodes,
            calls: parking_lot::Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[cfg(test)]
#[async_trait]
impl NodeClient for MockNodeClient {
    async fn node_info(
        &self,
        id: &str,
        _opts: &QueryOptions,
    ) -> Result<(NodeEntry, QueryMeta), ClientError> {
        *self.calls.lock() += 1;
        Err(ClientError::NotFound(format!("node {} not found", id)))
    }

    async fn list_nodes(
        &self,
        _opts: &QueryOptions,
    ) -> Result<(Vec<NodeStub>, QueryMeta), ClientError> {
        *self.calls.lock() += 1;
        Ok((
            self.nodes.clone(),
            QueryMeta {
                last_index: 10,
                ..Default::default()
            },
        ))
    }

    fn address(&self) -> &str {
        &self.address
    }
}
