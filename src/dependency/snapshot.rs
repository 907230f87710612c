//! Snapshot Builder
//!
//! Pure mapping from raw backend entries to normalized node records. Given the
//! same entries in the same order, the builder always produces the same
//! records in the same order.

use crate::client::{NodeEntry, NodeStub, QueryMeta};
use crate::error::FieldError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Node attribute holding the `host:port` endpoint a node advertises.
pub const ADVERTISE_ADDRESS_ATTR: &str = "nomad.advertise.address";

/// Normalized node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub name: String,
    pub address: String,
    pub datacenter: String,
    /// Region the node was read from, when the read was region-scoped.
    pub region: Option<String>,
}

/// Consistency point of the read that produced a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub last_index: u64,
    pub last_contact: Duration,
}

impl From<QueryMeta> for ResponseMetadata {
    fn from(meta: QueryMeta) -> Self {
        Self {
            last_index: meta.last_index,
            last_contact: meta.last_contact,
        }
    }
}

/// Result of one successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<NodeRecord>,
    pub meta: ResponseMetadata,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Split a `host:port` or `[host]:port` endpoint.
///
/// The port may be empty; the host may not contain a colon unless bracketed.
pub fn split_host_port(endpoint: &str) -> Result<(&str, &str), String> {
    let missing_port = || format!("address {}: missing port in address", endpoint);
    let too_many_colons = || format!("address {}: too many colons in address", endpoint);

    let colon = endpoint.rfind(':').ok_or_else(missing_port)?;

    let host = if let Some(rest) = endpoint.strip_prefix('[') {
        let end = rest
            .find(']')
            .map(|i| i + 1)
            .ok_or_else(|| format!("address {}: missing ']' in address", endpoint))?;
        match endpoint.as_bytes().get(end + 1) {
            None => return Err(missing_port()),
            Some(b':') if end + 1 == colon => {}
            Some(b':') => return Err(too_many_colons()),
            Some(_) => return Err(missing_port()),
        }
        &endpoint[1..end]
    } else {
        let host = &endpoint[..colon];
        if host.contains(':') {
            return Err(too_many_colons());
        }
        host
    };

    let port = &endpoint[colon + 1..];
    let is_bracket = |c: char| c == '[' || c == ']';
    if host.contains(is_bracket) || port.contains(is_bracket) {
        return Err(format!("address {}: unexpected bracket in address", endpoint));
    }

    Ok((host, port))
}

/// Build the record for a single node looked up by identifier.
///
/// The address comes from the node's advertised endpoint, host part only.
pub fn build_single(node: &NodeEntry, region: Option<&str>) -> Result<NodeRecord, FieldError> {
    let endpoint = node
        .attributes
        .get(ADVERTISE_ADDRESS_ATTR)
        .map(String::as_str)
        .unwrap_or("");

    let (host, _) = split_host_port(endpoint).map_err(|reason| FieldError {
        field: ADVERTISE_ADDRESS_ATTR,
        value: endpoint.to_string(),
        reason,
    })?;

    Ok(NodeRecord {
        id: node.id.clone(),
        name: node.name.clone(),
        address: host.to_string(),
        datacenter: node.datacenter.clone(),
        region: region.map(str::to_string),
    })
}

/// Build records for a node list, stably sorted by name.
pub fn build_list(stubs: Vec<NodeStub>, region: Option<&str>) -> Vec<NodeRecord> {
    let mut records: Vec<NodeRecord> = stubs
        .into_iter()
        .map(|stub| NodeRecord {
            id: stub.id,
            name: stub.name,
            address: stub.address,
            datacenter: stub.datacenter,
            region: region.map(str::to_string),
        })
        .collect();

    sort_by_name(&mut records);
    records
}

/// Ascending by name; equal names keep their relative order.
pub fn sort_by_name(records: &mut [NodeRecord]) {
    records.sort_by(|a, b| a.name.cmp(&b.name));
}
