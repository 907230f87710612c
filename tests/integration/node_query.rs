//! Integration tests for single-node queries

use crate::integration::test_utils::{node_entry, node_stub, Call, RecordingNodeClient};
use nodewatch::client::ClientSet;
use nodewatch::dependency::{Dependency, NodeQuery, QueryOptions};
use nodewatch::error::{ClientError, DependencyError};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_fetch_node_by_identifier() {
    let client = Arc::new(
        RecordingNodeClient::new()
            .with_entry(node_entry("node1", "client-1", "dc1", Some("10.0.0.5:4646")))
            .with_meta(42, Duration::from_millis(7)),
    );
    let clients = ClientSet::new(client.clone());
    let query = NodeQuery::node("node1").unwrap();

    let snapshot = query
        .fetch(&clients, &QueryOptions::new().with_region("global"))
        .await
        .unwrap();

    assert_eq!(snapshot.len(), 1);
    let record = &snapshot.nodes[0];
    assert_eq!(record.id, "node1");
    assert_eq!(record.name, "client-1");
    assert_eq!(record.address, "10.0.0.5");
    assert_eq!(record.datacenter, "dc1");
    assert_eq!(record.region.as_deref(), Some("global"));
    assert_eq!(snapshot.meta.last_index, 42);
    assert_eq!(snapshot.meta.last_contact, Duration::from_millis(7));

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, Call::Info("node1".to_string()));
    assert_eq!(calls[0].1.region.as_deref(), Some("global"));
    assert_eq!(calls[0].1.filter, None);
}

#[tokio::test]
async fn test_fetch_node_ipv6_endpoint() {
    let client = Arc::new(
        RecordingNodeClient::new().with_entry(node_entry("n6", "v6", "dc1", Some("[fd00::5]:4646"))),
    );
    let clients = ClientSet::new(client);

    let snapshot = NodeQuery::node("n6")
        .unwrap()
        .fetch(&clients, &QueryOptions::new())
        .await
        .unwrap();
    assert_eq!(snapshot.nodes[0].address, "fd00::5");
}

#[tokio::test]
async fn test_fetch_node_with_malformed_endpoint() {
    let client = Arc::new(
        RecordingNodeClient::new().with_entry(node_entry("node1", "client-1", "dc1", Some("10.0.0.5"))),
    );
    let clients = ClientSet::new(client);
    let query = NodeQuery::node("node1").unwrap();

    let err = query.fetch(&clients, &QueryOptions::new()).await.unwrap_err();
    assert!(err.is_backend());
    assert!(matches!(err, DependencyError::MalformedField { .. }));
    let message = err.to_string();
    assert!(message.starts_with("nomad.node(@node1): "), "{}", message);
    assert!(message.contains("missing port"), "{}", message);
}

#[tokio::test]
async fn test_fetch_node_without_endpoint_attribute() {
    let client = Arc::new(
        RecordingNodeClient::new().with_entry(node_entry("node1", "client-1", "dc1", None)),
    );
    let clients = ClientSet::new(client);

    let err = NodeQuery::node("node1")
        .unwrap()
        .fetch(&clients, &QueryOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DependencyError::MalformedField { .. }));
}

#[tokio::test]
async fn test_fetch_unknown_node_is_backend_error() {
    let client = Arc::new(RecordingNodeClient::new());
    let clients = ClientSet::new(client);

    let err = NodeQuery::node("ghost")
        .unwrap()
        .fetch(&clients, &QueryOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_backend());
    assert!(matches!(err.client_error(), Some(ClientError::NotFound(_))));
}

#[tokio::test]
async fn test_empty_identifier_lists_all_nodes() {
    let client = Arc::new(RecordingNodeClient::new().with_stubs(vec![
        node_stub("2", "zeta", "10.0.0.2", "dc2"),
        node_stub("1", "alpha", "10.0.0.1", "dc1"),
    ]));
    let clients = ClientSet::new(client.clone());
    let query = NodeQuery::node("").unwrap();
    assert_eq!(query.to_string(), "nomad.node");

    let snapshot = query.fetch(&clients, &QueryOptions::new()).await.unwrap();
    let names: Vec<&str> = snapshot.nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
    assert_eq!(client.calls()[0].0, Call::List);
    assert_eq!(client.calls()[0].1.filter, None);
}

#[tokio::test]
async fn test_caller_options_are_not_mutated() {
    let client = Arc::new(
        RecordingNodeClient::new()
            .with_entry(node_entry("node1", "client-1", "dc1", Some("10.0.0.5:4646"))),
    );
    let clients = ClientSet::new(client);
    let opts = QueryOptions::new().with_namespace("apps").with_filter("Status == \"ready\"");
    let before = opts.clone();

    NodeQuery::node("node1")
        .unwrap()
        .fetch(&clients, &opts)
        .await
        .unwrap();
    assert_eq!(opts, before);
}

#[test]
fn test_invalid_identifiers_are_rejected() {
    for input in ["@dc1", "has space", "a/b", "node:1"] {
        let err = NodeQuery::node(input).unwrap_err();
        assert!(
            matches!(err, DependencyError::InvalidSelector { kind: "nomad.node", .. }),
            "{:?} should be rejected",
            input
        );
    }
}
