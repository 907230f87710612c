//! Integration tests for stopping queries from other tasks and threads

use crate::integration::test_utils::{node_stub, RecordingNodeClient};
use futures::future::join_all;
use nodewatch::client::ClientSet;
use nodewatch::dependency::{Dependency, NodeQuery, QueryOptions};
use std::sync::Arc;
use std::time::Duration;

fn populated_client() -> Arc<RecordingNodeClient> {
    Arc::new(RecordingNodeClient::new().with_stubs(vec![node_stub("1", "alpha", "10.0.0.1", "dc1")]))
}

#[tokio::test]
async fn test_stopped_query_never_calls_backend() {
    let client = populated_client();
    let clients = ClientSet::new(client.clone());
    let query = NodeQuery::nodes("@dc1").unwrap();

    query.stop();
    for _ in 0..3 {
        let err = query.fetch(&clients, &QueryOptions::new()).await.unwrap_err();
        assert!(err.is_stopped());
    }
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_stop_during_backend_call_discards_result() {
    let client = populated_client();
    let clients = ClientSet::new(client.clone());
    let query = Arc::new(NodeQuery::nodes("@dc1").unwrap());

    let stopper = Arc::clone(&query);
    client.during_call(move || stopper.stop());

    let err = query.fetch(&clients, &QueryOptions::new()).await.unwrap_err();
    assert!(err.is_stopped());
    assert_eq!(client.call_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_fetch_and_stop() {
    let client = Arc::new(
        RecordingNodeClient::new()
            .with_stubs(vec![node_stub("1", "alpha", "10.0.0.1", "dc1")])
            .with_delay(Duration::from_millis(5)),
    );
    let clients = Arc::new(ClientSet::new(client.clone()));
    let query = Arc::new(NodeQuery::nodes("").unwrap());

    let fetches = (0..16).map(|_| {
        let query = Arc::clone(&query);
        let clients = Arc::clone(&clients);
        tokio::spawn(async move { query.fetch(&clients, &QueryOptions::new()).await })
    });
    let stops = (0..4).map(|_| {
        let query = Arc::clone(&query);
        tokio::spawn(async move { query.stop() })
    });

    let fetch_handles: Vec<_> = fetches.collect();
    join_all(stops.collect::<Vec<_>>()).await;

    // Every fetch either completed normally or observed the stop.
    for result in join_all(fetch_handles).await {
        match result.unwrap() {
            Ok(snapshot) => assert_eq!(snapshot.len(), 1),
            Err(e) => assert!(e.is_stopped(), "unexpected error: {}", e),
        }
    }

    let calls_after_stop = client.call_count();
    let err = query.fetch(&clients, &QueryOptions::new()).await.unwrap_err();
    assert!(err.is_stopped());
    assert_eq!(client.call_count(), calls_after_stop);
}

#[test]
fn test_stop_from_many_threads() {
    let query = Arc::new(NodeQuery::node("node1").unwrap());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let query = Arc::clone(&query);
            std::thread::spawn(move || query.stop())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(query.is_stopped());
}

#[tokio::test]
async fn test_stopping_one_query_leaves_others_running() {
    let client = populated_client();
    let clients = ClientSet::new(client.clone());
    let stopped = NodeQuery::nodes("@dc1").unwrap();
    let running = NodeQuery::nodes("@dc1").unwrap();

    stopped.stop();

    assert!(stopped.fetch(&clients, &QueryOptions::new()).await.is_err());
    assert!(running.fetch(&clients, &QueryOptions::new()).await.is_ok());
    assert_eq!(client.call_count(), 1);
}
