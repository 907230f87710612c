//! Integration tests for the polling driver

use crate::integration::test_utils::{node_stub, RecordingNodeClient};
use nodewatch::client::ClientSet;
use nodewatch::config::PollConfig;
use nodewatch::dependency::{Dependency, NodeQuery, QueryOptions};
use nodewatch::error::ClientError;
use nodewatch::poll::Poller;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

fn slow_client() -> Arc<RecordingNodeClient> {
    Arc::new(
        RecordingNodeClient::new()
            .with_stubs(vec![
                node_stub("2", "bravo", "10.0.0.2", "dc1"),
                node_stub("1", "alpha", "10.0.0.1", "dc1"),
            ])
            .with_meta(7, Duration::ZERO)
            // Stands in for the server holding a blocking query.
            .with_delay(Duration::from_secs(1)),
    )
}

#[tokio::test(start_paused = true)]
async fn test_poller_blocks_on_last_index() {
    let client = slow_client();
    let clients = Arc::new(ClientSet::new(client.clone()));
    let query = Arc::new(NodeQuery::nodes("@dc1").unwrap());
    let poller = Arc::new(Poller::new(
        query,
        clients,
        QueryOptions::new().with_region("global"),
        PollConfig::default(),
    ));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let runner = {
        let poller = Arc::clone(&poller);
        let seen = Arc::clone(&seen);
        tokio::spawn(async move {
            poller
                .run(move |snapshot| {
                    let names: Vec<String> =
                        snapshot.nodes.iter().map(|n| n.name.clone()).collect();
                    seen.lock().push(names);
                })
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(3500)).await;
    client.set_meta(8, Duration::ZERO);
    tokio::time::sleep(Duration::from_secs(2)).await;
    poller.stop();
    let outcome = runner.await.unwrap();

    assert_eq!(outcome.emitted, 2);
    assert_eq!(outcome.last_index, 8);
    assert_eq!(seen.lock().len(), 2);
    assert_eq!(seen.lock()[0], vec!["alpha", "bravo"]);

    let calls = client.calls();
    assert!(calls.len() >= 4, "expected repeated polls, got {}", calls.len());
    assert_eq!(calls[0].1.wait_index, Some(0));
    assert_eq!(calls[1].1.wait_index, Some(7));
    assert_eq!(calls[1].1.wait_time, Some(Duration::from_secs(300)));
    assert!(calls
        .iter()
        .all(|(_, opts)| opts.region.as_deref() == Some("global")
            && opts.filter.as_deref() == Some("Datacenter == dc1")));
}

#[tokio::test(start_paused = true)]
async fn test_poller_retries_with_backoff() {
    let client = Arc::new(
        RecordingNodeClient::new()
            .with_stubs(vec![node_stub("1", "alpha", "10.0.0.1", "dc1")])
            .with_meta(3, Duration::ZERO)
            .with_delay(Duration::from_millis(10)),
    );
    client.fail_with(Some(ClientError::Connection("connection refused".to_string())));

    let clients = Arc::new(ClientSet::new(client.clone()));
    let poller = Arc::new(Poller::new(
        Arc::new(NodeQuery::nodes("").unwrap()),
        clients,
        QueryOptions::new(),
        PollConfig::default(),
    ));

    let runner = {
        let poller = Arc::clone(&poller);
        tokio::spawn(async move { poller.run(|_| {}).await })
    };

    // Attempts at ~0ms, ~260ms, ~770ms: backoff 250ms then 500ms.
    tokio::time::sleep(Duration::from_secs(1)).await;
    let failing_calls = client.call_count();
    assert_eq!(failing_calls, 3);

    client.fail_with(None);
    tokio::time::sleep(Duration::from_secs(2)).await;
    poller.stop();
    let outcome = runner.await.unwrap();

    assert_eq!(outcome.failures, 3);
    assert_eq!(outcome.emitted, 1);
}

#[tokio::test(start_paused = true)]
async fn test_stopping_the_query_ends_the_poller() {
    let client = slow_client();
    let clients = Arc::new(ClientSet::new(client.clone()));
    let query = Arc::new(NodeQuery::nodes("").unwrap());
    let poller = Poller::new(
        query.clone(),
        clients,
        QueryOptions::new(),
        PollConfig::default(),
    );

    let stopper = Arc::clone(&query);
    client.during_call(move || stopper.stop());

    let outcome = poller.run(|_| {}).await;
    assert_eq!(outcome.emitted, 0);
    assert_eq!(client.call_count(), 1);
}
