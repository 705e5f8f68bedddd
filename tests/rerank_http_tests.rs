mod common;

use std::collections::HashSet;
use std::time::Duration;

use common::harness::{TestServerConfig, spawn_test_server};
use common::http_client::TestClient;
use rerank::model::MockBehavior;
use rerank::service::RerankRequest;

fn numbered_documents(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("document number {}", i)).collect()
}

#[tokio::test]
async fn test_health_and_ready() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .unwrap();
    let client = TestClient::new(server.url());

    assert_eq!(client.health().await.unwrap().status, "ok");

    let ready = client.ready().await.unwrap();
    assert!(ready.is_ok());
    assert_eq!(ready.backend, "mock");
    assert_eq!(ready.batch_size, 10);
}

#[tokio::test]
async fn test_not_ready_until_backend_installed() {
    let mut server = spawn_test_server(TestServerConfig::default().unloaded())
        .await
        .unwrap();
    let client = TestClient::new(server.url());
    let request = RerankRequest::new("q", ["a", "b"]);

    assert_eq!(client.health().await.unwrap().status, "ok");
    assert_eq!(client.ready().await.unwrap_err().status(), Some(503));
    assert_eq!(client.rerank(&request).await.unwrap_err().status(), Some(503));

    server.install();

    assert!(client.ready().await.unwrap().is_ok());
    assert_eq!(client.rerank(&request).await.unwrap().results.len(), 2);
    assert_eq!(server.backend().call_count(), 1);
}

#[tokio::test]
async fn test_rerank_orders_globally_across_batches() {
    let server = spawn_test_server(TestServerConfig::default().with_batch_size(2))
        .await
        .unwrap();
    let client = TestClient::new(server.url());

    let request = RerankRequest::new("q", ["0.2", "0.7", "0.1", "0.95", "0.4"]);
    let response = client.rerank(&request).await.unwrap();

    let order: Vec<usize> = response.results.iter().map(|r| r.index).collect();
    assert_eq!(order, vec![3, 1, 4, 0, 2]);
    assert_eq!(response.results[0].document, "0.95");
    assert_eq!(response.results[0].relevance_score, 0.95);
    assert_eq!(server.backend().batch_sizes(), vec![2, 2, 1]);
}

#[tokio::test]
async fn test_rerank_covers_every_index_once() {
    let server = spawn_test_server(TestServerConfig::default().with_batch_size(3))
        .await
        .unwrap();
    let client = TestClient::new(server.url());

    for n in [1, 2, 3, 7, 10] {
        let response = client
            .rerank(&RerankRequest::new("q", numbered_documents(n)))
            .await
            .unwrap();

        let indices: HashSet<usize> = response.results.iter().map(|r| r.index).collect();
        assert_eq!(response.results.len(), n);
        assert_eq!(indices, (0..n).collect::<HashSet<_>>());
        assert!(
            response
                .results
                .windows(2)
                .all(|w| w[0].relevance_score >= w[1].relevance_score)
        );
    }
}

#[tokio::test]
async fn test_top_n_truncates() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .unwrap();
    let client = TestClient::new(server.url());

    for (n, top_n) in [(5, 2), (3, 10), (4, 4)] {
        let request = RerankRequest::new("q", numbered_documents(n)).with_top_n(top_n);
        let response = client.rerank(&request).await.unwrap();
        assert_eq!(response.results.len(), n.min(top_n));
    }
}

#[tokio::test]
async fn test_top_n_zero_rejected() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .unwrap();
    let client = TestClient::new(server.url());

    let request = RerankRequest::new("q", ["a"]).with_top_n(0);
    let err = client.rerank(&request).await.unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(server.backend().call_count(), 0);
}

#[tokio::test]
async fn test_identical_requests_are_idempotent() {
    let server = spawn_test_server(TestServerConfig::default().with_batch_size(4))
        .await
        .unwrap();
    let client = TestClient::new(server.url());
    let request = RerankRequest::new("q", numbered_documents(9)).with_top_n(6);

    let first = client.rerank(&request).await.unwrap();
    let second = client.rerank(&request).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_non_finite_scores_become_zero() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .unwrap();
    let client = TestClient::new(server.url());

    let request = RerankRequest::new("q", ["NaN", "0.5", "-0.25"]);
    let response = client.rerank(&request).await.unwrap();

    let scores: Vec<(usize, f64)> = response
        .results
        .iter()
        .map(|r| (r.index, r.relevance_score))
        .collect();
    assert_eq!(scores, vec![(1, 0.5), (0, 0.0), (2, -0.25)]);
}

#[tokio::test]
async fn test_empty_documents_skip_backend() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .unwrap();
    let client = TestClient::new(server.url());

    let response = client
        .rerank(&RerankRequest::new("q", Vec::<String>::new()))
        .await
        .unwrap();

    assert!(response.results.is_empty());
    assert_eq!(server.backend().call_count(), 0);
}

#[tokio::test]
async fn test_oom_backoff_converges() {
    let config = TestServerConfig::default()
        .with_batch_size(10)
        .with_behavior(MockBehavior::ExhaustAbove(2));
    let server = spawn_test_server(config).await.unwrap();
    let client = TestClient::new(server.url());

    let response = client
        .rerank(&RerankRequest::new("q", numbered_documents(5)))
        .await
        .unwrap();

    let indices: HashSet<usize> = response.results.iter().map(|r| r.index).collect();
    assert_eq!(indices.len(), 5);
    assert_eq!(server.backend().batch_sizes(), vec![5, 5, 2, 2, 1]);
    assert!(server.backend().cache_releases() > 0);
}

#[tokio::test]
async fn test_persistent_oom_fails_at_batch_size_one() {
    let config = TestServerConfig::default()
        .with_batch_size(8)
        .with_behavior(MockBehavior::AlwaysExhaust);
    let server = spawn_test_server(config).await.unwrap();
    let client = TestClient::new(server.url());

    let err = client
        .rerank(&RerankRequest::new("q", numbered_documents(3)))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    // 8 -> 4 -> 2 -> 1, one failing call per pass
    assert_eq!(server.backend().batch_sizes(), vec![3, 3, 2, 1]);
}

#[tokio::test]
async fn test_backend_failure_is_not_retried() {
    let config = TestServerConfig::default()
        .with_batch_size(2)
        .with_behavior(MockBehavior::Fail("tokenizer exploded".to_string()));
    let server = spawn_test_server(config).await.unwrap();
    let client = TestClient::new(server.url());

    let err = client
        .rerank(&RerankRequest::new("q", numbered_documents(6)))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(server.backend().call_count(), 1);
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .unwrap();
    let client = TestClient::new(server.url());

    let (status, _) = client
        .rerank_raw(r#"{"query": "q", "documents": "not a list"}"#.to_string())
        .await
        .unwrap();
    assert!((400..500).contains(&status));

    let (status, _) = client.rerank_raw("{".to_string()).await.unwrap();
    assert!((400..500).contains(&status));

    assert_eq!(server.backend().call_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_do_not_interleave() {
    let config = TestServerConfig::default()
        .with_batch_size(2)
        .with_delay(Duration::from_millis(20));
    let server = spawn_test_server(config).await.unwrap();
    let client = TestClient::new(server.url());

    let first = RerankRequest::new("first", numbered_documents(5));
    let second = RerankRequest::new("second", numbered_documents(5));

    let (a, b) = tokio::join!(client.rerank(&first), client.rerank(&second));
    assert_eq!(a.unwrap().results.len(), 5);
    assert_eq!(b.unwrap().results.len(), 5);

    let calls = server.backend().calls();
    assert_eq!(calls.len(), 6);

    let queries: Vec<&str> = calls.iter().map(|c| c.query.as_str()).collect();
    assert!(queries[..3].iter().all(|q| *q == queries[0]));
    assert!(queries[3..].iter().all(|q| *q == queries[3]));
    assert_ne!(queries[0], queries[3]);

    for pair in calls.windows(2) {
        assert!(pair[0].finished <= pair[1].started);
    }
}

#[tokio::test]
async fn test_large_request_body_is_accepted() {
    let server = spawn_test_server(TestServerConfig::default().with_batch_size(1000))
        .await
        .unwrap();
    let client = TestClient::new(server.url());

    let documents: Vec<String> = (0..60_000)
        .map(|i| format!("passage {} {}", i, "lorem ipsum ".repeat(4)))
        .collect();
    let request = RerankRequest::new("q", documents);
    assert!(serde_json::to_vec(&request).unwrap().len() > 2 * 1024 * 1024);

    let response = client.rerank(&request).await.unwrap();
    assert_eq!(response.results.len(), 60_000);
}

#[tokio::test]
async fn test_dropping_server_stops_listener() {
    let server = spawn_test_server(TestServerConfig::default())
        .await
        .unwrap();
    let url = server.url();
    assert!(TestClient::new(url.clone()).health().await.is_ok());

    drop(server);

    let mut stopped = false;
    for _ in 0..50 {
        if TestClient::new(url.clone()).health().await.is_err() {
            stopped = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(stopped, "server still answering after drop");
}
