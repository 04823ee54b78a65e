//! Read-path tests: range-query composition and multi-stream merging
//! through a mock log store.

use std::sync::Arc;

use annal_core::{HistorianMetrics, HistoryConfig, HttpRequester, RemoteHistorian};
use chrono::DateTime;
use serde_json::json;

use crate::mock_infrastructure::LogStoreMockBuilder;

fn historian_for(url: &str) -> RemoteHistorian {
    let cfg = HistoryConfig {
        write_path_url: url.to_string(),
        read_path_url: url.to_string(),
        ..Default::default()
    };
    RemoteHistorian::new(
        cfg,
        Arc::new(HttpRequester::new().expect("requester should build")),
        Arc::new(HistorianMetrics::new()),
    )
    .expect("historian should build")
}

#[tokio::test]
async fn test_query_merges_streams_in_time_order() {
    let mut store = LogStoreMockBuilder::new().await;
    store
        .mock_query_range(&json!([
            {
                "stream": {"current": "pending"},
                "values": [
                    ["1", r#"{"schemaVersion":1,"previous":"normal","current":"pending","values":{"a":1.0}}"#]
                ]
            },
            {
                "stream": {"current": "alerting"},
                "values": [
                    ["2", r#"{"schemaVersion":1,"previous":"pending","current":"alerting","values":{"a":1.0}}"#]
                ]
            }
        ]))
        .await;

    let historian = historian_for(&store.url());
    let frame = historian
        .query("rule-uid", DateTime::from_timestamp_nanos(0), DateTime::from_timestamp_nanos(10))
        .await
        .expect("query should succeed");

    assert_eq!(frame.len(), 2);
    assert_eq!(frame.time[0], DateTime::from_timestamp_nanos(1));
    assert_eq!(frame.time[1], DateTime::from_timestamp_nanos(2));
    assert_eq!(frame.previous, vec!["normal".to_string(), "pending".to_string()]);
    assert_eq!(frame.current, vec!["pending".to_string(), "alerting".to_string()]);
    store.assert_all().await;
}

#[tokio::test]
async fn test_query_interleaves_multi_sample_streams() {
    let mut store = LogStoreMockBuilder::new().await;
    store
        .mock_query_range(&json!([
            {
                "stream": {"current": "normal"},
                "values": [
                    ["1", r#"{"schemaVersion":1,"previous":"alerting","current":"normal"}"#],
                    ["4", r#"{"schemaVersion":1,"previous":"alerting","current":"normal"}"#]
                ]
            },
            {
                "stream": {"current": "alerting"},
                "values": [
                    ["2", r#"{"schemaVersion":1,"previous":"pending","current":"alerting"}"#],
                    ["3", r#"{"schemaVersion":1,"previous":"pending","current":"alerting"}"#]
                ]
            }
        ]))
        .await;

    let frame = historian_for(&store.url())
        .query("rule-uid", DateTime::from_timestamp_nanos(0), DateTime::from_timestamp_nanos(10))
        .await
        .unwrap();

    let expected: Vec<_> = [1, 2, 3, 4].iter().map(|&ns| DateTime::from_timestamp_nanos(ns)).collect();
    assert_eq!(frame.time, expected);
}

#[tokio::test]
async fn test_query_with_no_streams_yields_empty_frame() {
    let mut store = LogStoreMockBuilder::new().await;
    store.mock_query_range(&json!([])).await;

    let frame = historian_for(&store.url())
        .query("rule-uid", DateTime::from_timestamp_nanos(0), DateTime::from_timestamp_nanos(10))
        .await
        .unwrap();

    assert!(frame.is_empty());
}

#[tokio::test]
async fn test_query_with_empty_stream_values_yields_empty_frame() {
    let mut store = LogStoreMockBuilder::new().await;
    store
        .mock_query_range(&json!([
            {"stream": {"current": "normal"}, "values": []}
        ]))
        .await;

    let frame = historian_for(&store.url())
        .query("rule-uid", DateTime::from_timestamp_nanos(0), DateTime::from_timestamp_nanos(10))
        .await
        .unwrap();

    assert!(frame.is_empty());
}

#[tokio::test]
async fn test_undecodable_sample_aborts_query() {
    let mut store = LogStoreMockBuilder::new().await;
    store
        .mock_query_range(&json!([
            {
                "stream": {"current": "pending"},
                "values": [["1", "this is not an entry"]]
            }
        ]))
        .await;

    let err = historian_for(&store.url())
        .query("rule-uid", DateTime::from_timestamp_nanos(0), DateTime::from_timestamp_nanos(10))
        .await
        .expect_err("a broken payload must abort the query");

    assert!(matches!(err, annal_core::HistoryError::Decode(_)));
}

#[tokio::test]
async fn test_store_rejection_propagates_to_caller() {
    let mut store = LogStoreMockBuilder::new().await;
    store.mock_query_failure(500).await;

    let err = historian_for(&store.url())
        .query("rule-uid", DateTime::from_timestamp_nanos(0), DateTime::from_timestamp_nanos(10))
        .await
        .expect_err("a 500 must fail the query");

    assert!(err.is_remote_rejection());
}
