//! Mock Log Store for History Pipeline Testing
//!
//! Wraps mockito to provide store-specific builders for the push and
//! range-query endpoints the pipeline talks to.

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};

/// Builder for mock log-store responses.
///
/// Uses mockito internally but provides push/query helpers shaped like the
/// store's API.
pub struct LogStoreMockBuilder {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

impl LogStoreMockBuilder {
    /// Creates a new builder with a fresh mockito server.
    pub async fn new() -> Self {
        Self { server: Server::new_async().await, mocks: Vec::new() }
    }

    /// Returns the URL of the mock store, usable as both the write and
    /// read path.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Mocks a successful push of any batch.
    pub async fn mock_push_success(&mut self) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/loki/api/v1/push")
            .match_header("content-type", "application/json")
            .with_status(204)
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    /// Mocks a successful push whose body must match `pattern`.
    pub async fn mock_push_expecting(&mut self, pattern: &str) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/loki/api/v1/push")
            .match_body(Matcher::Regex(pattern.to_string()))
            .with_status(204)
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    /// Mocks a successful push that must carry the tenant scope header.
    pub async fn mock_push_for_tenant(&mut self, tenant: &str) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/loki/api/v1/push")
            .match_header("x-scope-orgid", tenant)
            .with_status(204)
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    /// Mocks a push rejected with the given status.
    pub async fn mock_push_failure(&mut self, status: usize) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/loki/api/v1/push")
            .with_status(status)
            .with_body("ingestion rate limit exceeded")
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    /// Mocks a range query answering with the given streams.
    ///
    /// `streams` is the `data.result` array in the store's wire shape:
    /// `[{"stream": {...}, "values": [["<ns>", "<payload>"], ...]}, ...]`.
    pub async fn mock_query_range(&mut self, streams: &Value) -> &mut Self {
        let mock = self
            .server
            .mock("GET", "/loki/api/v1/query_range")
            .match_query(Matcher::UrlEncoded("direction".into(), "forward".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "status": "success",
                    "data": {
                        "resultType": "streams",
                        "result": streams
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    /// Mocks a range query rejected with the given status.
    pub async fn mock_query_failure(&mut self, status: usize) -> &mut Self {
        let mock = self
            .server
            .mock("GET", "/loki/api/v1/query_range")
            .with_status(status)
            .with_body("query failed")
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    /// Asserts that every registered mock was hit.
    pub async fn assert_all(&self) {
        for mock in &self.mocks {
            mock.assert_async().await;
        }
    }
}
