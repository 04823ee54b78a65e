//! Client for the remote log store's write and read endpoints.
//!
//! [`LogStoreClient`] composes push and range-query requests in the store's
//! wire format and interprets responses; all sending goes through the
//! injected [`Requester`] capability.

pub mod requester;
pub mod wire;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder};
use std::sync::Arc;
use tracing::debug;

use crate::{
    config::HistoryConfig,
    error::HistoryError,
    stream::Stream,
};

pub use requester::{HttpRequester, Requester};
pub use wire::{PushRequest, PushStream, QueryResponse, RawStream};

/// Header used to scope requests to a tenant on multi-tenant stores.
const TENANT_HEADER: &str = "X-Scope-OrgID";

/// Longest response-body prefix carried into errors and logs.
const MAX_ERROR_BODY: usize = 256;

/// Composes requests against the store's push and query APIs.
pub struct LogStoreClient {
    cfg: HistoryConfig,
    /// Used only to compose [`reqwest::Request`] values; sending always goes
    /// through `requester`.
    builder: Client,
    requester: Arc<dyn Requester>,
}

impl LogStoreClient {
    /// Creates a client for the endpoints in `cfg`, sending through
    /// `requester`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request-composition client fails to build.
    pub fn new(cfg: HistoryConfig, requester: Arc<dyn Requester>) -> Result<Self, HistoryError> {
        let builder = Client::builder().build()?;
        Ok(Self { cfg, builder, requester })
    }

    /// The configuration this client was created with.
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.cfg
    }

    /// Submits one batch of streams to the ingest endpoint.
    ///
    /// One request, no retry: a non-success status is terminal for the batch.
    ///
    /// # Errors
    ///
    /// - [`HistoryError::Encoding`] if the batch cannot be serialized
    /// - [`HistoryError::Network`] on transport failure
    /// - [`HistoryError::Rejected`] on a non-2xx store response
    pub async fn push(&self, streams: Vec<Stream>) -> Result<(), HistoryError> {
        let body = PushRequest { streams: streams.into_iter().map(PushStream::from).collect() };
        let encoded = serde_json::to_vec(&body).map_err(HistoryError::Encoding)?;

        let url = format!("{}/loki/api/v1/push", self.cfg.write_path_url.trim_end_matches('/'));
        let request = self
            .decorate(self.builder.post(url))
            .header(CONTENT_TYPE, "application/json")
            .body(Bytes::from(encoded))
            .build()?;

        let response = self.requester.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HistoryError::Rejected {
                status: status.as_u16(),
                message: truncate_body(response.text().await.unwrap_or_default()),
            });
        }

        debug!(streams = body.streams.len(), "pushed state history batch");
        Ok(())
    }

    /// Runs a range query and returns the store's raw stream result.
    ///
    /// # Errors
    ///
    /// - [`HistoryError::Network`] on transport failure
    /// - [`HistoryError::Rejected`] on a non-2xx store response
    /// - [`HistoryError::InvalidResponse`] if the envelope cannot be parsed
    pub async fn query_range(
        &self,
        logql: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<QueryResponse, HistoryError> {
        let url =
            format!("{}/loki/api/v1/query_range", self.cfg.read_path_url.trim_end_matches('/'));
        let request = self
            .decorate(self.builder.get(url))
            .query(&[
                ("query", logql),
                ("start", &nanos(from).to_string()),
                ("end", &nanos(to).to_string()),
                ("limit", &self.cfg.max_query_entries.to_string()),
                ("direction", "forward"),
            ])
            .build()?;

        let response = self.requester.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HistoryError::Rejected {
                status: status.as_u16(),
                message: truncate_body(response.text().await.unwrap_or_default()),
            });
        }

        let raw = response.bytes().await?;
        serde_json::from_slice(&raw).map_err(|e| HistoryError::InvalidResponse(e.to_string()))
    }

    /// Applies tenant and authentication settings shared by both paths.
    fn decorate(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = match &self.cfg.tenant_id {
            Some(tenant) => builder.header(TENANT_HEADER, tenant),
            None => builder,
        };
        match &self.cfg.basic_auth_user {
            Some(user) => builder.basic_auth(user, self.cfg.basic_auth_password.as_deref()),
            None => builder,
        }
    }
}

/// Nanoseconds since the epoch, clamped to zero outside chrono's range.
fn nanos(t: DateTime<Utc>) -> i64 {
    t.timestamp_nanos_opt().unwrap_or_default()
}

fn truncate_body(raw: String) -> String {
    if raw.len() > MAX_ERROR_BODY {
        let prefix: String = raw.chars().take(MAX_ERROR_BODY).collect();
        format!("{prefix}... (truncated)")
    } else {
        raw
    }
}
