//! The transport capability consumed by the log-store client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Request, Response};

use crate::error::HistoryError;

/// Minimal transport capability: send one composed request, return the
/// response or a transport error.
///
/// The pipeline composes [`Request`] values itself and interprets response
/// status codes; it never owns the transport. Injecting the requester keeps
/// the write/read paths testable without a live store.
#[async_trait]
pub trait Requester: Send + Sync {
    /// Sends the request and returns the raw response.
    async fn send(&self, request: Request) -> Result<Response, reqwest::Error>;
}

/// Production [`Requester`] backed by a pooled HTTP client.
pub struct HttpRequester {
    client: Client,
}

impl HttpRequester {
    /// Creates a requester with connection pooling and conservative timeouts.
    ///
    /// The client-level timeout is a backstop; per-operation deadlines are
    /// enforced by the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new() -> Result<Self, HistoryError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(45))
            .use_rustls_tls()
            .tcp_nodelay(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Requester for HttpRequester {
    async fn send(&self, request: Request) -> Result<Response, reqwest::Error> {
        self.client.execute(request).await
    }
}
