use thiserror::Error;

/// Errors that can occur while recording or reading back alert-state history.
///
/// The write path surfaces errors through the one-shot receiver returned by
/// [`record_async`](crate::historian::RemoteHistorian::record_async); the read
/// path returns them directly. Failed writes are never retried by this crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HistoryError {
    /// A single entry could not be serialized for storage.
    ///
    /// Handled as skip-and-continue at the entry level; it never aborts a batch.
    #[error("entry serialization failed: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Network-level failure from the underlying HTTP client.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The log store returned a non-success status.
    ///
    /// Treated identically to [`Network`](Self::Network) for metrics and
    /// propagation: the batch is reported failed and dropped.
    #[error("log store rejected the request: status {status}: {message}")]
    Rejected {
        /// HTTP status code returned by the store.
        status: u16,
        /// Response body, truncated for logging safety.
        message: String,
    },

    /// A stored payload or sample timestamp could not be parsed during merge.
    ///
    /// Aborts the whole query; there are no partial results.
    #[error("stored entry could not be decoded: {0}")]
    Decode(String),

    /// The read response envelope was malformed.
    #[error("malformed query response: {0}")]
    InvalidResponse(String),

    /// The operation was cancelled or its deadline elapsed before completion.
    #[error("operation cancelled before completion")]
    Cancelled,
}

impl HistoryError {
    /// Returns `true` if this error represents cancellation or an elapsed
    /// deadline rather than a remote failure.
    ///
    /// Callers use this to distinguish their own cancellation from genuine
    /// store-side problems.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::Network(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns `true` if the store itself rejected the request with a
    /// non-success status.
    #[must_use]
    pub fn is_remote_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Returns a static string representation for metrics and log fields.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Encoding(_) => "encoding",
            Self::Network(_) => "network",
            Self::Rejected { .. } => "rejected",
            Self::Decode(_) => "decode",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Cancelled => "cancelled",
        }
    }
}
