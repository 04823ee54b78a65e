//! Wire-format types for the remote log store's push and range-query APIs.
//!
//! Sample timestamps travel as decimal nanosecond strings in both
//! directions; payloads are opaque strings at this layer.

use serde::{Deserialize, Serialize};

use crate::stream::{LabelSet, Stream};

/// Body of one push request: the unit of a single write attempt.
#[derive(Debug, Clone, Serialize)]
pub struct PushRequest {
    /// Streams in grouper output order.
    pub streams: Vec<PushStream>,
}

/// One stream as submitted to the ingest endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PushStream {
    /// Identifying label set.
    pub stream: LabelSet,
    /// `(nanosecond timestamp, payload)` pairs in batch-input order.
    pub values: Vec<(String, String)>,
}

impl From<Stream> for PushStream {
    fn from(stream: Stream) -> Self {
        let values = stream
            .values
            .into_iter()
            .map(|sample| {
                let ns = sample.timestamp.timestamp_nanos_opt().unwrap_or_default();
                (ns.to_string(), sample.line)
            })
            .collect();
        Self { stream: stream.labels, values }
    }
}

/// Envelope of a range-query response.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    /// Store-reported status, `"success"` on the happy path.
    pub status: String,
    /// Result payload.
    pub data: QueryData,
}

/// Result payload of a range query.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryData {
    /// Result shape reported by the store, `"streams"` for log queries.
    #[serde(rename = "resultType", default)]
    pub result_type: String,
    /// Matching streams. Samples within each stream arrive sorted ascending
    /// by timestamp; streams are not mutually ordered.
    #[serde(default)]
    pub result: Vec<RawStream>,
}

/// One stream as returned by the read endpoint, samples still encoded.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStream {
    /// The stream's label set.
    #[serde(default)]
    pub stream: LabelSet,
    /// `(nanosecond timestamp, payload)` pairs, ascending by timestamp.
    #[serde(default)]
    pub values: Vec<(String, String)>,
}
