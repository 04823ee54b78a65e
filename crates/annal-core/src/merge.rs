//! Read-time reconstruction of one chronological sequence from multiple
//! independently time-sorted streams.
//!
//! The store returns per-stream samples already sorted ascending, but the
//! streams themselves are not mutually ordered. The merge keeps one cursor
//! per stream in a min-heap keyed by the next sample's timestamp, so memory
//! stays bounded by stream cardinality rather than total sample count.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, BTreeMap};

use chrono::{DateTime, Utc};

use crate::{client::wire::RawStream, entry::HistoryEntry, error::HistoryError};

/// Columnar, globally time-sorted query result.
///
/// All columns have equal length; `time` is non-decreasing, with ties
/// preserving the order in which the contributing streams appeared in the
/// query result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFrame {
    /// Sample timestamps, ascending.
    pub time: Vec<DateTime<Utc>>,
    /// State before each transition.
    pub previous: Vec<String>,
    /// State after each transition.
    pub current: Vec<String>,
    /// Numeric evaluation values per transition.
    pub values: Vec<Option<BTreeMap<String, f64>>>,
    /// Evaluation error per transition, where one was recorded.
    pub error: Vec<Option<String>>,
}

impl HistoryFrame {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            time: Vec::with_capacity(capacity),
            previous: Vec::with_capacity(capacity),
            current: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            error: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, timestamp: DateTime<Utc>, entry: HistoryEntry) {
        self.time.push(timestamp);
        self.previous.push(entry.previous);
        self.current.push(entry.current);
        self.values.push(entry.values);
        self.error.push(entry.error);
    }

    /// Number of rows in the frame.
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Returns `true` if the frame has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// One stream's read position. Ordered by next-sample timestamp, then by the
/// stream's arrival index so that ties keep query-result order.
#[derive(Debug, PartialEq, Eq)]
struct Cursor {
    timestamp_ns: i64,
    stream: usize,
    sample: usize,
}

impl Ord for Cursor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp_ns
            .cmp(&other.timestamp_ns)
            .then_with(|| self.stream.cmp(&other.stream))
    }
}

impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Merges `k` time-sorted streams into one globally sorted frame.
///
/// Streams with zero samples contribute no rows; an empty slice yields an
/// empty frame and no error.
///
/// # Errors
///
/// Returns [`HistoryError::Decode`] on the first sample whose timestamp or
/// payload cannot be parsed. The whole merge is aborted; there is no
/// partial result.
pub fn merge_streams(streams: &[RawStream]) -> Result<HistoryFrame, HistoryError> {
    let total: usize = streams.iter().map(|s| s.values.len()).sum();
    let mut frame = HistoryFrame::with_capacity(total);
    let mut heap: BinaryHeap<Reverse<Cursor>> = BinaryHeap::with_capacity(streams.len());

    for (stream, raw) in streams.iter().enumerate() {
        if let Some(cursor) = cursor_at(raw, stream, 0)? {
            heap.push(Reverse(cursor));
        }
    }

    while let Some(Reverse(cursor)) = heap.pop() {
        let raw = &streams[cursor.stream];
        let (_, line) = &raw.values[cursor.sample];
        let entry = HistoryEntry::decode(line)?;
        frame.push(DateTime::from_timestamp_nanos(cursor.timestamp_ns), entry);

        if let Some(next) = cursor_at(raw, cursor.stream, cursor.sample + 1)? {
            heap.push(Reverse(next));
        }
    }

    Ok(frame)
}

fn cursor_at(
    raw: &RawStream,
    stream: usize,
    sample: usize,
) -> Result<Option<Cursor>, HistoryError> {
    let Some((timestamp, _)) = raw.values.get(sample) else {
        return Ok(None);
    };
    let timestamp_ns = timestamp
        .parse::<i64>()
        .map_err(|_| HistoryError::Decode(format!("invalid sample timestamp: {timestamp}")))?;
    Ok(Some(Cursor { timestamp_ns, stream, sample }))
}
