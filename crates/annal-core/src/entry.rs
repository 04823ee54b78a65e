//! Serialization of state transitions into stored log entries.
//!
//! The payload format is versioned JSON and must round-trip exactly for
//! compatibility with history already written to the store:
//!
//! ```json
//! {"schemaVersion":1,"previous":"normal","current":"alerting","values":{"A":2.0}}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::HistoryError,
    model::{AlertState, StateTransition},
};

/// Schema version stamped into every entry written by this crate.
pub const SCHEMA_VERSION: u32 = 1;

/// One stored state-transition record, as serialized into a log line.
///
/// States are stored by their canonical names rather than as enum values so
/// that readers of any version can render them without a state table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Payload schema version, always [`SCHEMA_VERSION`] on write.
    #[serde(rename = "schemaVersion")]
    pub schema_version: u32,
    /// Canonical name of the state before the transition.
    pub previous: String,
    /// Canonical name of the state after the transition.
    pub current: String,
    /// Numeric evaluation values, copied verbatim from the transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<BTreeMap<String, f64>>,
    /// Evaluation error, present only for transitions into the error state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HistoryEntry {
    /// Builds the entry for one transition.
    #[must_use]
    pub fn from_transition(transition: &StateTransition) -> Self {
        let error = if transition.current == AlertState::Error {
            transition.error.clone()
        } else {
            None
        };

        Self {
            schema_version: SCHEMA_VERSION,
            previous: transition.previous.as_str().to_string(),
            current: transition.current.as_str().to_string(),
            values: Some(transition.values.clone()),
            error,
        }
    }

    /// Serializes the entry to its stored JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Encoding`]; callers treat this as a per-entry
    /// skip, not a batch failure.
    pub fn encode(&self) -> Result<String, HistoryError> {
        serde_json::to_string(self).map_err(HistoryError::Encoding)
    }

    /// Parses a stored log line back into an entry.
    ///
    /// Entries stamped with a schema version newer than [`SCHEMA_VERSION`]
    /// are flagged in the log; fields this version does not know about are
    /// ignored rather than silently misread as something else.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Decode`] if the line is not a valid entry.
    pub fn decode(line: &str) -> Result<Self, HistoryError> {
        let entry: Self =
            serde_json::from_str(line).map_err(|e| HistoryError::Decode(e.to_string()))?;

        if entry.schema_version > SCHEMA_VERSION {
            warn!(
                schema_version = entry.schema_version,
                supported = SCHEMA_VERSION,
                "stored entry was written by a newer schema"
            );
        }

        Ok(entry)
    }
}
