//! Grouping of transition batches into labeled log streams.
//!
//! The remote store identifies a stream by its exact label set, so two
//! transitions land in the same stream iff their combined labels are equal
//! as sets. Grouping is stable: for a fixed input order the output streams
//! and their samples always come out in the same order.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::{
    entry::HistoryEntry,
    model::{RuleMeta, StateTransition},
};

/// Marker label attached to every stream written by this pipeline, used to
/// select history streams on the read path.
pub const HISTORY_LABEL_KEY: &str = "from";

/// Value of the [`HISTORY_LABEL_KEY`] marker label.
pub const HISTORY_LABEL_VALUE: &str = "state-history";

/// Prefix of labels reserved for internal bookkeeping. Such labels must
/// never be exposed in stored history.
pub const PRIVATE_LABEL_PREFIX: &str = "__";

/// A stream's identifying label set: unique by key, ordered deterministically.
pub type LabelSet = BTreeMap<String, String>;

/// One sample of a stream: a recording timestamp and the encoded entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Recording time of the transition, as stamped by the caller.
    pub timestamp: DateTime<Utc>,
    /// Encoded [`HistoryEntry`] payload.
    pub line: String,
}

/// A group of samples sharing one exact label set.
///
/// Built fresh per write call; sample order follows batch input order, not
/// time order.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    /// Identifying label set.
    pub labels: LabelSet,
    /// Samples in batch-input order. Never empty in grouper output.
    pub values: Vec<Sample>,
}

impl Stream {
    fn new(labels: LabelSet) -> Self {
        Self { labels, values: Vec::new() }
    }
}

/// Groups a batch of transitions into streams keyed by combined label set.
///
/// Policy, in order:
/// 1. Normal→Normal transitions are dropped before encoding or counting.
/// 2. Each retained transition's label set is the history marker, any
///    configured external labels, the four rule-identity labels, and the
///    transition's own labels minus private (`__`-prefixed) keys.
/// 3. Equal label sets merge into one stream, samples in input order;
///    streams appear in first-seen order.
///
/// An entry that fails to serialize is skipped with a warning; it does not
/// abort the batch. A batch where everything was dropped yields an empty Vec.
#[must_use]
pub fn group_transitions(
    rule: &RuleMeta,
    transitions: &[StateTransition],
    external_labels: &LabelSet,
) -> Vec<Stream> {
    let mut index: HashMap<LabelSet, usize> = HashMap::new();
    let mut streams: Vec<Stream> = Vec::new();

    for transition in transitions {
        if transition.is_transitory() {
            continue;
        }

        let line = match HistoryEntry::from_transition(transition).encode() {
            Ok(line) => line,
            Err(e) => {
                warn!(
                    rule_uid = %rule.rule_uid,
                    org_id = rule.org_id,
                    error = %e,
                    "skipping state transition that failed to serialize"
                );
                continue;
            }
        };

        let labels = combined_labels(rule, &transition.labels, external_labels);
        let slot = match index.get(&labels) {
            Some(&i) => i,
            None => {
                index.insert(labels.clone(), streams.len());
                streams.push(Stream::new(labels));
                streams.len() - 1
            }
        };
        streams[slot].values.push(Sample { timestamp: transition.timestamp, line });
    }

    streams
}

/// Builds the combined label set for one retained transition.
///
/// Transition labels are applied last and may shadow identity labels, the
/// same way the store would treat a duplicated key.
fn combined_labels(
    rule: &RuleMeta,
    transition_labels: &LabelSet,
    external_labels: &LabelSet,
) -> LabelSet {
    let mut labels = external_labels.clone();
    labels.insert(HISTORY_LABEL_KEY.to_string(), HISTORY_LABEL_VALUE.to_string());
    labels.insert("orgID".to_string(), rule.org_id.to_string());
    labels.insert("ruleUID".to_string(), rule.rule_uid.clone());
    labels.insert("group".to_string(), rule.group.clone());
    labels.insert("folderUID".to_string(), rule.namespace_uid.clone());

    for (key, value) in transition_labels {
        if key.starts_with(PRIVATE_LABEL_PREFIX) {
            continue;
        }
        labels.insert(key.clone(), value.clone());
    }

    labels
}
