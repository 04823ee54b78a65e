//! Core data model shared by the write and read paths.
//!
//! These types mirror what the rule evaluation engine produces. They are
//! consumed read-only: the pipeline never mutates a transition or a rule's
//! identity, it only derives log entries and label sets from them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The state of an alert rule instance after one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertState {
    /// The rule's condition is not met.
    Normal,
    /// The rule's condition is met and the alert is firing.
    Alerting,
    /// The condition is met but the configured hold duration has not elapsed.
    Pending,
    /// The evaluation produced no data.
    NoData,
    /// The evaluation itself failed.
    Error,
}

impl AlertState {
    /// Returns the canonical lowercase name used in stored payloads.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Alerting => "alerting",
            Self::Pending => "pending",
            Self::NoData => "nodata",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable identity of the alert rule that owns a batch of transitions.
///
/// Supplied by the evaluation engine alongside each batch; never mutated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMeta {
    /// Owning organization.
    pub org_id: i64,
    /// Stable unique identifier of the rule.
    pub rule_uid: String,
    /// Rule group the rule belongs to.
    pub group: String,
    /// UID of the folder (namespace) containing the rule.
    pub namespace_uid: String,
    /// UID of the dashboard the rule is associated with, if any.
    pub dashboard_uid: String,
    /// Panel within the dashboard, if any.
    pub panel_id: i64,
}

/// One rule instance's change of state during a single evaluation cycle.
///
/// The `timestamp` is supplied by the caller as the recording time of the
/// transition. The pipeline never invents a wall-clock value of its own, so
/// a fixed input batch always produces identical streams.
#[derive(Debug, Clone, PartialEq)]
pub struct StateTransition {
    /// State before this evaluation.
    pub previous: AlertState,
    /// State after this evaluation.
    pub current: AlertState,
    /// Instance labels attached by the evaluation, including any private
    /// (`__`-prefixed) bookkeeping labels.
    pub labels: BTreeMap<String, String>,
    /// Numeric results of the evaluation's reduce/math expressions.
    pub values: BTreeMap<String, f64>,
    /// Evaluation error message, meaningful when `current` is
    /// [`AlertState::Error`].
    pub error: Option<String>,
    /// Recording time stamped by the caller.
    pub timestamp: DateTime<Utc>,
}

impl StateTransition {
    /// Returns `true` when the transition carries no information worth
    /// recording: it neither entered nor left the `Normal` state.
    #[must_use]
    pub fn is_transitory(&self) -> bool {
        self.previous == AlertState::Normal && self.current == AlertState::Normal
    }
}
