//! The history pipeline's public write and read paths.
//!
//! Writes are fire-and-forget: [`RemoteHistorian::record_async`] groups the
//! batch synchronously, hands the push to the runtime, and returns a
//! one-shot receiver carrying the single outcome. A failed push is reported
//! through that receiver and the failure counters, then dropped; it is
//! never retried. Reads are synchronous from the caller's perspective: one
//! range query, one merged frame.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use tracing::{debug, error};

use crate::{
    client::{LogStoreClient, Requester},
    config::HistoryConfig,
    error::HistoryError,
    merge::{merge_streams, HistoryFrame},
    metrics::HistorianMetrics,
    model::{RuleMeta, StateTransition},
    stream::{group_transitions, HISTORY_LABEL_KEY, HISTORY_LABEL_VALUE},
};

/// Records alert-state transitions to a remote log store and reads them
/// back as time-ordered frames.
///
/// Cheap to clone-share via the `Arc`s it holds; concurrent calls are
/// independent and uncoordinated.
pub struct RemoteHistorian {
    client: Arc<LogStoreClient>,
    metrics: Arc<HistorianMetrics>,
}

impl RemoteHistorian {
    /// Creates a historian for the store described by `cfg`, sending through
    /// `requester` and counting into `metrics`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be built.
    pub fn new(
        cfg: HistoryConfig,
        requester: Arc<dyn Requester>,
        metrics: Arc<HistorianMetrics>,
    ) -> Result<Self, HistoryError> {
        let client = Arc::new(LogStoreClient::new(cfg, requester)?);
        Ok(Self { client, metrics })
    }

    /// Records a batch of state transitions without blocking the caller.
    ///
    /// The batch is grouped into streams synchronously; the push itself runs
    /// concurrently and resolves the returned receiver exactly once with
    /// `Ok(())` or the terminal error. Dropping the receiver detaches the
    /// write. A batch that retains nothing (all transitions Normal→Normal)
    /// pushes nothing, moves no counters, and resolves `Ok(())`.
    ///
    /// Counters move per attempted push: `transitions`/`writes` before the
    /// outcome is known, the failure pair only when the push fails.
    pub fn record_async(
        &self,
        rule: &RuleMeta,
        transitions: &[StateTransition],
    ) -> oneshot::Receiver<Result<(), HistoryError>> {
        let (tx, rx) = oneshot::channel();

        let streams =
            group_transitions(rule, transitions, &self.client.config().external_labels);
        if streams.is_empty() {
            debug!(
                rule_uid = %rule.rule_uid,
                org_id = rule.org_id,
                "state history batch retained nothing, skipping push"
            );
            let _ = tx.send(Ok(()));
            return rx;
        }

        let retained: u64 = streams.iter().map(|s| s.values.len() as u64).sum();
        let org_id = rule.org_id;
        let rule_uid = rule.rule_uid.clone();
        let timeout = self.client.config().request_timeout();
        let client = Arc::clone(&self.client);
        let metrics = Arc::clone(&self.metrics);

        tokio::spawn(async move {
            metrics.record_write_attempt(org_id, retained);

            let outcome = match tokio::time::timeout(timeout, client.push(streams)).await {
                Ok(result) => result,
                Err(_) => Err(HistoryError::Cancelled),
            };

            if let Err(ref e) = outcome {
                metrics.record_write_failure(org_id, retained);
                error!(
                    rule_uid = %rule_uid,
                    org_id,
                    transitions = retained,
                    kind = e.as_label(),
                    error = %e,
                    "failed to write state history batch, it will not be retried"
                );
            }

            // The caller may have dropped the receiver; the write stands.
            let _ = tx.send(outcome);
        });

        rx
    }

    /// Fetches one rule's history over `[from, to]` as a globally
    /// time-ordered frame.
    ///
    /// # Errors
    ///
    /// - [`HistoryError::Network`] / [`HistoryError::Rejected`] on transport
    ///   or store failure
    /// - [`HistoryError::Decode`] if any stored sample cannot be parsed
    ///   (fail-fast, no partial result)
    /// - [`HistoryError::Cancelled`] if the deadline elapses
    pub async fn query(
        &self,
        rule_uid: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<HistoryFrame, HistoryError> {
        let selector = format!(
            "{{{HISTORY_LABEL_KEY}={HISTORY_LABEL_VALUE:?},ruleUID={rule_uid:?}}}",
        );

        let timeout = self.client.config().request_timeout();
        let response =
            match tokio::time::timeout(timeout, self.client.query_range(&selector, from, to)).await
            {
                Ok(result) => result?,
                Err(_) => return Err(HistoryError::Cancelled),
            };

        let frame = merge_streams(&response.data.result)?;
        debug!(rule_uid, rows = frame.len(), "assembled state history frame");
        Ok(frame)
    }

    /// The write-path counters this historian records into.
    #[must_use]
    pub fn metrics(&self) -> &HistorianMetrics {
        &self.metrics
    }
}
