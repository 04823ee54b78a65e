//! Write-path instrumentation.
//!
//! Dual-path counters in the same shape as the rest of our observability
//! stack:
//!
//! - Hot path: lock-free Prometheus counters recorded on every write
//!   attempt, labeled by organization.
//! - Internal path: per-org atomics readable via [`HistorianMetrics::snapshot`]
//!   so callers and tests can assert exact counts without scraping.
//!
//! All four counters move before a push's outcome is known except the
//! failure pair, which moves once per failed batch. Failed batches are not
//! retried, so failure counts never double-count a transition.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use dashmap::DashMap;
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Total state transitions processed (post filter), by org.
pub const TRANSITIONS_TOTAL: &str = "alert_state_history_transitions_total";

/// Total state transitions in batches that failed to write, by org.
pub const TRANSITIONS_FAILED_TOTAL: &str = "alert_state_history_transitions_failed_total";

/// Total batch write attempts, by org.
pub const WRITES_TOTAL: &str = "alert_state_history_writes_total";

/// Total failed batch writes, by org. Failed batches are not retried.
pub const WRITES_FAILED_TOTAL: &str = "alert_state_history_writes_failed_total";

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn try_init_prometheus_recorder(
) -> Result<PrometheusHandle, metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Installs the global Prometheus recorder, or falls back to a detached one
/// when another recorder is already installed (e.g. by the host process).
pub fn init_prometheus_recorder() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| match try_init_prometheus_recorder() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "failed to install Prometheus recorder, using detached fallback"
                );
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

#[derive(Debug, Default)]
struct OrgCounters {
    transitions: AtomicU64,
    transitions_failed: AtomicU64,
    writes: AtomicU64,
    writes_failed: AtomicU64,
}

/// Point-in-time view of one organization's write counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Transitions processed.
    pub transitions: u64,
    /// Transitions in failed batches.
    pub transitions_failed: u64,
    /// Batch write attempts.
    pub writes: u64,
    /// Failed batch writes.
    pub writes_failed: u64,
}

/// Counters for the state-history write path, labeled by organization.
///
/// Safe under concurrent increment from independent write calls.
#[derive(Debug, Default)]
pub struct HistorianMetrics {
    orgs: DashMap<i64, OrgCounters>,
}

impl HistorianMetrics {
    /// Creates an empty counter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an attempted batch write of `transitions` retained
    /// transitions, before the outcome is known.
    pub fn record_write_attempt(&self, org_id: i64, transitions: u64) {
        let org = org_id.to_string();
        counter!(TRANSITIONS_TOTAL, "org" => org.clone()).increment(transitions);
        counter!(WRITES_TOTAL, "org" => org).increment(1);

        let counters = self.orgs.entry(org_id).or_default();
        counters.transitions.fetch_add(transitions, Ordering::Relaxed);
        counters.writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed batch write carrying `transitions` retained
    /// transitions.
    pub fn record_write_failure(&self, org_id: i64, transitions: u64) {
        let org = org_id.to_string();
        counter!(TRANSITIONS_FAILED_TOTAL, "org" => org.clone()).increment(transitions);
        counter!(WRITES_FAILED_TOTAL, "org" => org).increment(1);

        let counters = self.orgs.entry(org_id).or_default();
        counters.transitions_failed.fetch_add(transitions, Ordering::Relaxed);
        counters.writes_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the current counter values for one organization.
    #[must_use]
    pub fn snapshot(&self, org_id: i64) -> WriteStats {
        self.orgs.get(&org_id).map_or_else(WriteStats::default, |c| WriteStats {
            transitions: c.transitions.load(Ordering::Relaxed),
            transitions_failed: c.transitions_failed.load(Ordering::Relaxed),
            writes: c.writes.load(Ordering::Relaxed),
            writes_failed: c.writes_failed.load(Ordering::Relaxed),
        })
    }
}
