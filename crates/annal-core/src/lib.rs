//! # Annal Core
//!
//! Alert-state history pipeline: durably records every meaningful
//! alert-rule state transition to an external append-only log store and
//! reconstructs those records into a time-ordered result when queried.
//!
//! - **[`model`]**: rule identity, alert states, and the transitions the
//!   evaluation engine hands over.
//!
//! - **[`entry`]**: the versioned payload codec turning one transition into
//!   a stored log line and back.
//!
//! - **[`stream`]**: grouping of a transition batch into labeled log
//!   streams, with the no-op filter and private-label exclusion.
//!
//! - **[`historian`]**: the write path (asynchronous, no-retry pushes with
//!   one-shot completion) and the read path (range query plus merge).
//!
//! - **[`merge`]**: the k-way merge reconstructing one chronological
//!   sequence from independently sorted streams.
//!
//! - **[`client`]**: request composition for the store's push and
//!   range-query APIs, sending through an injected [`Requester`] capability.
//!
//! - **[`metrics`]**: per-organization write counters.
//!
//! - **[`config`]**: layered configuration for endpoints, tenancy, and
//!   deadlines.
//!
//! ## Data Flow
//!
//! ```text
//! Write:  transitions ──group──► streams ──push──► remote store
//!                │                                     │
//!                └── counters (attempted / failed) ◄───┘
//!
//! Read:   query ──► store streams ──decode──► k-way merge ──► HistoryFrame
//! ```
//!
//! Failed pushes are terminal: the error reaches the caller through the
//! returned one-shot receiver and the failure counters, and the batch is
//! dropped. The store owns all durability; this crate holds no locks over
//! it and issues independent, uncoordinated requests.

pub mod client;
pub mod config;
pub mod entry;
pub mod error;
pub mod historian;
pub mod merge;
pub mod metrics;
pub mod model;
pub mod stream;

pub use client::{HttpRequester, Requester};
pub use config::HistoryConfig;
pub use error::HistoryError;
pub use historian::RemoteHistorian;
pub use merge::HistoryFrame;
pub use metrics::{HistorianMetrics, WriteStats};
pub use model::{AlertState, RuleMeta, StateTransition};
