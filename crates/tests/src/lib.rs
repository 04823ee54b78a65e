//! Integration tests for the annal state-history pipeline.
//!
//! Test modules:
//!
//! - `historian_tests`: end-to-end write-path tests against a mock log
//!   store (push body shape, rejection handling, counter movement)
//! - `query_tests`: read-path tests (range-query composition, multi-stream
//!   merge ordering, fail-fast decoding)
//! - `mock_infrastructure`: reusable mockito wrapper for the store's push
//!   and range-query endpoints
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --package tests
//! ```
//!
//! Every test spins up its own in-process mock store; no external services
//! are required.

pub mod mock_infrastructure;


#[cfg(test)]
mod query_tests;
