//! Reusable mock types for testing against an in-process log store.

mod log_store_mock;

pub use log_store_mock::LogStoreMockBuilder;
