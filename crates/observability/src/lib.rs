//! Shared tracing setup for the `tiredesk` binary and tests.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::{init, init_test, init_with_default};
