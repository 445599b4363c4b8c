//! `tiredesk-auth`: the admin gate in front of data-changing operations.
//!
//! This is a UI speed bump against accidental edits at the counter, not a
//! security boundary: there is one shared password, kept in plain text in the
//! configuration.

pub mod gate;

pub use gate::{AdminGate, AuthError};
