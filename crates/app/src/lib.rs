//! `tiredesk` application layer: configuration, per-session state, the data
//! directory and the command-line surface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod data;
pub mod output;
pub mod session;
pub mod status;

pub use config::{AppConfig, ConfigError};
pub use data::DataDir;
pub use session::{CompletedCheckout, Session};
pub use status::{StatusLevel, StatusMessage};
