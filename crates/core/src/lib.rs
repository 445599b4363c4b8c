//! `tiredesk-core`: domain building blocks shared by every tiredesk crate.
//!
//! This crate contains **pure domain** primitives (no IO, no configuration).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{PartNumber, SessionId};
pub use value_object::{Money, ValueObject};
