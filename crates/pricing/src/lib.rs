//! Pricing rules for workshop services.
//!
//! Pure lookups over a [`ServicePrices`] table: no state, no IO beyond the
//! optional CSV form of the table.

pub mod price_table;
pub mod service_prices;
pub mod tier;

pub use service_prices::{ServiceKey, ServicePrices};
pub use tier::{RimTier, WheelChangeTier};
