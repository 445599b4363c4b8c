//! Cart and checkout.
//!
//! The cart is session-scoped and purely in memory; checkout is the only
//! place that writes back to the inventory store.

pub mod cart;
pub mod checkout;

pub use cart::{
    Cart, CartItem, CartItemId, CartTotal, DEFAULT_QUANTITY, LineTotal, MAX_QUANTITY,
    MIN_QUANTITY, ServiceSelection, clamp_quantity,
};
pub use checkout::{CheckoutReport, process};
