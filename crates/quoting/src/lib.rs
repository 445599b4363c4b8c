//! Plain-text customer quotes rendered from a cart.

pub mod customer;
pub mod quote;

pub use customer::CustomerData;
pub use quote::{QuoteFormatter, QuoteSettings, RenderedQuote, quote_filename};
