//! Inventory store: the Master catalog, the Central override table, and the
//! combined view derived from both.
//!
//! Everything here is deterministic in-memory logic. Files reach this crate
//! only as readers; opening and writing them is the caller's job.

pub mod csv_io;
pub mod search;
pub mod store;
pub mod table;
pub mod tire;

pub use search::{SearchPage, SortOrder, TireQuery, manufacturers, search};
pub use store::{CombinedViewCache, InventoryStore, merge_tables};
pub use table::{Table, TableView, TireTable};
pub use tire::{EuLabel, TireRecord};
