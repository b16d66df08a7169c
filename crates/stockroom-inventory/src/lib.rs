//! The product store for Stockroom.
//!
//! Products are partitioned by owner. Every operation takes the caller's
//! [`UserId`](stockroom_protocol::UserId), already resolved by the access
//! gate, and only ever sees that owner's slice of the catalog.
//!
//! # Key types
//!
//! - [`InventoryStore`] — create, read, update, delete, list, summarize
//! - [`InventoryError`] — duplicate sku or invalid payload

mod error;
mod store;

pub use error::InventoryError;
pub use store::InventoryStore;
