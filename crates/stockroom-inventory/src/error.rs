//! Error types for the inventory layer.

use stockroom_protocol::ValidationError;

/// Errors that can occur while changing the catalog.
///
/// "Not found" is not here: a product that does not exist and a product
/// owned by someone else both come back as `None`/`false`, so callers
/// cannot probe other owners' ids.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// The owner already has a product with this sku.
    #[error("sku {0:?} already exists")]
    DuplicateSku(String),

    /// The draft or patch broke a field rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
