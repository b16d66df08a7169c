//! Inventory store: owns every product and enforces per-owner sku
//! uniqueness.

use std::collections::HashMap;

use parking_lot::RwLock;
use stockroom_protocol::{
    IdAllocator, InventorySummary, Product, ProductDraft, ProductId,
    ProductPatch, UserId,
};

use crate::InventoryError;

/// Everything behind the lock. The two maps are only ever changed
/// together, inside one write guard.
#[derive(Default)]
struct Catalog {
    products: HashMap<ProductId, Product>,

    /// Per-owner sku index: owner → (sku → product).
    /// An owner may hold each sku at most once (key invariant).
    skus: HashMap<UserId, HashMap<String, ProductId>>,
}

impl Catalog {
    fn owned(&self, id: ProductId, owner_id: UserId) -> Option<&Product> {
        self.products.get(&id).filter(|p| p.owner_id == owner_id)
    }

    fn sku_holder(&self, owner_id: UserId, sku: &str) -> Option<ProductId> {
        self.skus.get(&owner_id)?.get(sku).copied()
    }

    fn owned_products(
        &self,
        owner_id: UserId,
    ) -> impl Iterator<Item = &Product> + '_ {
        self.skus
            .get(&owner_id)
            .into_iter()
            .flat_map(|skus| skus.values())
            .filter_map(|id| self.products.get(id))
    }
}

/// The single owner and writer of the product collection.
///
/// Reads share a read lock and always see a whole catalog; every write is
/// one critical section that either fully applies or leaves nothing
/// behind. Nothing inside a critical section blocks on anything else.
pub struct InventoryStore {
    catalog: RwLock<Catalog>,
    ids: IdAllocator,
}

impl InventoryStore {
    /// Creates an empty store. The first product gets id 1.
    pub fn new() -> Self {
        Self {
            catalog: RwLock::new(Catalog::default()),
            ids: IdAllocator::new(),
        }
    }

    /// All of `owner_id`'s products, ordered by id.
    ///
    /// Taken under one read guard, so concurrent writers never produce a
    /// duplicated or half-written entry.
    pub fn list(&self, owner_id: UserId) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .catalog
            .read()
            .owned_products(owner_id)
            .cloned()
            .collect();
        products.sort_by_key(|p| p.id);
        products
    }

    /// Creates a product for `owner_id`.
    ///
    /// The sku check and the insert share one write guard, so two racing
    /// creates of the same sku for the same owner cannot both succeed. A
    /// failed create consumes no id.
    ///
    /// # Errors
    /// - [`InventoryError::Validation`] — the draft broke a field rule
    /// - [`InventoryError::DuplicateSku`] — the owner already uses this sku
    pub fn create(
        &self,
        owner_id: UserId,
        draft: ProductDraft,
    ) -> Result<Product, InventoryError> {
        let fields = draft.validate()?;

        let mut catalog = self.catalog.write();
        if catalog.sku_holder(owner_id, &fields.sku).is_some() {
            tracing::debug!(%owner_id, sku = %fields.sku, "duplicate sku on create");
            return Err(InventoryError::DuplicateSku(fields.sku));
        }

        let id = ProductId(self.ids.allocate());
        let product = Product::new(id, owner_id, fields);
        catalog
            .skus
            .entry(owner_id)
            .or_default()
            .insert(product.sku.clone(), id);
        catalog.products.insert(id, product.clone());
        drop(catalog);

        tracing::info!(%owner_id, product_id = %id, sku = %product.sku, "product created");
        Ok(product)
    }

    /// The product, if it exists and belongs to `owner_id`.
    pub fn get(&self, id: ProductId, owner_id: UserId) -> Option<Product> {
        self.catalog.read().owned(id, owner_id).cloned()
    }

    /// `owner_id`'s product with this exact sku, if any.
    pub fn find_by_sku(&self, owner_id: UserId, sku: &str) -> Option<Product> {
        let catalog = self.catalog.read();
        let id = catalog.sku_holder(owner_id, sku)?;
        catalog.products.get(&id).cloned()
    }

    /// Applies the fields present in `patch`; absent fields are kept.
    ///
    /// Returns `Ok(None)` if the product does not exist or belongs to
    /// someone else. A changed sku is re-checked against the owner's
    /// other products in the same write guard that applies it.
    ///
    /// # Errors
    /// - [`InventoryError::Validation`] — e.g. a negative `stock`; the
    ///   product is left untouched
    /// - [`InventoryError::DuplicateSku`] — the new sku is taken by another
    ///   of the owner's products
    pub fn update(
        &self,
        id: ProductId,
        owner_id: UserId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, InventoryError> {
        let changes = patch.validate()?;

        let mut guard = self.catalog.write();
        let catalog = &mut *guard;

        let Some(current) = catalog.owned(id, owner_id) else {
            return Ok(None);
        };
        let renamed_from = match &changes.sku {
            Some(new_sku) if *new_sku != current.sku => {
                if catalog.sku_holder(owner_id, new_sku).is_some() {
                    tracing::debug!(
                        %owner_id, product_id = %id, sku = %new_sku,
                        "duplicate sku on update"
                    );
                    return Err(InventoryError::DuplicateSku(new_sku.clone()));
                }
                Some(current.sku.clone())
            }
            _ => None,
        };

        let Some(product) = catalog.products.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply(product);
        let updated = product.clone();

        if let Some(old_sku) = renamed_from {
            let skus = catalog.skus.entry(owner_id).or_default();
            skus.remove(&old_sku);
            skus.insert(updated.sku.clone(), id);
        }
        drop(guard);

        tracing::info!(%owner_id, product_id = %id, "product updated");
        Ok(Some(updated))
    }

    /// Removes the product if it exists and belongs to `owner_id`.
    ///
    /// Returns `false` otherwise, including for an id that was already
    /// deleted. Deleted ids are never handed out again.
    pub fn delete(&self, id: ProductId, owner_id: UserId) -> bool {
        let mut guard = self.catalog.write();
        let catalog = &mut *guard;

        if catalog.owned(id, owner_id).is_none() {
            return false;
        }
        let Some(product) = catalog.products.remove(&id) else {
            return false;
        };
        if let Some(skus) = catalog.skus.get_mut(&owner_id) {
            skus.remove(&product.sku);
            if skus.is_empty() {
                catalog.skus.remove(&owner_id);
            }
        }
        drop(guard);

        tracing::info!(%owner_id, product_id = %id, sku = %product.sku, "product deleted");
        true
    }

    /// Aggregate numbers over one consistent snapshot of `owner_id`'s
    /// products.
    pub fn summary(&self, owner_id: UserId) -> InventorySummary {
        InventorySummary::from_products(
            self.catalog.read().owned_products(owner_id),
        )
    }

    /// Total number of products across all owners.
    pub fn len(&self) -> usize {
        self.catalog.read().products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
