//! The `Stockroom` service: the access gate in front of the inventory.
//!
//! Every inventory method takes a session token and resolves it through
//! [`AccessGate::require_caller`] before the store is touched. The store
//! itself is only reachable through this type, so there is no path to a
//! product that skips the gate.

use std::sync::Arc;

use stockroom_auth::{
    AccessGate, CredentialHasher, IdentityStore, Session, SessionAuthority,
};
use stockroom_inventory::InventoryStore;
use stockroom_protocol::{
    InventorySummary, Product, ProductDraft, ProductId, ProductPatch, User,
};

use crate::{StockroomConfig, StockroomError};

/// Identity, sessions, and inventory behind one handle. Cheap to clone.
#[derive(Clone)]
pub struct Stockroom {
    gate: AccessGate,
    inventory: Arc<InventoryStore>,
}

impl Stockroom {
    /// Builds an empty service from `config`.
    ///
    /// # Errors
    /// [`StockroomError::Auth`] if the hasher rejects its cost parameters.
    pub fn new(config: &StockroomConfig) -> Result<Self, StockroomError> {
        let hasher = CredentialHasher::new(&config.hasher)?;
        let gate = AccessGate::new(
            Arc::new(IdentityStore::new(hasher)),
            Arc::new(SessionAuthority::new(config.session.clone())),
        );
        Ok(Self::from_parts(gate, Arc::new(InventoryStore::new())))
    }

    pub fn from_parts(gate: AccessGate, inventory: Arc<InventoryStore>) -> Self {
        Self { gate, inventory }
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    // -- Identity ----------------------------------------------------------

    /// Creates an account and logs it in.
    pub async fn register(
        &self,
        username: String,
        password: String,
    ) -> Result<(User, Session), StockroomError> {
        Ok(self.gate.register(username, password).await?)
    }

    pub async fn login(
        &self,
        username: String,
        password: String,
    ) -> Result<(User, Session), StockroomError> {
        Ok(self.gate.authenticate(username, password).await?)
    }

    /// Ends the session. Logging out twice, or with a token that never
    /// existed, is not an error.
    pub fn logout(&self, token: &str) {
        self.gate.logout(token);
    }

    pub fn me(&self, token: &str) -> Result<User, StockroomError> {
        Ok(self.gate.current_user(token)?)
    }

    // -- Inventory ---------------------------------------------------------

    pub fn list_products(
        &self,
        token: &str,
    ) -> Result<Vec<Product>, StockroomError> {
        let owner_id = self.gate.require_caller(token)?;
        Ok(self.inventory.list(owner_id))
    }

    /// `Ok(None)` when the product does not exist for this caller,
    /// whether or not another user owns that id.
    pub fn get_product(
        &self,
        token: &str,
        id: ProductId,
    ) -> Result<Option<Product>, StockroomError> {
        let owner_id = self.gate.require_caller(token)?;
        Ok(self.inventory.get(id, owner_id))
    }

    pub fn create_product(
        &self,
        token: &str,
        draft: ProductDraft,
    ) -> Result<Product, StockroomError> {
        let owner_id = self.gate.require_caller(token)?;
        Ok(self.inventory.create(owner_id, draft)?)
    }

    pub fn update_product(
        &self,
        token: &str,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StockroomError> {
        let owner_id = self.gate.require_caller(token)?;
        Ok(self.inventory.update(id, owner_id, patch)?)
    }

    pub fn delete_product(
        &self,
        token: &str,
        id: ProductId,
    ) -> Result<bool, StockroomError> {
        let owner_id = self.gate.require_caller(token)?;
        Ok(self.inventory.delete(id, owner_id))
    }

    pub fn summary(
        &self,
        token: &str,
    ) -> Result<InventorySummary, StockroomError> {
        let owner_id = self.gate.require_caller(token)?;
        Ok(self.inventory.summary(owner_id))
    }

    pub(crate) fn inventory(&self) -> &InventoryStore {
        &self.inventory
    }
}
