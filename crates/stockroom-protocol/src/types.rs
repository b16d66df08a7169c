//! Core record types: identities, products, and the payloads that create
//! and change them.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a registered user.
///
/// Assigned once at registration and never reused. Every inventory
/// operation is scoped by one of these, so a `ProductId` can never be
/// passed where an owner is expected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// A unique identifier for a product, global across all owners.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// The public view of a registered identity.
///
/// The password secret is deliberately absent: it stays inside the
/// identity store and never crosses a crate boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

// ---------------------------------------------------------------------------
// Stock banding
// ---------------------------------------------------------------------------

/// Stock at or above this many units counts as adequate.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Display band for a stock quantity.
///
/// ```text
/// 0            → OutOfStock
/// 1 ..= 4      → Low
/// 5 ..         → Adequate
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    Low,
    Adequate,
}

impl StockLevel {
    /// Bands `stock` against [`LOW_STOCK_THRESHOLD`].
    pub fn from_stock(stock: u32) -> Self {
        match stock {
            0 => Self::OutOfStock,
            n if n < LOW_STOCK_THRESHOLD => Self::Low,
            _ => Self::Adequate,
        }
    }
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfStock => write!(f, "out of stock"),
            Self::Low => write!(f, "low"),
            Self::Adequate => write!(f, "adequate"),
        }
    }
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

/// An inventory record owned by exactly one user.
///
/// `owner_id` is fixed at creation. `stock` is unsigned, so a stored
/// product can never hold a negative quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub owner_id: UserId,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub purchase_price: Decimal,
    pub selling_price: Decimal,
    pub stock: u32,
}

impl Product {
    /// Builds a product from validated fields.
    pub fn new(id: ProductId, owner_id: UserId, fields: ProductFields) -> Self {
        Self {
            id,
            owner_id,
            name: fields.name,
            sku: fields.sku,
            category: fields.category,
            purchase_price: fields.purchase_price,
            selling_price: fields.selling_price,
            stock: fields.stock,
        }
    }

    pub fn stock_level(&self) -> StockLevel {
        StockLevel::from_stock(self.stock)
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// The create payload, exactly as a caller sent it.
///
/// `stock` is signed here so that a negative quantity decodes and is then
/// rejected by [`validate`](Self::validate) with a field-level error,
/// instead of failing as an opaque decode error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub sku: String,
    pub category: String,
    pub purchase_price: Decimal,
    pub selling_price: Decimal,
    pub stock: i64,
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub name: String,
    pub sku: String,
    pub category: String,
    pub purchase_price: Decimal,
    pub selling_price: Decimal,
    pub stock: u32,
}

impl ProductDraft {
    /// Checks every field rule and returns the validated fields.
    ///
    /// # Errors
    /// The first [`ValidationError`] found, checking fields in declaration
    /// order.
    pub fn validate(self) -> Result<ProductFields, ValidationError> {
        require_text("name", &self.name)?;
        require_text("sku", &self.sku)?;
        require_text("category", &self.category)?;
        require_price("purchasePrice", self.purchase_price)?;
        require_price("sellingPrice", self.selling_price)?;
        let stock = require_stock(self.stock)?;

        Ok(ProductFields {
            name: self.name,
            sku: self.sku,
            category: self.category,
            purchase_price: self.purchase_price,
            selling_price: self.selling_price,
            stock,
        })
    }
}

/// The partial-update payload. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selling_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
}

/// A patch that passed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub purchase_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub stock: Option<u32>,
}

impl ProductPatch {
    /// Checks the fields that are present.
    ///
    /// # Errors
    /// The first [`ValidationError`] found. A negative `stock` is always
    /// an error; it is never clamped to zero.
    pub fn validate(self) -> Result<ProductChanges, ValidationError> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(sku) = &self.sku {
            require_text("sku", sku)?;
        }
        if let Some(category) = &self.category {
            require_text("category", category)?;
        }
        if let Some(price) = self.purchase_price {
            require_price("purchasePrice", price)?;
        }
        if let Some(price) = self.selling_price {
            require_price("sellingPrice", price)?;
        }
        let stock = self.stock.map(require_stock).transpose()?;

        Ok(ProductChanges {
            name: self.name,
            sku: self.sku,
            category: self.category,
            purchase_price: self.purchase_price,
            selling_price: self.selling_price,
            stock,
        })
    }
}

impl ProductChanges {
    /// Writes every present field into `product`. Id and owner are never
    /// touched.
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(sku) = self.sku {
            product.sku = sku;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(price) = self.purchase_price {
            product.purchase_price = price;
        }
        if let Some(price) = self.selling_price {
            product.selling_price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(field));
    }
    Ok(())
}

fn require_price(
    field: &'static str,
    value: Decimal,
) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::Negative(field));
    }
    Ok(())
}

fn require_stock(value: i64) -> Result<u32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::Negative("stock"));
    }
    u32::try_from(value).map_err(|_| ValidationError::OutOfRange("stock"))
}

// ---------------------------------------------------------------------------
// InventorySummary
// ---------------------------------------------------------------------------

/// Aggregate numbers over one owner's products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub product_count: usize,
    pub total_units: u64,
    /// Sum of `purchase_price * stock`.
    pub stock_value: Decimal,
    pub out_of_stock: usize,
    pub low_stock: usize,
    pub adequate_stock: usize,
}

impl InventorySummary {
    pub fn from_products<'a>(
        products: impl IntoIterator<Item = &'a Product>,
    ) -> Self {
        let mut summary = Self::default();
        for product in products {
            summary.product_count += 1;
            summary.total_units += u64::from(product.stock);
            summary.stock_value = summary.stock_value.saturating_add(
                product
                    .purchase_price
                    .saturating_mul(Decimal::from(product.stock)),
            );
            match product.stock_level() {
                StockLevel::OutOfStock => summary.out_of_stock += 1,
                StockLevel::Low => summary.low_stock += 1,
                StockLevel::Adequate => summary.adequate_stock += 1,
            }
        }
        summary
    }
}

// =========================================================================
// Tests
// =========================================================================
