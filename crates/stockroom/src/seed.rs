//! Demo account and sample catalog for local runs.

use stockroom_protocol::{Decimal, ProductDraft, User};

use crate::{Stockroom, StockroomError};

pub const DEMO_USERNAME: &str = "demo@inventorypro.com";
pub const DEMO_PASSWORD: &str = "demo123";

/// (name, sku, category, purchase cents, selling cents, stock)
const SAMPLE_PRODUCTS: [(&str, &str, &str, i64, i64, i64); 6] = [
    ("MacBook Pro 14-inch", "MBP14-001", "Electronics", 199_999, 239_999, 15),
    ("Wireless Gaming Mouse", "WGM-002", "Electronics", 7_999, 9_999, 3),
    ("Organic Cotton T-Shirt", "OCT-003", "Clothing", 1_499, 2_499, 8),
    ("Yoga Mat Premium", "YMP-004", "Sports", 2_999, 4_999, 2),
    ("Coffee Maker Deluxe", "CMD-005", "Home & Garden", 8_999, 12_999, 12),
    ("JavaScript Programming Guide", "JSG-006", "Books", 1_999, 3_999, 0),
];

/// Creates the demo user and its six sample products.
///
/// Does nothing if the demo user already exists. Blocking: it hashes a
/// password, so call it from `spawn_blocking` inside a runtime.
pub fn seed_demo_data(service: &Stockroom) -> Result<User, StockroomError> {
    let identities = service.gate().identities();
    if let Some(user) = identities.find_by_username(DEMO_USERNAME) {
        tracing::debug!(user_id = %user.id, "demo data already present");
        return Ok(user);
    }

    let user = identities.register(DEMO_USERNAME, DEMO_PASSWORD)?;
    for (name, sku, category, purchase, selling, stock) in SAMPLE_PRODUCTS {
        service.inventory().create(
            user.id,
            ProductDraft {
                name: name.to_string(),
                sku: sku.to_string(),
                category: category.to_string(),
                purchase_price: Decimal::new(purchase, 2),
                selling_price: Decimal::new(selling, 2),
                stock,
            },
        )?;
    }

    tracing::info!(
        user_id = %user.id,
        products = SAMPLE_PRODUCTS.len(),
        "demo data seeded"
    );
    Ok(user)
}
