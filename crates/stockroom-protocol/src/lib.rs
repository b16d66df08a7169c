//! Shared vocabulary for Stockroom.
//!
//! Every other crate in the workspace speaks in these types:
//!
//! - **Records** ([`User`], [`Product`], [`UserId`], [`ProductId`]) — what
//!   the stores own and hand back to callers.
//! - **Payloads** ([`ProductDraft`], [`ProductPatch`]) — what callers send
//!   in, and the validation that turns them into [`ProductFields`] /
//!   [`ProductChanges`] before any store sees them.
//! - **Wire** ([`Request`], [`Response`], [`Envelope`], [`Codec`]) — the
//!   JSON messages spoken by the network front.
//!
//! ```text
//! Front (Envelope<Request>) → Auth (UserId) → Inventory (Product)
//! ```
//!
//! This crate holds no state apart from [`IdAllocator`], which the stores
//! embed to hand out ids.

mod codec;
mod error;
mod ids;
mod types;
mod wire;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::{ProtocolError, ValidationError};
pub use ids::IdAllocator;
pub use types::{
    InventorySummary, LOW_STOCK_THRESHOLD, Product, ProductChanges,
    ProductDraft, ProductFields, ProductId, ProductPatch, StockLevel, User,
    UserId,
};
pub use wire::{Envelope, Request, Response, error_codes};

/// Re-exported so downstream crates name prices without a direct
/// `rust_decimal` dependency.
pub use rust_decimal::Decimal;
