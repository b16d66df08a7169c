//! # Stockroom
//!
//! A multi-tenant inventory service. Users register and log in; every
//! product belongs to the user who created it, and nobody can see or touch
//! anyone else's.
//!
//! The layers, leaves first:
//!
//! ```text
//! stockroom-protocol   ids, Product, payloads, validation, wire messages
//! stockroom-auth       hashing, identities, sessions, the access gate
//! stockroom-inventory  the per-owner product store
//! stockroom            Stockroom service, WebSocket front, stockroomd
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stockroom::prelude::*;
//!
//! # async fn start() -> Result<(), StockroomError> {
//! let server = StockroomServer::builder()
//!     .bind("127.0.0.1:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```
//!
//! In-process callers can skip the socket and use [`Stockroom`] directly.

mod config;
mod error;
mod handler;
mod seed;
mod server;
mod service;
mod sweeper;
mod transport;

pub use config::StockroomConfig;
pub use error::StockroomError;
pub use handler::dispatch;
pub use seed::{DEMO_PASSWORD, DEMO_USERNAME, seed_demo_data};
pub use server::{StockroomServer, StockroomServerBuilder};
pub use service::Stockroom;
pub use sweeper::spawn_session_sweeper;
pub use transport::{
    ConnectionId, TransportError, WebSocketConnection, WebSocketListener,
};

/// Everything needed to run a server or call the service in-process.
pub mod prelude {
    pub use crate::{
        Stockroom, StockroomConfig, StockroomError, StockroomServer,
        StockroomServerBuilder,
    };
    pub use stockroom_auth::{AuthError, HasherConfig, Session, SessionConfig};
    pub use stockroom_inventory::InventoryError;
    pub use stockroom_protocol::{
        Decimal, Envelope, InventorySummary, Product, ProductDraft, ProductId,
        ProductPatch, Request, Response, StockLevel, User, UserId,
        ValidationError, error_codes,
    };
}
