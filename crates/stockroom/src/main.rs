//! `stockroomd`: runs a Stockroom server.
//!
//! Configuration comes from the environment:
//!
//! - `STOCKROOM_BIND` — listen address (default `127.0.0.1:8080`)
//! - `STOCKROOM_SEED_DEMO` — `true` to create the demo account
//! - `RUST_LOG` — log filter (default `info`)

use stockroom::{StockroomConfig, StockroomError, StockroomServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), StockroomError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = StockroomConfig::from_env();
    let server = StockroomServer::builder().config(config).build().await?;

    match server.local_addr() {
        Ok(addr) => tracing::info!(%addr, "stockroomd listening"),
        Err(e) => tracing::warn!(error = %e, "local address unavailable"),
    }

    server.run().await
}
