//! `StockroomServer` builder and accept loop.
//!
//! This is the entry point for running a Stockroom server. It ties the
//! layers together: transport → protocol → service (gate + inventory).

use std::sync::Arc;
use std::time::Duration;

use stockroom_auth::{HasherConfig, SessionConfig};
use stockroom_protocol::{Codec, JsonCodec};

use crate::handler::handle_connection;
use crate::seed::seed_demo_data;
use crate::sweeper::spawn_session_sweeper;
use crate::transport::WebSocketListener;
use crate::{Stockroom, StockroomConfig, StockroomError};

/// Shared server state passed to each connection task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) service: Stockroom,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Option<Duration>,
}

/// Builder for configuring and starting a Stockroom server.
///
/// # Example
///
/// ```rust,no_run
/// use stockroom::prelude::*;
///
/// # async fn start() -> Result<(), StockroomError> {
/// let server = StockroomServer::builder()
///     .bind("0.0.0.0:8080")
///     .seed_demo_data(true)
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct StockroomServerBuilder {
    config: StockroomConfig,
}

impl StockroomServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: StockroomConfig::default(),
        }
    }

    /// Replaces every setting at once.
    pub fn config(mut self, config: StockroomConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config.session = config;
        self
    }

    /// Sets the password hashing costs.
    pub fn hasher_config(mut self, config: HasherConfig) -> Self {
        self.config.hasher = config;
        self
    }

    pub fn seed_demo_data(mut self, seed: bool) -> Self {
        self.config.seed_demo_data = seed;
        self
    }

    /// Builds the service, seeds it if asked to, and binds the listener.
    ///
    /// Uses [`JsonCodec`] on the wire.
    pub async fn build(self) -> Result<StockroomServer<JsonCodec>, StockroomError> {
        let service = Stockroom::new(&self.config)?;

        if self.config.seed_demo_data {
            let seeding = service.clone();
            tokio::task::spawn_blocking(move || seed_demo_data(&seeding))
                .await
                .map_err(|e| {
                    stockroom_auth::AuthError::Internal(e.to_string())
                })??;
        }

        let listener = WebSocketListener::bind(&self.config.bind_addr).await?;
        let idle_timeout = match self.config.idle_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(StockroomServer {
            listener,
            state: Arc::new(ServerState {
                service,
                codec: JsonCodec,
                idle_timeout,
            }),
            sweep_interval: self.config.session.sweep_interval_secs,
        })
    }
}

impl Default for StockroomServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Stockroom server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct StockroomServer<C: Codec> {
    listener: WebSocketListener,
    state: Arc<ServerState<C>>,
    sweep_interval: u64,
}

impl StockroomServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> StockroomServerBuilder {
        StockroomServerBuilder::new()
    }
}

impl<C: Codec> StockroomServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// The service behind the socket, for in-process callers.
    pub fn service(&self) -> &Stockroom {
        &self.state.service
    }

    /// Runs the accept loop, plus the session sweeper if one is
    /// configured.
    ///
    /// Spawns a handler task per connection. Runs until the process is
    /// terminated; the sweeper stops with it.
    pub async fn run(self) -> Result<(), StockroomError> {
        let _sweeper = (self.sweep_interval > 0).then(|| {
            SweeperGuard(spawn_session_sweeper(
                self.state.service.clone(),
                Duration::from_secs(self.sweep_interval),
            ))
        });

        tracing::info!("stockroom server running");

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, peer, state).await {
                            tracing::debug!(
                                %peer,
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Aborts the sweeper when the accept loop's future is dropped.
struct SweeperGuard(tokio::task::JoinHandle<()>);

impl Drop for SweeperGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}
