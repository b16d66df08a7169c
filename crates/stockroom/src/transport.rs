//! WebSocket listener and connections, via `tokio-tungstenite`.
//!
//! Accepting is split in two: [`WebSocketListener::accept`] only takes the
//! TCP stream, and [`WebSocketConnection::upgrade`] runs the WebSocket
//! handshake inside the connection's own task. A client that stalls its
//! handshake therefore never holds up the accept loop.

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::{self, Message};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listener failed.
    #[error("bind failed: {0}")]
    BindFailed(#[source] std::io::Error),

    /// Accepting a TCP connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The client did not complete a WebSocket handshake.
    #[error("websocket handshake failed: {0}")]
    HandshakeFailed(#[source] tungstenite::Error),

    /// Sending a frame failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] tungstenite::Error),

    /// Receiving a frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] tungstenite::Error),
}

/// Opaque identifier for a connection, used only in log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

/// Listens for incoming TCP connections to upgrade.
pub struct WebSocketListener {
    listener: TcpListener,
}

impl WebSocketListener {
    /// Binds to `addr`. Port 0 picks a free port; see
    /// [`local_addr`](Self::local_addr).
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::BindFailed)?;
        tracing::info!(addr, "websocket listener bound");
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Waits for the next TCP connection. Call
    /// [`WebSocketConnection::upgrade`] on it from the connection's task.
    pub async fn accept(
        &self,
    ) -> Result<(TcpStream, SocketAddr), TransportError> {
        self.listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)
    }
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// One upgraded WebSocket connection.
///
/// Owned by a single task that alternates `recv` and `send`, so no lock
/// is needed around the stream.
pub struct WebSocketConnection {
    id: ConnectionId,
    peer: SocketAddr,
    ws: WebSocketStream<TcpStream>,
}

impl WebSocketConnection {
    /// Runs the server side of the WebSocket handshake.
    pub async fn upgrade(
        stream: TcpStream,
        peer: SocketAddr,
    ) -> Result<Self, TransportError> {
        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(TransportError::HandshakeFailed)?;

        let id = ConnectionId::next();
        tracing::debug!(%id, %peer, "accepted websocket connection");
        Ok(Self { id, peer, ws })
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Sends one text frame.
    pub async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.ws
            .send(Message::text(text))
            .await
            .map_err(TransportError::SendFailed)
    }

    /// Receives the next data frame, text or binary.
    ///
    /// Returns `Ok(None)` once the peer closes. Ping and pong frames are
    /// answered by tungstenite and skipped here.
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_str().as_bytes().to_vec()));
                }
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue,
                Some(Err(
                    tungstenite::Error::ConnectionClosed
                    | tungstenite::Error::AlreadyClosed,
                )) => return Ok(None),
                Some(Err(e)) => return Err(TransportError::ReceiveFailed(e)),
            }
        }
    }

    /// Starts the closing handshake. Errors are ignored: the peer may
    /// already be gone.
    pub async fn close(&mut self) {
        if let Err(e) = self.ws.close(None).await {
            tracing::debug!(id = %self.id, error = %e, "close failed");
        }
    }
}
