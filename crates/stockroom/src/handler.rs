//! Per-connection handler and request dispatch.
//!
//! Each accepted connection gets its own Tokio task running
//! [`handle_connection`]. The flow is:
//!   1. Upgrade the TCP stream to a WebSocket
//!   2. Loop: receive a frame → decode `Envelope<Request>` → [`dispatch`]
//!      → send `Envelope<Response>` with the same id
//!
//! A frame that does not decode gets a 400 and the connection stays open.
//! Tokens travel inside each request, so the connection itself carries no
//! identity and a logout on one connection is seen by all of them.

use std::sync::Arc;

use serde::Deserialize;
use stockroom_auth::AuthError;
use stockroom_inventory::InventoryError;
use stockroom_protocol::{Codec, Envelope, Request, Response, error_codes};
use tokio::net::TcpStream;

use crate::server::ServerState;
use crate::transport::WebSocketConnection;
use crate::{Stockroom, StockroomError};

/// Shown for any product the caller cannot see, owned by someone else or
/// not.
const NOT_FOUND_MESSAGE: &str = "product not found";

/// Just enough of an envelope to echo its id when the body is bad.
#[derive(Deserialize)]
struct EnvelopeId {
    id: u64,
}

/// Handles a single connection from upgrade to close.
pub(crate) async fn handle_connection<C: Codec>(
    stream: TcpStream,
    peer: std::net::SocketAddr,
    state: Arc<ServerState<C>>,
) -> Result<(), StockroomError> {
    let mut conn = WebSocketConnection::upgrade(stream, peer).await?;
    let conn_id = conn.id();
    let idle = state.idle_timeout;

    loop {
        let next = match idle {
            Some(limit) => match tokio::time::timeout(limit, conn.recv()).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::info!(%conn_id, "connection idle, closing");
                    conn.close().await;
                    break;
                }
            },
            None => conn.recv().await,
        };

        let data = match next {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let reply = match state.codec.decode::<Envelope<Request>>(&data) {
            Ok(envelope) => {
                tracing::debug!(
                    %conn_id,
                    id = envelope.id,
                    kind = envelope.body.kind(),
                    "request"
                );
                Envelope {
                    id: envelope.id,
                    body: dispatch(&state.service, envelope.body).await,
                }
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode request");
                let id = state
                    .codec
                    .decode::<EnvelopeId>(&data)
                    .map(|env| env.id)
                    .unwrap_or(0);
                Envelope {
                    id,
                    body: Response::error(
                        error_codes::BAD_REQUEST,
                        "malformed request",
                    ),
                }
            }
        };

        let bytes = state.codec.encode(&reply)?;
        let text = String::from_utf8(bytes).map_err(|_| {
            stockroom_protocol::ProtocolError::InvalidMessage(
                "codec produced non-UTF-8 output".into(),
            )
        })?;
        conn.send_text(text).await?;
    }

    Ok(())
}

/// Runs one request against the service and turns the outcome into a
/// response. Never fails: every error becomes [`Response::Error`].
pub async fn dispatch(service: &Stockroom, request: Request) -> Response {
    let result = match request {
        Request::Register { username, password } => service
            .register(username, password)
            .await
            .map(|(user, session)| Response::Registered {
                user,
                token: session.token,
            }),
        Request::Login { username, password } => service
            .login(username, password)
            .await
            .map(|(user, session)| Response::LoggedIn {
                user,
                token: session.token,
            }),
        Request::Logout { token } => {
            service.logout(&token);
            Ok(Response::LoggedOut)
        }
        Request::Me { token } => {
            service.me(&token).map(|user| Response::Me { user })
        }
        Request::ListProducts { token } => service
            .list_products(&token)
            .map(|products| Response::Products { products }),
        Request::GetProduct { token, id } => service
            .get_product(&token, id)
            .map(found_or_not),
        Request::CreateProduct { token, product } => service
            .create_product(&token, product)
            .map(|product| Response::Product { product }),
        Request::UpdateProduct { token, id, changes } => service
            .update_product(&token, id, changes)
            .map(found_or_not),
        Request::DeleteProduct { token, id } => {
            service.delete_product(&token, id).map(|deleted| {
                if deleted {
                    Response::Deleted { id }
                } else {
                    Response::error(error_codes::NOT_FOUND, NOT_FOUND_MESSAGE)
                }
            })
        }
        Request::Summary { token } => service
            .summary(&token)
            .map(|summary| Response::Summary { summary }),
    };

    result.unwrap_or_else(|e| error_response(&e))
}

fn found_or_not(product: Option<stockroom_protocol::Product>) -> Response {
    match product {
        Some(product) => Response::Product { product },
        None => Response::error(error_codes::NOT_FOUND, NOT_FOUND_MESSAGE),
    }
}

/// Maps an error to a status code and a message that is safe to send.
fn error_response(err: &StockroomError) -> Response {
    let code = match err {
        StockroomError::Auth(
            AuthError::Unauthorized | AuthError::InvalidCredentials,
        ) => error_codes::UNAUTHORIZED,
        StockroomError::Auth(
            AuthError::DuplicateIdentity(_) | AuthError::Validation(_),
        )
        | StockroomError::Inventory(
            InventoryError::DuplicateSku(_) | InventoryError::Validation(_),
        )
        | StockroomError::Protocol(_) => error_codes::BAD_REQUEST,
        StockroomError::Auth(AuthError::Hashing | AuthError::Internal(_))
        | StockroomError::Transport(_) => {
            tracing::error!(error = %err, "request failed");
            return Response::error(error_codes::INTERNAL, "internal error");
        }
    };
    Response::error(code, err.to_string())
}
