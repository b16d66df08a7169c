//! Unified error type for Stockroom.

use stockroom_auth::AuthError;
use stockroom_inventory::InventoryError;
use stockroom_protocol::{ProtocolError, ValidationError};

use crate::TransportError;

/// Top-level error that wraps every layer's error.
///
/// The `#[from]` attribute on each variant generates the `From` impl, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum StockroomError {
    /// Listener or connection failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Bytes that did not decode into a request, or a response that did
    /// not encode.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Registration, login, or caller resolution failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The inventory refused a write.
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

impl StockroomError {
    /// The payload rule that was broken, if that is what this is.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Auth(AuthError::Validation(e))
            | Self::Inventory(InventoryError::Validation(e)) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::SendFailed(
            tokio_tungstenite::tungstenite::Error::ConnectionClosed,
        );
        let wrapped: StockroomError = err.into();
        assert!(matches!(wrapped, StockroomError::Transport(_)));
        assert!(wrapped.to_string().starts_with("send failed"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let wrapped: StockroomError = err.into();
        assert!(matches!(wrapped, StockroomError::Protocol(_)));
    }

    #[test]
    fn test_from_auth_error_keeps_message() {
        let wrapped: StockroomError = AuthError::Unauthorized.into();
        assert!(matches!(wrapped, StockroomError::Auth(_)));
        assert_eq!(wrapped.to_string(), "unauthorized");
    }

    #[test]
    fn test_from_inventory_error() {
        let err = InventoryError::DuplicateSku("W-1".into());
        let wrapped: StockroomError = err.into();
        assert!(matches!(wrapped, StockroomError::Inventory(_)));
        assert!(wrapped.to_string().contains("W-1"));
    }

    #[test]
    fn test_validation_found_through_either_layer() {
        let auth: StockroomError =
            AuthError::Validation(ValidationError::Empty("password")).into();
        let inventory: StockroomError =
            InventoryError::Validation(ValidationError::Negative("stock"))
                .into();

        assert_eq!(
            auth.validation(),
            Some(&ValidationError::Empty("password"))
        );
        assert_eq!(
            inventory.validation(),
            Some(&ValidationError::Negative("stock"))
        );
        assert!(
            StockroomError::from(AuthError::Unauthorized)
                .validation()
                .is_none()
        );
    }
}
