//! Error types for the protocol layer.
//!
//! Two families live here: [`ValidationError`] for payloads that are
//! well-formed JSON but break a field rule, and [`ProtocolError`] for bytes
//! that could not be turned into a message at all.

/// A payload field broke one of the record rules.
///
/// Validation runs before any store is touched, so returning one of these
/// never leaves partial state behind. The field name is always one of the
/// public payload fields; values are never echoed back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required text field was empty or whitespace only.
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// A price or quantity was below zero.
    #[error("{0} must not be negative")]
    Negative(&'static str),

    /// A quantity does not fit the stored representation.
    #[error("{0} is out of range")]
    OutOfRange(&'static str),
}

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, a missing field, or an
    /// unknown request type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but is not acceptable at this point.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
