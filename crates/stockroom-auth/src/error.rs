//! Error types for the auth layer.

use stockroom_protocol::ValidationError;

/// Errors that can occur while registering, logging in, or resolving a
/// caller.
///
/// Messages never include a password, a password secret, or a session
/// token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Registration collided with an existing username.
    #[error("username {0:?} is already taken")]
    DuplicateIdentity(String),

    /// Login failed. Deliberately silent on whether the username exists.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// No session, an unknown token, or an expired one.
    #[error("unauthorized")]
    Unauthorized,

    /// Username or password failed a shape check.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The hasher rejected its own parameters. Points at a bad
    /// [`HasherConfig`](crate::HasherConfig), never at the password.
    #[error("credential hashing failed")]
    Hashing,

    /// A background hashing task died before answering.
    #[error("credential task failed: {0}")]
    Internal(String),
}
