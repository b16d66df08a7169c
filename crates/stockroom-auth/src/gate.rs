//! The access gate: the only way in.
//!
//! The gate composes the [`IdentityStore`] and the [`SessionAuthority`]
//! and answers "who is calling?". Inventory code never sees a token; it
//! sees the `UserId` that [`AccessGate::require_caller`] returned.
//!
//! Password checks are CPU-bound, so [`register`](AccessGate::register)
//! and [`authenticate`](AccessGate::authenticate) run them on Tokio's
//! blocking pool instead of stalling the task that called them.

use std::sync::Arc;

use stockroom_protocol::{User, UserId};

use crate::session::token_hint;
use crate::{
    AuthError, IdentityStore, MemorySessionRegistry, Session,
    SessionAuthority, SessionRegistry,
};

/// Login, logout, and caller resolution. Cheap to clone.
pub struct AccessGate<R: SessionRegistry = MemorySessionRegistry> {
    identities: Arc<IdentityStore>,
    sessions: Arc<SessionAuthority<R>>,
}

impl<R: SessionRegistry> Clone for AccessGate<R> {
    fn clone(&self) -> Self {
        Self {
            identities: Arc::clone(&self.identities),
            sessions: Arc::clone(&self.sessions),
        }
    }
}

impl<R: SessionRegistry> AccessGate<R> {
    pub fn new(
        identities: Arc<IdentityStore>,
        sessions: Arc<SessionAuthority<R>>,
    ) -> Self {
        Self {
            identities,
            sessions,
        }
    }

    /// Registers a user and logs them straight in.
    ///
    /// # Errors
    /// Whatever [`IdentityStore::register`] returns, or
    /// [`AuthError::Internal`] if the hashing task dies.
    pub async fn register(
        &self,
        username: String,
        password: String,
    ) -> Result<(User, Session), AuthError> {
        let identities = Arc::clone(&self.identities);
        let user = tokio::task::spawn_blocking(move || {
            identities.register(&username, &password)
        })
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))??;

        let session = self.sessions.create(user.id);
        Ok((user, session))
    }

    /// Checks credentials and opens a session.
    ///
    /// # Errors
    /// [`AuthError::InvalidCredentials`] for an unknown username and for a
    /// wrong password alike.
    pub async fn authenticate(
        &self,
        username: String,
        password: String,
    ) -> Result<(User, Session), AuthError> {
        let identities = Arc::clone(&self.identities);
        let user = tokio::task::spawn_blocking(move || {
            identities.verify_credentials(&username, &password)
        })
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?;

        let Some(user) = user else {
            tracing::debug!("login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let session = self.sessions.create(user.id);
        tracing::info!(user_id = %user.id, "user logged in");
        Ok((user, session))
    }

    /// The mandatory checkpoint: turns a token into the caller's id.
    ///
    /// # Errors
    /// [`AuthError::Unauthorized`] for an unknown, expired, or
    /// invalidated token.
    pub fn require_caller(&self, token: &str) -> Result<UserId, AuthError> {
        self.sessions.resolve(token).ok_or_else(|| {
            tracing::debug!(token = token_hint(token), "caller rejected");
            AuthError::Unauthorized
        })
    }

    /// The full identity behind a token.
    ///
    /// # Errors
    /// [`AuthError::Unauthorized`], as for
    /// [`require_caller`](Self::require_caller).
    pub fn current_user(&self, token: &str) -> Result<User, AuthError> {
        let user_id = self.require_caller(token)?;
        self.identities
            .find(user_id)
            .ok_or(AuthError::Unauthorized)
    }

    /// Ends the session behind `token`. Unknown tokens are ignored.
    pub fn logout(&self, token: &str) {
        self.sessions.invalidate(token);
    }

    pub fn identities(&self) -> &IdentityStore {
        &self.identities
    }

    pub fn sessions(&self) -> &SessionAuthority<R> {
        &self.sessions
    }
}
