//! The session authority: issues, resolves, and invalidates tokens.
//!
//! # Lifecycle
//!
//! ```text
//! create() ──→ [Active] ──(ttl)──→ [Expired] ──→ dropped by resolve()
//!                 │                     │        or purge_expired()
//!                 ▼                     │
//!            invalidate() ──→ removed ◀─┘
//! ```
//!
//! Resolving an unknown, expired, or invalidated token is not an error:
//! it returns `None`, and the gate turns that into `Unauthorized`.

use std::time::Instant;

use rand::Rng;
use stockroom_protocol::UserId;

use crate::session::token_hint;
use crate::{MemorySessionRegistry, Session, SessionConfig, SessionRegistry};

/// Issues and checks session tokens.
///
/// Generic over where sessions are stored; the default is the in-memory
/// registry.
pub struct SessionAuthority<R: SessionRegistry = MemorySessionRegistry> {
    registry: R,
    config: SessionConfig,
}

impl SessionAuthority<MemorySessionRegistry> {
    /// An authority backed by a fresh in-memory registry.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_registry(config, MemorySessionRegistry::new())
    }
}

impl<R: SessionRegistry> SessionAuthority<R> {
    pub fn with_registry(config: SessionConfig, registry: R) -> Self {
        Self { registry, config }
    }

    /// Starts a session for `user_id` and returns it, token included.
    pub fn create(&self, user_id: UserId) -> Session {
        loop {
            let session =
                Session::new(generate_token(), user_id, self.config.ttl());
            // A 256-bit collision won't happen, but if it ever does the
            // existing session must not be overwritten.
            if self.registry.insert(session.clone()) {
                tracing::info!(
                    %user_id,
                    token = session.token_hint(),
                    "session created"
                );
                return session;
            }
        }
    }

    /// The user bound to `token`, if the session exists and is active.
    ///
    /// An expired session is removed on the way out.
    pub fn resolve(&self, token: &str) -> Option<UserId> {
        let session = self.registry.get(token)?;
        if session.is_active_at(Instant::now()) {
            return Some(session.user_id);
        }

        self.registry.remove(token);
        tracing::debug!(
            user_id = %session.user_id,
            token = token_hint(token),
            "expired session presented"
        );
        None
    }

    /// Ends the session for `token` immediately.
    ///
    /// Idempotent: returns `true` if a session was removed, `false` if
    /// there was nothing to remove. Neither case is an error.
    pub fn invalidate(&self, token: &str) -> bool {
        match self.registry.remove(token) {
            Some(session) => {
                tracing::info!(
                    user_id = %session.user_id,
                    token = session.token_hint(),
                    "session invalidated"
                );
                true
            }
            None => false,
        }
    }

    /// Removes every expired session. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let purged = self.registry.purge_expired(Instant::now());
        if purged > 0 {
            tracing::info!(purged, "expired sessions purged");
        }
        purged
    }

    /// Number of stored sessions, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

/// Generates a random 64-character hex string (256 bits of entropy).
fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

// =========================================================================
// Tests
// =========================================================================
