//! Session types: what the server remembers about a logged-in caller.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use stockroom_protocol::UserId;

/// Upper bound on the configured TTL, so `Instant` arithmetic can't
/// overflow. About 100 years.
const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 3600;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long (in seconds) a session stays valid after login.
    ///
    /// Default: 24 hours. 0 means every session is born expired, which is
    /// only useful in tests.
    pub ttl_secs: u64,

    /// How often (in seconds) the server sweeps expired sessions out of
    /// the registry. 0 disables the sweeper; expired sessions are then
    /// only dropped when someone presents them.
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 24 * 3600,
            sweep_interval_secs: 3600,
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs.min(MAX_TTL_SECS))
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where a session is in its life.
///
/// ```text
///   Active ──(ttl elapses)──→ Expired
///     │
///     └──(logout)──→ removed from the registry
/// ```
///
/// Both ends are terminal. An invalidated session has no state at all:
/// it is gone, and its token resolves exactly like one that never
/// existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Expired,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A token bound to one user, valid until `expires_at`.
///
/// Never mutated after creation. Copies handed out by the registry are
/// whole snapshots, never half-updated.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// 64 hex characters (256 random bits).
    pub token: String,
    pub user_id: UserId,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl Session {
    pub(crate) fn new(token: String, user_id: UserId, ttl: Duration) -> Self {
        let created_at = Instant::now();
        Self {
            token,
            user_id,
            created_at,
            expires_at: created_at + ttl,
        }
    }

    pub fn state_at(&self, now: Instant) -> SessionState {
        if now >= self.expires_at {
            SessionState::Expired
        } else {
            SessionState::Active
        }
    }

    pub fn is_active_at(&self, now: Instant) -> bool {
        self.state_at(now) == SessionState::Active
    }

    /// The first few characters of the token, for log lines.
    pub fn token_hint(&self) -> &str {
        token_hint(&self.token)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &format_args!("{}…", self.token_hint()))
            .field("user_id", &self.user_id)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Shortens an arbitrary (possibly client-supplied) token for logging.
pub(crate) fn token_hint(token: &str) -> &str {
    token.get(..8).unwrap_or("")
}
