//! Where live sessions are kept.
//!
//! [`SessionAuthority`](crate::SessionAuthority) talks to a
//! [`SessionRegistry`], never to a map directly, so the in-memory backing
//! used today can be swapped for a shared store later without touching
//! the authority or the gate.

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::Mutex;

use crate::Session;

/// Storage for sessions, keyed by token.
///
/// Implementations must be safe to call from many threads at once and
/// must hand out whole `Session` values; a reader never sees a session
/// that is half inserted or half removed.
pub trait SessionRegistry: Send + Sync + 'static {
    /// Stores `session` unless its token is already taken.
    ///
    /// Returns `false` (and stores nothing) on a token collision.
    fn insert(&self, session: Session) -> bool;

    /// A copy of the session for `token`, expired or not.
    fn get(&self, token: &str) -> Option<Session>;

    /// Removes and returns the session for `token`, if any.
    fn remove(&self, token: &str) -> Option<Session>;

    /// Removes every session that is expired at `now`. Returns how many
    /// were removed.
    fn purge_expired(&self, now: Instant) -> usize;

    /// Number of stored sessions, expired ones included.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A process-local [`SessionRegistry`] behind a single mutex.
///
/// Every operation is one short critical section with no I/O inside, so
/// contention stays low even with many connections.
#[derive(Debug, Default)]
pub struct MemorySessionRegistry {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionRegistry for MemorySessionRegistry {
    fn insert(&self, session: Session) -> bool {
        let mut sessions = self.sessions.lock();
        if sessions.contains_key(&session.token) {
            return false;
        }
        sessions.insert(session.token.clone(), session);
        true
    }

    fn get(&self, token: &str) -> Option<Session> {
        self.sessions.lock().get(token).cloned()
    }

    fn remove(&self, token: &str) -> Option<Session> {
        self.sessions.lock().remove(token)
    }

    fn purge_expired(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, session| session.is_active_at(now));
        before - sessions.len()
    }

    fn len(&self) -> usize {
        self.sessions.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use stockroom_protocol::UserId;

    use super::*;

    fn session(token: &str, ttl: Duration) -> Session {
        Session::new(token.to_string(), UserId(1), ttl)
    }

    #[test]
    fn test_insert_then_get_returns_copy() {
        let reg = MemorySessionRegistry::new();
        assert!(reg.insert(session("a", Duration::from_secs(60))));

        let got = reg.get("a").expect("stored");
        assert_eq!(got.user_id, UserId(1));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_insert_duplicate_token_is_refused() {
        let reg = MemorySessionRegistry::new();
        let first = session("a", Duration::from_secs(60));
        reg.insert(first.clone());

        let mut second = session("a", Duration::from_secs(60));
        second.user_id = UserId(2);

        assert!(!reg.insert(second));
        assert_eq!(reg.get("a"), Some(first), "original must survive");
    }

    #[test]
    fn test_remove_is_idempotent() {
        let reg = MemorySessionRegistry::new();
        reg.insert(session("a", Duration::from_secs(60)));

        assert!(reg.remove("a").is_some());
        assert!(reg.remove("a").is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_purge_expired_keeps_active_sessions() {
        let reg = MemorySessionRegistry::new();
        reg.insert(session("dead", Duration::ZERO));
        reg.insert(session("live", Duration::from_secs(3600)));

        let purged = reg.purge_expired(Instant::now());

        assert_eq!(purged, 1);
        assert!(reg.get("dead").is_none());
        assert!(reg.get("live").is_some());
    }
}
