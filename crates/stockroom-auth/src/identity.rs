//! The identity store: registered users and their password secrets.

use std::collections::HashMap;

use parking_lot::Mutex;
use stockroom_protocol::{IdAllocator, User, UserId, ValidationError};

use crate::{AuthError, CredentialHasher};

/// A user plus the secret that proves who they are. Never leaves this
/// module.
struct Credential {
    user: User,
    secret: String,
}

#[derive(Default)]
struct Users {
    by_id: HashMap<UserId, Credential>,
    /// Exact, case-sensitive username → id.
    by_name: HashMap<String, UserId>,
}

/// Owns every registered [`User`].
///
/// Users are created once and never changed or removed. Hashing happens
/// outside the lock; only the uniqueness check and the insert run inside
/// it, as one critical section.
pub struct IdentityStore {
    users: Mutex<Users>,
    ids: IdAllocator,
    hasher: CredentialHasher,
    /// Checked against when a username is unknown, so a miss costs as
    /// much as a wrong password.
    decoy_secret: String,
}

impl IdentityStore {
    pub fn new(hasher: CredentialHasher) -> Self {
        Self {
            users: Mutex::new(Users::default()),
            ids: IdAllocator::new(),
            hasher,
            decoy_secret: CredentialHasher::decoy_secret(),
        }
    }

    /// Registers a new user.
    ///
    /// CPU-heavy (one key derivation); async callers should run it on a
    /// blocking thread.
    ///
    /// # Errors
    /// - [`AuthError::Validation`] — empty username or password
    /// - [`AuthError::DuplicateIdentity`] — username already registered
    /// - [`AuthError::Hashing`] — the hasher is misconfigured
    pub fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        if username.trim().is_empty() {
            return Err(ValidationError::Empty("username").into());
        }
        if password.is_empty() {
            return Err(ValidationError::Empty("password").into());
        }
        // Skip the expensive hash for names that are obviously taken.
        if self.users.lock().by_name.contains_key(username) {
            return Err(AuthError::DuplicateIdentity(username.to_string()));
        }

        let secret = self.hasher.hash(password)?;

        let mut users = self.users.lock();
        // Someone may have claimed the name while we were hashing.
        if users.by_name.contains_key(username) {
            return Err(AuthError::DuplicateIdentity(username.to_string()));
        }
        let user = User {
            id: UserId(self.ids.allocate()),
            username: username.to_string(),
        };
        users.by_name.insert(user.username.clone(), user.id);
        users.by_id.insert(
            user.id,
            Credential {
                user: user.clone(),
                secret,
            },
        );
        drop(users);

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub fn find(&self, id: UserId) -> Option<User> {
        self.users.lock().by_id.get(&id).map(|c| c.user.clone())
    }

    pub fn find_by_username(&self, username: &str) -> Option<User> {
        let users = self.users.lock();
        let id = users.by_name.get(username)?;
        users.by_id.get(id).map(|c| c.user.clone())
    }

    /// Returns the user only if `username` exists AND `password` verifies.
    ///
    /// Both failure causes return `None` and cost one full key
    /// derivation, so neither the result nor its timing says which one
    /// happened.
    pub fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Option<User> {
        let candidate = {
            let users = self.users.lock();
            users
                .by_name
                .get(username)
                .and_then(|id| users.by_id.get(id))
                .map(|c| (c.user.clone(), c.secret.clone()))
        };

        match candidate {
            Some((user, secret)) => {
                self.hasher.verify(password, &secret).then_some(user)
            }
            None => {
                self.hasher.verify(password, &self.decoy_secret);
                None
            }
        }
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.users.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::HasherConfig;

    fn store() -> IdentityStore {
        IdentityStore::new(
            CredentialHasher::new(&HasherConfig::minimal()).unwrap(),
        )
    }

    // =====================================================================
    // register()
    // =====================================================================

    #[test]
    fn test_register_assigns_increasing_ids() {
        let store = store();

        let a = store.register("a@x.com", "pw1").unwrap();
        let b = store.register("b@x.com", "pw2").unwrap();

        assert_eq!(a.id, UserId(1));
        assert_eq!(b.id, UserId(2));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_register_duplicate_username_rejected() {
        let store = store();
        store.register("a@x.com", "pw1").unwrap();

        let result = store.register("a@x.com", "other");

        assert!(matches!(
            result,
            Err(AuthError::DuplicateIdentity(name)) if name == "a@x.com"
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_register_usernames_are_case_sensitive() {
        let store = store();
        store.register("a@x.com", "pw1").unwrap();

        assert!(store.register("A@x.com", "pw1").is_ok());
    }

    #[test]
    fn test_register_empty_fields_rejected() {
        let store = store();

        assert!(matches!(
            store.register("  ", "pw1"),
            Err(AuthError::Validation(ValidationError::Empty("username")))
        ));
        assert!(matches!(
            store.register("a@x.com", ""),
            Err(AuthError::Validation(ValidationError::Empty("password")))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_register_concurrent_same_username_succeeds_once() {
        let store = Arc::new(store());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.register("race@x.com", "pw"))
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().expect("worker panicked"))
            .filter(Result::is_ok)
            .count();

        assert_eq!(wins, 1);
        assert_eq!(store.len(), 1);
    }

    // =====================================================================
    // find() / find_by_username()
    // =====================================================================

    #[test]
    fn test_find_by_username_hit_and_miss() {
        let store = store();
        let user = store.register("a@x.com", "pw1").unwrap();

        assert_eq!(store.find_by_username("a@x.com"), Some(user.clone()));
        assert_eq!(store.find(user.id), Some(user));
        assert_eq!(store.find_by_username("nobody"), None);
        assert_eq!(store.find(UserId(99)), None);
    }

    // =====================================================================
    // verify_credentials()
    // =====================================================================

    #[test]
    fn test_verify_credentials_correct_password_returns_user() {
        let store = store();
        let user = store.register("a@x.com", "pw1").unwrap();

        assert_eq!(store.verify_credentials("a@x.com", "pw1"), Some(user));
    }

    #[test]
    fn test_verify_credentials_wrong_password_returns_none() {
        let store = store();
        store.register("a@x.com", "pw1").unwrap();

        assert_eq!(store.verify_credentials("a@x.com", "pw2"), None);
    }

    #[test]
    fn test_verify_credentials_unknown_user_returns_none() {
        let store = store();
        store.register("a@x.com", "pw1").unwrap();

        assert_eq!(store.verify_credentials("b@x.com", "pw1"), None);
    }

    #[test]
    fn test_verify_credentials_other_users_password_returns_none() {
        let store = store();
        store.register("a@x.com", "pw1").unwrap();
        store.register("b@x.com", "pw2").unwrap();

        assert_eq!(store.verify_credentials("a@x.com", "pw2"), None);
    }
}
