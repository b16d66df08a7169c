//! Salted, memory-hard password hashing.
//!
//! A stored secret is two hex strings joined by a dot:
//!
//! ```text
//! <hex(derived key, 64 bytes)>.<hex(salt, 16 bytes)>
//! ```
//!
//! The key is derived with Argon2id. Verification re-derives with the
//! stored salt and compares in constant time, so how long a failed check
//! takes says nothing about how many bytes matched.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Length of the derived key in bytes.
const KEY_LEN: usize = 64;

/// Length of a freshly generated salt in bytes.
const SALT_LEN: usize = 16;

const SEPARATOR: char = '.';

/// Argon2id cost parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes over memory.
    pub iterations: u32,
    /// Degree of parallelism (lanes).
    pub parallelism: u32,
}

impl Default for HasherConfig {
    /// The argon2 crate's recommended costs (19 MiB, 2 passes, 1 lane).
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HasherConfig {
    /// The cheapest costs Argon2 accepts. For tests and local demos only.
    pub fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST.max(8),
            iterations: Params::MIN_T_COST,
            parallelism: 1,
        }
    }
}

/// Hashes and verifies passwords. Cheap to clone.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// # Errors
    /// [`AuthError::Hashing`] if Argon2 rejects the cost parameters.
    pub fn new(config: &HasherConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|_| AuthError::Hashing)?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hashes `plaintext` under a fresh random salt.
    ///
    /// # Errors
    /// [`AuthError::Hashing`] if key derivation fails.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        let salt: [u8; SALT_LEN] = rand::rng().random();
        let key = self.derive(plaintext, &salt)?;
        Ok(format!(
            "{}{SEPARATOR}{}",
            hex::encode(key),
            hex::encode(salt)
        ))
    }

    /// Returns `true` only if `plaintext` derives the key stored in
    /// `secret`. A malformed secret simply does not verify.
    pub fn verify(&self, plaintext: &str, secret: &str) -> bool {
        let Some((key_hex, salt_hex)) = secret.split_once(SEPARATOR) else {
            return false;
        };
        let (Ok(expected), Ok(salt)) =
            (hex::decode(key_hex), hex::decode(salt_hex))
        else {
            return false;
        };
        if expected.len() != KEY_LEN {
            return false;
        }

        match self.derive(plaintext, &salt) {
            Ok(key) => constant_time_eq(&key, &expected),
            Err(_) => false,
        }
    }

    /// A well-formed secret that no password verifies against.
    ///
    /// Checking a password against it costs exactly as much as checking a
    /// real one, which is what keeps unknown usernames from answering
    /// faster than wrong passwords.
    pub fn decoy_secret() -> String {
        let salt: [u8; SALT_LEN] = rand::rng().random();
        format!(
            "{}{SEPARATOR}{}",
            hex::encode([0u8; KEY_LEN]),
            hex::encode(salt)
        )
    }

    fn derive(
        &self,
        plaintext: &str,
        salt: &[u8],
    ) -> Result<[u8; KEY_LEN], AuthError> {
        let mut key = [0u8; KEY_LEN];
        self.argon2
            .hash_password_into(plaintext.as_bytes(), salt, &mut key)
            .map_err(|_| AuthError::Hashing)?;
        Ok(key)
    }
}

/// Compares every byte regardless of where the first difference is.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> CredentialHasher {
        CredentialHasher::new(&HasherConfig::minimal()).expect("valid params")
    }

    #[test]
    fn test_hash_then_verify_correct_password_succeeds() {
        let h = hasher();
        let secret = h.hash("pw1").unwrap();

        assert!(h.verify("pw1", &secret));
    }

    #[test]
    fn test_verify_wrong_password_fails() {
        let h = hasher();
        let secret = h.hash("pw1").unwrap();

        assert!(!h.verify("pw2", &secret));
        assert!(!h.verify("", &secret));
        assert!(!h.verify("pw1 ", &secret));
    }

    #[test]
    fn test_hash_same_password_twice_uses_fresh_salt() {
        let h = hasher();
        let a = h.hash("pw1").unwrap();
        let b = h.hash("pw1").unwrap();

        assert_ne!(a, b, "salts must differ per call");
        assert!(h.verify("pw1", &a));
        assert!(h.verify("pw1", &b));
    }

    #[test]
    fn test_hash_secret_format_is_key_dot_salt() {
        let secret = hasher().hash("pw1").unwrap();
        let (key, salt) = secret.split_once('.').expect("separator");

        assert_eq!(key.len(), KEY_LEN * 2);
        assert_eq!(salt.len(), SALT_LEN * 2);
        assert!(!secret.contains("pw1"));
    }

    #[test]
    fn test_verify_malformed_secret_returns_false() {
        let h = hasher();

        assert!(!h.verify("pw1", ""));
        assert!(!h.verify("pw1", "no-separator"));
        assert!(!h.verify("pw1", "zz.zz"));
        assert!(!h.verify("pw1", "abcd.0011223344556677"));
    }

    #[test]
    fn test_verify_truncated_salt_returns_false() {
        let h = hasher();
        let secret = h.hash("pw1").unwrap();
        let (key, _) = secret.split_once('.').unwrap();

        // Argon2 refuses salts shorter than 8 bytes.
        assert!(!h.verify("pw1", &format!("{key}.0011")));
    }

    #[test]
    fn test_verify_against_other_hasher_params_fails() {
        let cheap = hasher();
        let costlier = CredentialHasher::new(&HasherConfig {
            iterations: 2,
            ..HasherConfig::minimal()
        })
        .unwrap();
        let secret = cheap.hash("pw1").unwrap();

        assert!(!costlier.verify("pw1", &secret));
    }

    #[test]
    fn test_decoy_secret_never_verifies() {
        let h = hasher();
        let decoy = CredentialHasher::decoy_secret();

        assert!(!h.verify("", &decoy));
        assert!(!h.verify("pw1", &decoy));
    }

    #[test]
    fn test_new_rejects_impossible_params() {
        let result = CredentialHasher::new(&HasherConfig {
            memory_kib: 0,
            iterations: 0,
            parallelism: 0,
        });
        assert!(matches!(result, Err(AuthError::Hashing)));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"hellp"));
        assert!(!constant_time_eq(b"short", b"longer"));
    }
}
