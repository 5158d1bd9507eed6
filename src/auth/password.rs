//! Password hashing for stored credentials.
//!
//! Passwords are stored as Argon2id PHC strings with a random per-password
//! salt, so two accounts with the same password never share a digest.

use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use tracing::warn;

use super::AuthError;

/// Hash a plaintext password for storage.
///
/// # Errors
///
/// Returns [`AuthError::Internal`] if Argon2 rejects the input.
pub fn hash_password(plaintext: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::Internal("failed to hash password".to_string()))
}

/// Check a plaintext password against a stored hash.
///
/// A stored value that is not a valid PHC string never matches.
#[must_use]
pub fn verify_password(plaintext: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        warn!("stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{hash_password, verify_password};

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("secret").unwrap();
        assert!(verify_password("secret", &hash));
        assert!(!verify_password("Secret", &hash));
    }

    #[test]
    fn hash_never_equals_plaintext_and_is_salted() {
        let first = hash_password("secret").unwrap();
        let second = hash_password("secret").unwrap();
        assert_ne!(first, "secret");
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
    }

    #[test]
    fn garbage_stored_hash_never_matches() {
        assert!(!verify_password("secret", "5ebe2294ecd0e0f08eab7690d2a6ee69"));
        assert!(!verify_password("secret", ""));
    }
}
