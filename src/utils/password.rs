// src/utils/password.rs
//! Password hashing utilities.
//!
//! Uses Argon2id with a fresh random salt per hash. The output is a
//! self-describing PHC string (algorithm, version, cost parameters and
//! salt all embedded), so verification needs no side channel and cost
//! parameters can be raised without invalidating stored hashes.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use log::debug;
use rand::rngs::OsRng;

/// Hashes a plaintext password into a PHC string.
///
/// A fresh random salt is drawn for every call, so hashing the same
/// plaintext twice yields two different strings.
///
/// # Errors
/// Returns `Err` only if the hasher itself fails (invalid parameters);
/// never for any property of the plaintext.
pub fn hash_password(plaintext: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(plaintext.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verifies a plaintext password against a stored PHC string.
///
/// # Returns
/// `true` only when the stored string parses and the password matches.
/// A malformed or foreign hash string is a verification failure, not a
/// fault: the decode step is explicit and its error branch returns
/// `false`. This function never panics and never raises.
pub fn verify_password(plaintext: &str, stored: &str) -> bool {
    let parsed = match PasswordHash::new(stored) {
        Ok(hash) => hash,
        Err(e) => {
            // Records with unparseable hashes simply never authenticate.
            debug!("stored password hash failed to parse: {e}");
            return false;
        }
    };

    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verify_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn test_same_plaintext_hashes_differently() {
        let first = hash_password("hunter2").unwrap();
        let second = hash_password("hunter2").unwrap();

        // Fresh salt per call
        assert_ne!(first, second);
        assert!(verify_password("hunter2", &first));
        assert!(verify_password("hunter2", &second));
    }

    #[test]
    fn test_malformed_hash_verifies_false() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "not-a-phc-string"));
        // Truncated/foreign scheme strings must not panic either
        assert!(!verify_password("anything", "$2b$10$abcdefghijklmnop"));
        assert!(!verify_password("anything", "$argon2id$v=19$garbage"));
    }
}
