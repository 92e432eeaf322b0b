//! Password hashing.

use crate::{AuthError, AuthResult};

/// Lowest bcrypt cost accepted by the `bcrypt` crate.
pub const MIN_BCRYPT_COST: u32 = 4;

/// Highest bcrypt cost accepted by the `bcrypt` crate.
pub const MAX_BCRYPT_COST: u32 = 31;

pub use bcrypt::DEFAULT_COST as DEFAULT_BCRYPT_COST;

/// Hashes a plaintext password with bcrypt.
///
/// `cost` is clamped to the range bcrypt accepts.
pub fn hash_password(password: &str, cost: u32) -> AuthResult<String> {
    let cost = cost.clamp(MIN_BCRYPT_COST, MAX_BCRYPT_COST);
    bcrypt::hash(password, cost).map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Checks a plaintext password against a stored bcrypt hash.
///
/// A malformed hash never verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Stored password hash could not be verified: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("password123", MIN_BCRYPT_COST).unwrap();

        assert_ne!(hash, "password123");
        assert!(hash.starts_with("$2"));
        assert!(verify_password("password123", &hash));
        assert!(!verify_password("password124", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same", MIN_BCRYPT_COST).unwrap();
        let second = hash_password("same", MIN_BCRYPT_COST).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_cost_is_clamped() {
        let hash = hash_password("password123", 1).unwrap();
        assert!(hash.contains("$04$"));
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        assert!(!verify_password("password123", "not-a-bcrypt-hash"));
        assert!(!verify_password("password123", ""));
    }
}
