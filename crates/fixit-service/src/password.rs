//! Staff password hashing (Argon2id, PHC strings).

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};

use crate::error::{ServiceError, ServiceResult};

/// Hash a password for storage.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            ServiceError::internal("Failed to hash password")
        })?;

    Ok(hash.to_string())
}

/// Verify a password against its stored hash. A malformed hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("counter-42").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("counter-42", &hash));
        assert!(!verify_password("counter-43", &hash));
    }

    #[test]
    fn test_same_password_different_salt() {
        let a = hash_password("same-secret").unwrap();
        let b = hash_password("same-secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_never_matches() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
