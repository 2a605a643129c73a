//! # Credential Vault
//!
//! Seals the unlock code a customer hands over with their device (PIN,
//! pattern or password) so it is never stored in the clear.
//!
//! ## Sealing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "1234"                                                                 │
//! │     │                                                                   │
//! │     ▼   fresh 16-byte IV from the OS RNG (one per seal, never reused)   │
//! │  AES-256-CTR(key, iv)                                                   │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  SealedSecret { cipher_hex: "9f0c1a2b", iv_hex: "3e4f...(32 chars)" }   │
//! │                                                                         │
//! │  Stored as one column pair on the order: pin_* / pattern_* / password_* │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Unsealing Fails Closed
//! A record written under an old key, a truncated IV or a hand-edited
//! column never reaches the caller as garbage and never panics: the vault
//! logs a warning and returns an empty string. [`Vault::try_unseal`] keeps
//! the reason for callers that want it.

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use ts_rs::TS;

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// Key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// IV length in bytes (one AES block).
pub const IV_LEN: usize = 16;

// =============================================================================
// Errors
// =============================================================================

/// Vault failures.
///
/// Only key construction and [`Vault::try_unseal`] return these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    #[error("encryption key must be exactly {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("{field} is not valid hex")]
    BadHex { field: &'static str },

    #[error("iv must be 16 bytes, got {0}")]
    BadIvLength(usize),

    #[error("unsealed bytes are not UTF-8")]
    NotUtf8,
}

// =============================================================================
// Sealed Secret
// =============================================================================

/// Hex ciphertext and its IV, exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SealedSecret {
    pub cipher_hex: String,
    pub iv_hex: String,
}

// =============================================================================
// Vault
// =============================================================================

/// Process-wide sealing key.
#[derive(Clone)]
pub struct Vault {
    key: [u8; KEY_LEN],
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault").field("key", &"[REDACTED]").finish()
    }
}

impl Vault {
    /// Creates a vault from raw key bytes.
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Vault { key }
    }

    /// Creates a vault from a 32-character secret, used byte for byte.
    ///
    /// ## Example
    /// ```rust
    /// use fixit_core::vault::Vault;
    ///
    /// assert!(Vault::from_secret("0123456789abcdef0123456789abcdef").is_ok());
    /// assert!(Vault::from_secret("too short").is_err());
    /// ```
    pub fn from_secret(secret: &str) -> Result<Self, VaultError> {
        let key: [u8; KEY_LEN] =
            secret
                .as_bytes()
                .try_into()
                .map_err(|_| VaultError::InvalidKeyLength {
                    expected: KEY_LEN,
                    actual: secret.len(),
                })?;
        Ok(Vault::new(key))
    }

    /// Creates a vault from 64 hex characters (the key-file format).
    pub fn from_hex(encoded: &str) -> Result<Self, VaultError> {
        let bytes = hex::decode(encoded.trim()).map_err(|_| VaultError::BadHex { field: "key" })?;
        let actual = bytes.len();
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|_| VaultError::InvalidKeyLength {
            expected: KEY_LEN,
            actual,
        })?;
        Ok(Vault::new(key))
    }

    /// Draws a new random key.
    pub fn generate_key() -> [u8; KEY_LEN] {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Seals a plaintext secret.
    ///
    /// Returns `None` for blank input: an absent credential is stored as
    /// absent columns, never as an encrypted empty string.
    pub fn seal(&self, plaintext: &str) -> Option<SealedSecret> {
        if plaintext.trim().is_empty() {
            return None;
        }

        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let mut buf = plaintext.as_bytes().to_vec();
        let mut cipher = Aes256Ctr::new(&self.key.into(), &iv.into());
        cipher.apply_keystream(&mut buf);

        Some(SealedSecret {
            cipher_hex: hex::encode(buf),
            iv_hex: hex::encode(iv),
        })
    }

    /// Unseals, reporting why it could not.
    pub fn try_unseal(&self, sealed: &SealedSecret) -> Result<String, VaultError> {
        let mut buf =
            hex::decode(&sealed.cipher_hex).map_err(|_| VaultError::BadHex { field: "cipher" })?;
        let iv_bytes = hex::decode(&sealed.iv_hex).map_err(|_| VaultError::BadHex { field: "iv" })?;
        let iv: [u8; IV_LEN] = iv_bytes
            .as_slice()
            .try_into()
            .map_err(|_| VaultError::BadIvLength(iv_bytes.len()))?;

        let mut cipher = Aes256Ctr::new(&self.key.into(), &iv.into());
        cipher.apply_keystream(&mut buf);

        String::from_utf8(buf).map_err(|_| VaultError::NotUtf8)
    }

    /// Unseals, degrading to an empty string on any failure.
    pub fn unseal(&self, sealed: &SealedSecret) -> String {
        match self.try_unseal(sealed) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                warn!(error = %e, "Credential could not be unsealed; returning empty value");
                String::new()
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> Vault {
        Vault::from_secret("k3y-for-tests-only-32-bytes-long").unwrap()
    }

    #[test]
    fn test_seal_then_unseal_returns_plaintext() {
        let v = vault();
        for secret in ["1234", "0-1-2-5-8", "correct horse battery", "पासवर्ड"] {
            let sealed = v.seal(secret).unwrap();
            assert_eq!(v.unseal(&sealed), secret);
        }
    }

    #[test]
    fn test_each_seal_uses_a_fresh_iv() {
        let v = vault();
        let a = v.seal("4321").unwrap();
        let b = v.seal("4321").unwrap();

        assert_ne!(a.iv_hex, b.iv_hex);
        assert_ne!(a.cipher_hex, b.cipher_hex);
        assert_eq!(v.unseal(&a), "4321");
        assert_eq!(v.unseal(&b), "4321");
    }

    #[test]
    fn test_blank_input_is_not_sealed() {
        assert!(vault().seal("").is_none());
        assert!(vault().seal("   ").is_none());
    }

    #[test]
    fn test_stored_shape() {
        let sealed = vault().seal("1234").unwrap();
        assert_eq!(sealed.iv_hex.len(), IV_LEN * 2);
        // CTR keeps the plaintext length
        assert_eq!(sealed.cipher_hex.len(), 8);
    }

    #[test]
    fn test_bad_iv_degrades_to_empty() {
        let v = vault();
        let mut sealed = v.seal("1234").unwrap();
        sealed.iv_hex.truncate(10);

        assert_eq!(v.try_unseal(&sealed), Err(VaultError::BadIvLength(5)));
        assert_eq!(v.unseal(&sealed), "");
    }

    #[test]
    fn test_non_hex_degrades_to_empty() {
        let sealed = SealedSecret {
            cipher_hex: "not hex at all".to_string(),
            iv_hex: "00".repeat(IV_LEN),
        };
        assert_eq!(
            vault().try_unseal(&sealed),
            Err(VaultError::BadHex { field: "cipher" })
        );
        assert_eq!(vault().unseal(&sealed), "");
    }

    #[test]
    fn test_wrong_key_never_panics() {
        let sealed = vault().seal("a long password with many bytes").unwrap();
        let other = Vault::new(Vault::generate_key());
        // Either garbage that happens to be UTF-8 or an empty string, but no panic
        let out = other.unseal(&sealed);
        assert_ne!(out, "a long password with many bytes");
    }

    #[test]
    fn test_key_constructors() {
        assert_eq!(
            Vault::from_secret("short").unwrap_err(),
            VaultError::InvalidKeyLength { expected: 32, actual: 5 }
        );
        assert!(Vault::from_hex(&"ab".repeat(32)).is_ok());
        assert!(Vault::from_hex("zz").is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let printed = format!("{:?}", vault());
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains("k3y"));
    }
}
