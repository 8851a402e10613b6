//! Encryption of payment-gateway credentials at rest

use crate::AppError;
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose, Engine as _};

const NONCE_LEN: usize = 12;

/// AES-256-GCM encryption for gateway secrets. Ciphertext is stored as
/// base64(nonce || ciphertext).
#[derive(Clone)]
pub struct EncryptionService {
    cipher: Aes256Gcm,
}

impl EncryptionService {
    /// Create from a raw 32-byte key.
    pub fn from_key_bytes(key_bytes: &[u8]) -> Result<Self, AppError> {
        if key_bytes.len() != 32 {
            return Err(AppError::Internal(
                "Encryption key must be 32 bytes (256 bits)".to_string(),
            ));
        }
        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Create from the base64-encoded `ENCRYPTION_KEY` setting.
    pub fn from_base64_key(key_str: &str) -> Result<Self, AppError> {
        let key_bytes = general_purpose::STANDARD
            .decode(key_str.trim())
            .map_err(|e| AppError::Internal(format!("Failed to decode encryption key: {}", e)))?;

        Self::from_key_bytes(&key_bytes)
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, AppError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| AppError::Internal(format!("Encryption failed: {}", e)))?;

        let mut combined = nonce.to_vec();
        combined.extend_from_slice(&ciphertext);
        Ok(general_purpose::STANDARD.encode(&combined))
    }

    pub fn decrypt(&self, encrypted: &str) -> Result<String, AppError> {
        let combined = general_purpose::STANDARD
            .decode(encrypted)
            .map_err(|e| AppError::Internal(format!("Failed to decode encrypted data: {}", e)))?;

        if combined.len() < NONCE_LEN {
            return Err(AppError::Internal("Encrypted data too short".to_string()));
        }

        let nonce = Nonce::from_slice(&combined[..NONCE_LEN]);
        let plaintext = self
            .cipher
            .decrypt(nonce, &combined[NONCE_LEN..])
            .map_err(|e| AppError::Internal(format!("Decryption failed: {}", e)))?;

        String::from_utf8(plaintext)
            .map_err(|e| AppError::Internal(format!("Invalid UTF-8 in decrypted data: {}", e)))
    }
}

/// Show only the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> EncryptionService {
        EncryptionService::from_key_bytes(b"01234567890123456789012345678901").unwrap()
    }

    #[test]
    fn test_encryption_decryption() {
        let service = test_service();
        let plaintext = "rzp_secret_12345";

        let encrypted = service.encrypt(plaintext).unwrap();
        assert_ne!(encrypted, plaintext);
        assert_eq!(service.decrypt(&encrypted).unwrap(), plaintext);
    }

    #[test]
    fn test_nonce_makes_ciphertext_unique() {
        let service = test_service();
        let a = service.encrypt("same").unwrap();
        let b = service.encrypt("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_base64_key() {
        let key = general_purpose::STANDARD.encode(b"01234567890123456789012345678901");
        assert!(EncryptionService::from_base64_key(&key).is_ok());
        assert!(EncryptionService::from_base64_key("c2hvcnQ=").is_err());
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let service = test_service();
        assert!(service.decrypt("AAAA").is_err());
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("sk_live_abcdef"), "**********cdef");
        assert_eq!(mask_secret("abc"), "***");
    }
}
