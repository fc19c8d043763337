//! Cryptographic operations for webhook secrets and payload signing.
//!
//! - HMAC-SHA256 computation over the exact request body for receiver-side
//!   verification
//! - AES-256-GCM encryption/decryption for subscription secrets at rest
//! - Signing-secret generation at registration time

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{
    engine::general_purpose::{STANDARD as BASE64, URL_SAFE_NO_PAD as BASE64_URL},
    Engine,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::WebhookError;

/// Nonce size for AES-GCM (96 bits / 12 bytes).
const NONCE_SIZE: usize = 12;

/// Length of a generated signing secret before encoding.
const SECRET_BYTES: usize = 32;

type HmacSha256 = Hmac<Sha256>;

// ---------------------------------------------------------------------------
// HMAC-SHA256 payload signing
// ---------------------------------------------------------------------------

/// Compute the HMAC-SHA256 signature for a webhook payload.
///
/// The signature covers exactly the serialized body bytes, so receivers can
/// verify with `hex(hmac_sha256(secret, body))` over the raw request body.
/// Returns the hex-encoded signature with no prefix.
pub fn compute_signature(secret: &str, payload: &[u8]) -> String {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a hex-encoded HMAC-SHA256 signature in constant time.
///
/// Malformed hex input verifies false rather than erroring.
#[must_use]
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    let expected = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac = match <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

// ---------------------------------------------------------------------------
// Signing-secret generation
// ---------------------------------------------------------------------------

/// Generate a fresh signing secret for a new subscription.
///
/// 32 bytes from the operating system CSPRNG, URL-safe base64 encoded with a
/// `whsec_` prefix. The plaintext is returned to the registrant exactly once.
#[must_use]
pub fn generate_secret() -> String {
    use rand::rngs::OsRng;
    use rand::RngCore;

    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    format!("whsec_{}", BASE64_URL.encode(bytes))
}

// ---------------------------------------------------------------------------
// AES-256-GCM encryption/decryption (for secrets at rest)
// ---------------------------------------------------------------------------

/// Encrypt a plaintext secret to a base64-encoded string for DB storage.
///
/// Format: base64(nonce || ciphertext || auth_tag)
pub fn encrypt_secret(plaintext: &str, key: &[u8]) -> Result<String, WebhookError> {
    if key.len() != 32 {
        return Err(WebhookError::EncryptionFailed(format!(
            "Invalid key length: expected 32 bytes, got {}",
            key.len()
        )));
    }

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| WebhookError::EncryptionFailed(e.to_string()))?;

    use rand::rngs::OsRng;
    use rand::RngCore;
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| WebhookError::EncryptionFailed(e.to_string()))?;

    let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);

    Ok(BASE64.encode(&result))
}

/// Decrypt a base64-encoded secret from DB storage back to plaintext.
pub fn decrypt_secret(encoded: &str, key: &[u8]) -> Result<String, WebhookError> {
    if key.len() != 32 {
        return Err(WebhookError::EncryptionFailed(format!(
            "Invalid key length: expected 32 bytes, got {}",
            key.len()
        )));
    }

    let encrypted = BASE64
        .decode(encoded)
        .map_err(|e| WebhookError::EncryptionFailed(format!("Base64 decode failed: {e}")))?;

    if encrypted.len() < NONCE_SIZE + 1 {
        return Err(WebhookError::EncryptionFailed(
            "Invalid encrypted data format".to_string(),
        ));
    }

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| WebhookError::EncryptionFailed(e.to_string()))?;

    let nonce = Nonce::from_slice(&encrypted[..NONCE_SIZE]);
    let ciphertext = &encrypted[NONCE_SIZE..];

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| WebhookError::EncryptionFailed(e.to_string()))?;

    String::from_utf8(plaintext).map_err(|e| WebhookError::EncryptionFailed(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: [u8; 32] = [7u8; 32];

    #[test]
    fn test_signature_round_trip() {
        let secret = "whsec_test_secret";
        let payload = br#"{"event":"shipment.status_changed"}"#;
        let sig = compute_signature(secret, payload);
        assert!(verify_signature(secret, payload, &sig));
    }

    #[test]
    fn test_signature_is_64_hex_chars() {
        let sig = compute_signature("abc", b"payload");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tampered_payload_fails_verification() {
        let secret = "abc";
        let sig = compute_signature(secret, b"original payload");
        assert!(!verify_signature(secret, b"originaX payload", &sig));
    }

    #[test]
    fn test_wrong_secret_fails_verification() {
        let sig = compute_signature("abc", b"payload");
        assert!(!verify_signature("abd", b"payload", &sig));
    }

    #[test]
    fn test_malformed_hex_fails_verification() {
        assert!(!verify_signature("abc", b"payload", "not-hex-at-all"));
        assert!(!verify_signature("abc", b"payload", ""));
    }

    #[test]
    fn test_generate_secret_format() {
        let secret = generate_secret();
        assert!(secret.starts_with("whsec_"));
        // 32 bytes of entropy, URL-safe base64 without padding.
        assert_eq!(secret.len(), "whsec_".len() + 43);
    }

    #[test]
    fn test_generated_secrets_are_unique() {
        assert_ne!(generate_secret(), generate_secret());
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let plaintext = "whsec_super_secret_value";
        let encrypted = encrypt_secret(plaintext, &TEST_KEY).unwrap();
        assert_ne!(encrypted, plaintext);
        let decrypted = decrypt_secret(&encrypted, &TEST_KEY).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_encrypt_is_nondeterministic() {
        // Fresh nonce every call.
        let a = encrypt_secret("secret", &TEST_KEY).unwrap();
        let b = encrypt_secret("secret", &TEST_KEY).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let encrypted = encrypt_secret("secret", &TEST_KEY).unwrap();
        let wrong_key = [8u8; 32];
        assert!(decrypt_secret(&encrypted, &wrong_key).is_err());
    }

    #[test]
    fn test_encrypt_rejects_short_key() {
        let err = encrypt_secret("secret", &[1u8; 16]).unwrap_err();
        assert!(matches!(err, WebhookError::EncryptionFailed(_)));
    }

    #[test]
    fn test_decrypt_rejects_garbage() {
        assert!(decrypt_secret("not base64!!!", &TEST_KEY).is_err());
        assert!(decrypt_secret("AAAA", &TEST_KEY).is_err());
    }
}
