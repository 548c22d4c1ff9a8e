//! At-rest protection for the stored router password
//!
//! The password is the only secret in the persisted record. It is sealed with
//! AES-256-GCM under a key generated once per installation; the 12-byte nonce
//! is prefixed to the ciphertext and the whole token is base64-encoded so it
//! fits a plain-text config file. The key lives in the same record as the
//! token — a compatibility constraint inherited from the on-disk format, not
//! a recommendation.

use aes_gcm::aead::{Aead, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, KeyInit, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;

/// Length of the AES-GCM nonce prefixed to every stored token
const NONCE_LEN: usize = 12;

/// Failure to recover a stored credential
///
/// Any of these means the persisted record is unusable: the caller must treat
/// it as a fatal configuration error rather than fall back to an empty
/// password.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential token is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("credential token is too short to contain a nonce")]
    Truncated,

    #[error("vault key has the wrong length")]
    BadKey,

    #[error("credential token was rejected (wrong key or tampered data)")]
    Rejected,

    #[error("decrypted credential is not valid UTF-8")]
    NotText,
}

/// Generates a fresh 256-bit vault key for a new installation.
pub fn generate_key() -> [u8; 32] {
    Aes256Gcm::generate_key(&mut OsRng).into()
}

/// Encrypts a plaintext password into a base64 token of nonce + ciphertext.
pub fn encrypt(plaintext: &str, key: &[u8]) -> Result<String, CredentialError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CredentialError::BadKey)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let sealed = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|_| CredentialError::Rejected)?;

    let mut token = Vec::with_capacity(NONCE_LEN + sealed.len());
    token.extend_from_slice(&nonce);
    token.extend_from_slice(&sealed);
    Ok(BASE64.encode(token))
}

/// Decrypts a stored base64 token back into the plaintext password.
pub fn decrypt(token: &str, key: &[u8]) -> Result<String, CredentialError> {
    let raw = BASE64.decode(token.trim())?;
    if raw.len() < NONCE_LEN {
        return Err(CredentialError::Truncated);
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CredentialError::BadKey)?;
    let nonce = Nonce::from_slice(&raw[..NONCE_LEN]);
    let plain = cipher
        .decrypt(nonce, &raw[NONCE_LEN..])
        .map_err(|_| CredentialError::Rejected)?;

    String::from_utf8(plain).map_err(|_| CredentialError::NotText)
}

/// Encodes a vault key for storage in the text record.
pub fn encode_key(key: &[u8]) -> String {
    BASE64.encode(key)
}

/// Decodes a stored vault key.
pub fn decode_key(encoded: &str) -> Result<Vec<u8>, CredentialError> {
    Ok(BASE64.decode(encoded.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_passwords() {
        for password in ["", "hunter2", "pässwörd mit ümlauten", "a".repeat(256).as_str()] {
            let key = generate_key();
            let token = encrypt(password, &key).expect("encrypt failed");
            assert_eq!(decrypt(&token, &key).expect("decrypt failed"), password);
        }
    }

    #[test]
    fn ciphertext_differs_from_plaintext() {
        let key = generate_key();
        let token = encrypt("secret", &key).expect("encrypt failed");
        assert_ne!(token, "secret");
    }

    #[test]
    fn fresh_nonce_per_encryption() {
        let key = generate_key();
        let a = encrypt("secret", &key).expect("encrypt failed");
        let b = encrypt("secret", &key).expect("encrypt failed");
        assert_ne!(a, b);
    }

    #[test]
    fn mismatched_key_is_rejected() {
        let token = encrypt("secret", &generate_key()).expect("encrypt failed");
        let err = decrypt(&token, &generate_key()).unwrap_err();
        assert!(matches!(err, CredentialError::Rejected));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let key = generate_key();
        assert!(matches!(
            decrypt("not base64 at all!", &key),
            Err(CredentialError::Encoding(_))
        ));
        assert!(matches!(
            decrypt(&BASE64.encode([0u8; 4]), &key),
            Err(CredentialError::Truncated)
        ));
    }

    #[test]
    fn key_encoding_round_trips() {
        let key = generate_key();
        let decoded = decode_key(&encode_key(&key)).expect("decode failed");
        assert_eq!(decoded, key);
    }
}
