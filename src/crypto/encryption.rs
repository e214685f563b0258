//! Password-based AES-256-GCM encryption of an opaque byte blob.
//!
//! Each call to `encrypt` generates a fresh random salt and 12-byte
//! nonce, derives a key from the password with PBKDF2, and returns
//! everything as one base64 string.  `decrypt` splits the prefix back
//! out, re-derives the key and verifies the auth tag.
//!
//! Layout of the decoded blob:
//!   [ 16-byte salt | 12-byte nonce | ciphertext + 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use zeroize::Zeroizing;

use super::kdf::{derive_key, generate_salt, SALT_LEN};
use crate::errors::{PassordrError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Salt + nonce prefix length.
const PREFIX_LEN: usize = SALT_LEN + NONCE_LEN;

/// Generate a random 12-byte nonce.
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let mut out = [0u8; NONCE_LEN];
    out.copy_from_slice(&nonce);
    out
}

/// Encrypt `plaintext` under `password`.
///
/// Returns `base64(salt || nonce || ciphertext)`.  Output differs on
/// every call even for identical inputs.
pub fn encrypt(plaintext: &[u8], password: &str) -> Result<String> {
    let salt = generate_salt();
    let nonce = generate_nonce();
    let key = derive_key(password.as_bytes(), &salt);

    let cipher = Aes256Gcm::new_from_slice(key.as_slice())
        .map_err(|e| PassordrError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| PassordrError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(PREFIX_LEN + ciphertext.len());
    output.extend_from_slice(&salt);
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(BASE64.encode(output))
}

/// Decrypt a blob produced by `encrypt`.
///
/// Any failure (bad base64, truncated blob, auth tag mismatch) maps to
/// `BadPassword`: a wrong password and corrupted data look the same.
pub fn decrypt(blob: &str, password: &str) -> Result<Zeroizing<Vec<u8>>> {
    let data = BASE64
        .decode(blob.trim())
        .map_err(|_| PassordrError::BadPassword)?;

    if data.len() < PREFIX_LEN + TAG_LEN {
        return Err(PassordrError::BadPassword);
    }

    let (salt, rest) = data.split_at(SALT_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let key = derive_key(password.as_bytes(), salt);
    let cipher =
        Aes256Gcm::new_from_slice(key.as_slice()).map_err(|_| PassordrError::BadPassword)?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| PassordrError::BadPassword)?;

    Ok(Zeroizing::new(plaintext))
}
