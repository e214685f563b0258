//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! The iteration count and salt length are part of the stored blob
//! format: vaults written by earlier releases must keep opening,
//! so these are constants rather than settings.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Length of the salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Number of PBKDF2 rounds.
pub const PBKDF2_ITERATIONS: u32 = 250_000;

/// Derive a 32-byte key from a password and salt.
///
/// The same password + salt will always produce the same key.  The
/// result is wrapped in `Zeroizing` so it is wiped when dropped.
pub fn derive_key(password: &[u8], salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ITERATIONS, &mut key[..]);
    key
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
