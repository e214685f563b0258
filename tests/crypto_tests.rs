//! Integration tests for the passordr crypto module.

use std::collections::HashSet;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use passordr::crypto::{
    decrypt, derive_key, encrypt, generate_nonce, generate_salt, NONCE_LEN, SALT_LEN, TAG_LEN,
};
use passordr::errors::PassordrError;

// ---------------------------------------------------------------------------
// Encryption round-trip
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let plaintext = br#"{"hint":"h","services":[{"name":"mail","outdated":false}]}"#;

    let blob = encrypt(plaintext, "correct horse").expect("encrypt should succeed");
    let recovered = decrypt(&blob, "correct horse").expect("decrypt should succeed");

    assert_eq!(recovered.as_slice(), plaintext);
}

#[test]
fn blob_layout_is_salt_nonce_ciphertext_tag() {
    let plaintext = b"twelve bytes";
    let blob = encrypt(plaintext, "pw").unwrap();

    let raw = STANDARD.decode(&blob).expect("blob must be standard base64");
    assert_eq!(raw.len(), SALT_LEN + NONCE_LEN + plaintext.len() + TAG_LEN);
}

#[test]
fn empty_plaintext_roundtrips() {
    let blob = encrypt(b"", "pw").unwrap();
    assert!(decrypt(&blob, "pw").unwrap().is_empty());
}

#[test]
fn encrypt_produces_different_blob_each_time() {
    let b1 = encrypt(b"same", "pw").unwrap();
    let b2 = encrypt(b"same", "pw").unwrap();
    assert_ne!(b1, b2, "fresh salt and nonce per encryption");
}

// ---------------------------------------------------------------------------
// Failures all look the same
// ---------------------------------------------------------------------------

#[test]
fn decrypt_with_wrong_password_fails() {
    let blob = encrypt(b"secret", "right").unwrap();
    let err = decrypt(&blob, "wrong").unwrap_err();
    assert!(matches!(err, PassordrError::BadPassword));
}

#[test]
fn every_single_bit_flip_is_rejected() {
    let blob = encrypt(b"x", "pw").unwrap();
    let raw = STANDARD.decode(&blob).unwrap();

    // Every byte, cycling through all eight bit positions.
    let mut flips: Vec<(usize, u8)> = (0..raw.len()).map(|i| (i, 1u8 << (i % 8))).collect();
    // All eight bits of one byte in each region: salt, nonce, ciphertext, tag.
    for i in [0, SALT_LEN, SALT_LEN + NONCE_LEN, raw.len() - 1] {
        flips.extend((0..8).map(|b| (i, 1u8 << b)));
    }

    for (i, mask) in flips {
        let mut tampered = raw.clone();
        tampered[i] ^= mask;
        let err = decrypt(&STANDARD.encode(&tampered), "pw").unwrap_err();
        assert!(
            matches!(err, PassordrError::BadPassword),
            "flip {mask:#04x} at byte {i} must fail authentication"
        );
    }
}

#[test]
fn garbage_input_is_bad_password() {
    let too_short = STANDARD.encode([0u8; 20]);
    for blob in ["", "not base64 !!", "AAAA", too_short.as_str()] {
        let err = decrypt(blob, "pw").unwrap_err();
        assert!(matches!(err, PassordrError::BadPassword), "input {blob:?}");
    }
}

// ---------------------------------------------------------------------------
// Randomness and key derivation
// ---------------------------------------------------------------------------

#[test]
fn ten_thousand_salt_nonce_pairs_are_distinct() {
    let mut seen = HashSet::new();
    for _ in 0..10_000 {
        let pair = (generate_salt(), generate_nonce());
        assert!(seen.insert(pair), "salt/nonce pair repeated");
    }
}

#[test]
fn derive_key_is_deterministic_per_salt() {
    let salt = [7u8; SALT_LEN];
    let k1 = derive_key(b"pw", &salt);
    let k2 = derive_key(b"pw", &salt);
    let k3 = derive_key(b"pw", &[8u8; SALT_LEN]);

    assert_eq!(*k1, *k2);
    assert_ne!(*k1, *k3);
}
