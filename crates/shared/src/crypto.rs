//! Cryptographic helpers: random credentials and HMAC-SHA256.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Alphabet for generated event passwords (no 0/O, 1/I/l).
const PASSWORD_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789";

/// Length of generated event passwords.
pub const GENERATED_PASSWORD_LEN: usize = 10;

/// Generates a random event access password.
pub fn generate_event_password() -> String {
    let mut rng = rand::thread_rng();
    (0..GENERATED_PASSWORD_LEN)
        .map(|_| PASSWORD_ALPHABET[rng.gen_range(0..PASSWORD_ALPHABET.len())] as char)
        .collect()
}

/// Computes HMAC-SHA256 of `message` under `key`.
///
/// HMAC accepts keys of any length; the empty tag on the error path never
/// verifies.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Vec<u8> {
    let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
        return Vec::new();
    };
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Computes HMAC-SHA256 and returns it hex encoded.
pub fn hmac_sha256_hex(key: &[u8], message: &[u8]) -> String {
    hex::encode(hmac_sha256(key, message))
}

/// Checks `tag` against the HMAC of `message` in constant time.
pub fn verify_hmac_sha256(key: &[u8], message: &[u8], tag: &[u8]) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
        return false;
    };
    mac.update(message);
    mac.verify_slice(tag).is_ok()
}

/// Compares two secrets without leaking where they differ.
///
/// Both inputs are reduced to HMAC tags under `key` first, so lengths do not
/// leak either.
pub fn secrets_match(key: &[u8], submitted: &str, expected: &str) -> bool {
    let expected_tag = hmac_sha256(key, expected.as_bytes());
    verify_hmac_sha256(key, submitted.as_bytes(), &expected_tag)
}
