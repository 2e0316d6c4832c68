//! Salted password hashing for customer and employee credentials.
//!
//! The stored form is `hex(salt || sha256(salt || password))` with a
//! 16-byte random salt, so equal passwords hash to different strings.

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SALT_LENGTH: usize = 16;
const DIGEST_LENGTH: usize = 32;

pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);

    let digest = digest_with_salt(&salt, password);

    let mut stored = Vec::with_capacity(SALT_LENGTH + DIGEST_LENGTH);
    stored.extend_from_slice(&salt);
    stored.extend_from_slice(&digest);
    hex::encode(stored)
}

/// Checks a candidate password against a stored hash. Stored values that
/// do not decode to a salt and digest verify as `false` rather than
/// erroring, so a corrupted record behaves like a wrong password.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(decoded) = hex::decode(stored) else {
        return false;
    };
    if decoded.len() != SALT_LENGTH + DIGEST_LENGTH {
        return false;
    }
    let (salt, expected) = decoded.split_at(SALT_LENGTH);
    let digest = digest_with_salt(salt, password);
    digest.as_slice().ct_eq(expected).into()
}

fn digest_with_salt(salt: &[u8], password: &str) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}
