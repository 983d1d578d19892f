//! Cryptographic Utilities

use rand::{Rng, RngCore, rngs::OsRng};

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Uniformly random decimal string of exactly `len` digits, zero-padded.
///
/// `len` must be between 1 and 18 so the range fits in a `u64`.
pub fn random_digits(len: usize) -> String {
    let len = len.clamp(1, 18);
    let upper = 10u64.pow(len as u32);
    let value = OsRng.gen_range(0..upper);
    format!("{value:0len$}")
}

/// Constant-time comparison to prevent timing attacks
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
