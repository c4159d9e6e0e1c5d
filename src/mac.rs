//! MAC primitives used by the signing scheme.
//!
//! HMAC-SHA256 via `ring`, unpadded RFC 4648 base-32 for the presentable
//! signature, and a constant-time comparison for verification.

use ring::hmac;
use subtle::ConstantTimeEq;

/// HMAC-SHA256 output size in bytes.
pub const MAC_SIZE: usize = 32;

/// RFC 4648 base-32 alphabet.
pub const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Compute HMAC-SHA256 of `data` under `key`.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; MAC_SIZE] {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key);
    let tag = hmac::sign(&key, data);

    let mut out = [0u8; MAC_SIZE];
    out.copy_from_slice(tag.as_ref());
    out
}

/// Encode bytes as base-32 without `=` padding.
pub fn base32_nopad(bytes: &[u8]) -> String {
    let mut out = String::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut buffer: u16 = 0;
    let mut bits: u8 = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | u16::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            let idx = (buffer >> bits) & 0x1f;
            out.push(BASE32_ALPHABET[idx as usize] as char);
        }
        buffer &= (1 << bits) - 1;
    }

    if bits > 0 {
        let idx = (buffer << (5 - bits)) & 0x1f;
        out.push(BASE32_ALPHABET[idx as usize] as char);
    }

    out
}

/// Whether `c` belongs to the base-32 alphabet (uppercase only).
pub fn is_base32_char(c: char) -> bool {
    c.is_ascii() && BASE32_ALPHABET.contains(&(c as u8))
}

/// Compare two byte strings in time independent of where they differ.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    bool::from(a.ct_eq(b))
}
