//! Stored-nonce expansion
//!
//! Tokens carry a 10-byte nonce to save URL space; XSalsa20 needs 24 bytes.
//! The cipher nonce is `SHA-512(stored)[..24]`, never drawn at random directly.

use rand::RngCore;
use sha2::{Digest, Sha512};

use crate::{NONCE_SIZE, STORED_NONCE_SIZE};

/// Generate a fresh random stored nonce.
pub fn generate_nonce() -> [u8; STORED_NONCE_SIZE] {
    let mut nonce = [0u8; STORED_NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce);
    nonce
}

/// Expand a stored nonce into the 24 bytes the cipher needs.
pub fn expand_nonce(stored: &[u8; STORED_NONCE_SIZE]) -> [u8; NONCE_SIZE] {
    let digest = Sha512::digest(stored);
    let mut expanded = [0u8; NONCE_SIZE];
    expanded.copy_from_slice(&digest[..NONCE_SIZE]);
    expanded
}
