//! Key derivation: password → link key, link key → session master key
//!
//! The current scheme is a plain iterated SHA-512 so that the browser client
//! can reproduce it with nothing but a SHA-512 primitive. The full 64-byte
//! digest is carried between rounds; only the final output is truncated.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256, Sha512};
use zeroize::{Zeroize, Zeroizing};

use crate::keys::{DerivedKey, MasterKey};
use crate::{KEY_SIZE, SALT_SIZE};

/// Rounds of the iterated SHA-512 KDF. Fixed; both clients hardcode it.
pub const KDF_ROUNDS: usize = 8192;

/// Rounds of the legacy PBKDF2-HMAC-SHA256 KDF
pub const LEGACY_PBKDF2_ROUNDS: u32 = 10_000;

/// Generate a fresh random salt for a compact token.
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Derive the 256-bit link key from a password (current scheme).
///
/// `h0 = password`, `h_i = SHA-512(h_{i-1} ‖ salt)`, output `h_8192[..32]`.
/// A wrong password yields a wrong key; that surfaces as an AEAD failure.
pub fn derive_key(password: &SecretString, salt: &[u8]) -> DerivedKey {
    DerivedKey::from_bytes(iterated_sha512(
        password.expose_secret().as_bytes(),
        &[salt],
    ))
}

/// Derive the 256-bit link key with the legacy PBKDF2-HMAC-SHA256 scheme.
///
/// Only used to open structured-JSON tokens issued before the iterated
/// SHA-512 scheme existed.
pub fn derive_legacy_key(password: &SecretString, salt: &[u8]) -> DerivedKey {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(
        password.expose_secret().as_bytes(),
        salt,
        LEGACY_PBKDF2_ROUNDS,
        &mut key,
    );
    DerivedKey::from_bytes(key)
}

/// Derive the session master key bound to one link's key material.
///
/// Same construction as [`derive_key`] but every round absorbs both the
/// salt and the stored nonce: `h_i = SHA-512(h_{i-1} ‖ salt ‖ nonce)`.
pub fn derive_master_key(secret: &[u8], salt: &[u8], nonce: &[u8]) -> MasterKey {
    MasterKey::from_bytes(iterated_sha512(secret, &[salt, nonce]))
}

/// Hex form of [`derive_master_key`].
pub fn derive_master_key_hex(secret: &[u8], salt: &[u8], nonce: &[u8]) -> Zeroizing<String> {
    derive_master_key(secret, salt, nonce).to_hex()
}

fn iterated_sha512(seed: &[u8], suffix: &[&[u8]]) -> [u8; KEY_SIZE] {
    let mut state = [0u8; 64];

    let mut hasher = Sha512::new_with_prefix(seed);
    for part in suffix {
        hasher.update(part);
    }
    state.copy_from_slice(&hasher.finalize());

    for _ in 1..KDF_ROUNDS {
        let mut hasher = Sha512::new_with_prefix(state);
        for part in suffix {
            hasher.update(part);
        }
        state.copy_from_slice(&hasher.finalize());
    }

    let mut out = [0u8; KEY_SIZE];
    out.copy_from_slice(&state[..KEY_SIZE]);
    state.zeroize();
    out
}
