//! gptlink-crypto: password-protected share link primitives
//!
//! Every link is encrypted with a key stretched from the password and a
//! fresh salt, using NaCl secretbox (XSalsa20-Poly1305).
//!
//! ```text
//! password ─┬─ SHA-512 × 8192 (‖ salt[10])           → DerivedKey (32 bytes)
//!           └─ PBKDF2-HMAC-SHA256 × 10000 (legacy)     → DerivedKey (32 bytes)
//! nonce[10] ── SHA-512, first 24 bytes                 → XSalsa20 nonce
//! DerivedKey ─ SHA-512 × 8192 (‖ salt ‖ nonce)         → MasterKey (session storage)
//! DerivedKey ‖ hex(MasterKey) ‖ nonce ─ SHA-512 (hex)  → storage namespace
//! ```

pub mod cipher;
pub mod kdf;
pub mod keys;
pub mod namespace;
pub mod nonce;

pub use cipher::{decrypt, encrypt, open, seal};
pub use kdf::{
    derive_key, derive_legacy_key, derive_master_key, derive_master_key_hex, generate_salt,
};
pub use keys::{DerivedKey, MasterKey};
pub use namespace::{
    derive_namespace_hash, namespace_for_key, namespace_for_token, NamespaceId, SessionKeys,
};
pub use nonce::{expand_nonce, generate_nonce};

/// Size of a derived or master key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of the XSalsa20 nonce handed to the cipher (192-bit)
pub const NONCE_SIZE: usize = 24;

/// Size of the nonce carried inside a compact token
pub const STORED_NONCE_SIZE: usize = 10;

/// Size of the KDF salt carried inside a compact token
pub const SALT_SIZE: usize = 10;

/// Size of the salt used by legacy PBKDF2 tokens
pub const LEGACY_SALT_SIZE: usize = 16;

/// Size of a Poly1305 authentication tag
pub const TAG_SIZE: usize = 16;
