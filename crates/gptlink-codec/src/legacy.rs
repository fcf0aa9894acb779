//! Legacy structured-JSON tokens
//!
//! Links issued before the compact layout carried a JSON record, itself
//! base64url-encoded after `#gpt=`:
//! ```text
//! {"enc": base64(tag ‖ ciphertext), "salt": base64(salt[16]), "nonce": base64(nonce[24])}
//! ```
//! keyed with PBKDF2-HMAC-SHA256. Some clients wrote the same record with the
//! iterated SHA-512 key, so opening falls back to it when PBKDF2 fails.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use gptlink_core::types::{LegacyPayload, TokenFormat};
use gptlink_core::{LinkError, LinkResult};
use gptlink_crypto::{
    cipher, derive_key, derive_legacy_key, expand_nonce, DerivedKey, LEGACY_SALT_SIZE, NONCE_SIZE,
    STORED_NONCE_SIZE,
};
use rand::RngCore;
use secrecy::SecretString;

use crate::token::{decode_base64, DecodedToken};

/// Length of the smallest possible record, `{"enc":"","salt":"","nonce":""}`
pub const LEGACY_MIN_LEN: usize = 31;

/// A legacy record with its fields base64-decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyToken {
    pub salt: Vec<u8>,
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

/// Return the structured record if `bytes` is one.
///
/// Compact tokens start with random salt bytes, so anything that is not a
/// JSON object with the three fields falls through to the compact parser.
pub fn sniff(bytes: &[u8]) -> Option<LegacyPayload> {
    if bytes.len() < LEGACY_MIN_LEN || bytes.first() != Some(&b'{') {
        return None;
    }
    serde_json::from_slice(bytes).ok()
}

impl LegacyToken {
    pub fn from_payload(payload: &LegacyPayload) -> LinkResult<Self> {
        Ok(Self {
            salt: decode_base64(&payload.salt, "legacy salt")?,
            nonce: decode_base64(&payload.nonce, "legacy nonce")?,
            ciphertext: decode_base64(&payload.enc, "legacy ciphertext")?,
        })
    }

    pub fn to_payload(&self) -> LegacyPayload {
        LegacyPayload {
            enc: STANDARD.encode(&self.ciphertext),
            salt: STANDARD.encode(&self.salt),
            nonce: STANDARD.encode(&self.nonce),
        }
    }

    /// `base64url_nopad(JSON record)`
    pub fn to_token(&self) -> LinkResult<String> {
        let json = serde_json::to_vec(&self.to_payload())?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    fn cipher_nonce(&self) -> LinkResult<[u8; NONCE_SIZE]> {
        match self.nonce.len() {
            NONCE_SIZE => {
                let mut nonce = [0u8; NONCE_SIZE];
                nonce.copy_from_slice(&self.nonce);
                Ok(nonce)
            }
            STORED_NONCE_SIZE => {
                let mut stored = [0u8; STORED_NONCE_SIZE];
                stored.copy_from_slice(&self.nonce);
                Ok(expand_nonce(&stored))
            }
            n => Err(LinkError::Format(format!(
                "legacy nonce must be {NONCE_SIZE} or {STORED_NONCE_SIZE} bytes, got {n}"
            ))),
        }
    }

    /// Try the PBKDF2 key, then the iterated SHA-512 key.
    pub fn open(&self, password: &SecretString) -> LinkResult<DecodedToken> {
        let nonce = self.cipher_nonce()?;

        let legacy_key = derive_legacy_key(password, &self.salt);
        match cipher::decrypt(&self.ciphertext, legacy_key.as_bytes(), &nonce) {
            Ok(plaintext) => return Ok(self.decoded(plaintext, legacy_key)),
            Err(LinkError::Authentication) => {}
            Err(e) => return Err(e),
        }

        tracing::debug!("PBKDF2 key rejected for legacy record, trying iterated SHA-512 key");
        let key = derive_key(password, &self.salt);
        let plaintext = cipher::decrypt(&self.ciphertext, key.as_bytes(), &nonce)?;
        Ok(self.decoded(plaintext, key))
    }

    fn decoded(&self, plaintext: Vec<u8>, key: DerivedKey) -> DecodedToken {
        DecodedToken {
            plaintext,
            format: TokenFormat::Legacy,
            key,
            salt: self.salt.clone(),
            nonce: self.nonce.clone(),
        }
    }
}

/// Encrypt `plaintext` into a legacy structured token (PBKDF2, 16-byte
/// salt, 24-byte nonce) for clients that predate the compact layout.
pub fn seal(plaintext: &[u8], password: &SecretString) -> LinkResult<String> {
    let mut salt = vec![0u8; LEGACY_SALT_SIZE];
    let mut nonce = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);
    rand::thread_rng().fill_bytes(&mut nonce);

    let key = derive_legacy_key(password, &salt);
    let ciphertext = cipher::encrypt(plaintext, key.as_bytes(), &nonce)?;

    LegacyToken {
        salt,
        nonce: nonce.to_vec(),
        ciphertext,
    }
    .to_token()
}
