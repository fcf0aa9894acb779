//! Encrypted link tokens
//!
//! Compact layout (current default):
//! ```text
//! base64url_nopad( [10 bytes: salt][10 bytes: stored nonce][16 bytes: tag][N bytes: ciphertext] )
//! ```
//! Tokens carry no version byte. Decoding tries the legacy structured-JSON
//! record first and falls back to the fixed-offset compact layout, which
//! keeps every link issued so far openable.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use gptlink_core::config::CodecConfig;
use gptlink_core::types::TokenFormat;
use gptlink_core::{LinkError, LinkResult};
use gptlink_crypto::{
    cipher, derive_key, expand_nonce, generate_nonce, generate_salt, namespace_for_key,
    DerivedKey, SessionKeys, SALT_SIZE, STORED_NONCE_SIZE, TAG_SIZE,
};
use secrecy::SecretString;
use serde_json::Value;

use crate::compact::{compact, expand};
use crate::legacy::{self, LegacyToken};

/// Shortest decodable compact token: salt + nonce + an empty message's tag
pub const MIN_COMPACT_LEN: usize = SALT_SIZE + STORED_NONCE_SIZE + TAG_SIZE;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// How new tokens are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub format: TokenFormat,
    /// Rename known JSON keys to short codes before encryption
    pub compact_keys: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            format: TokenFormat::Compact,
            compact_keys: true,
        }
    }
}

impl From<&CodecConfig> for EncodeOptions {
    fn from(config: &CodecConfig) -> Self {
        Self {
            format: config.format,
            compact_keys: config.compact_keys,
        }
    }
}

/// A token split into its compact-layout fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactToken {
    pub salt: [u8; SALT_SIZE],
    pub nonce: [u8; STORED_NONCE_SIZE],
    pub ciphertext: Vec<u8>,
}

/// Result of sniffing a token's layout, before any key derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedToken {
    Compact(CompactToken),
    Legacy(LegacyToken),
}

/// An opened token plus the key material the session layer needs
pub struct DecodedToken {
    pub plaintext: Vec<u8>,
    pub format: TokenFormat,
    pub key: DerivedKey,
    /// Salt exactly as stored in the token
    pub salt: Vec<u8>,
    /// Nonce exactly as stored in the token (before expansion)
    pub nonce: Vec<u8>,
}

impl DecodedToken {
    /// Namespace and master key bound to this link.
    pub fn session_keys(&self) -> SessionKeys {
        namespace_for_key(&self.key, &self.salt, &self.nonce)
    }
}

impl std::fmt::Debug for DecodedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedToken")
            .field("plaintext", &format_args!("[{} bytes REDACTED]", self.plaintext.len()))
            .field("format", &self.format)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl CompactToken {
    /// Encrypt `plaintext` under a fresh salt and nonce.
    pub fn seal(plaintext: &[u8], password: &SecretString) -> LinkResult<Self> {
        let salt = generate_salt();
        let nonce = generate_nonce();
        let key = derive_key(password, &salt);

        let ciphertext = cipher::encrypt(plaintext, key.as_bytes(), &expand_nonce(&nonce))?;
        Ok(Self {
            salt,
            nonce,
            ciphertext,
        })
    }

    /// Split decoded token bytes at their fixed offsets.
    pub fn from_bytes(bytes: &[u8]) -> LinkResult<Self> {
        if bytes.len() < MIN_COMPACT_LEN {
            return Err(LinkError::Format(format!(
                "token too short: {} bytes (minimum {MIN_COMPACT_LEN})",
                bytes.len()
            )));
        }

        let (salt, rest) = bytes.split_at(SALT_SIZE);
        let (nonce, ciphertext) = rest.split_at(STORED_NONCE_SIZE);

        let mut token = Self {
            salt: [0u8; SALT_SIZE],
            nonce: [0u8; STORED_NONCE_SIZE],
            ciphertext: ciphertext.to_vec(),
        };
        token.salt.copy_from_slice(salt);
        token.nonce.copy_from_slice(nonce);
        Ok(token)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SALT_SIZE + STORED_NONCE_SIZE + self.ciphertext.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// `base64url_nopad(salt ‖ nonce ‖ ciphertext)`
    pub fn to_token(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.to_bytes())
    }

    pub fn open(&self, password: &SecretString) -> LinkResult<DecodedToken> {
        let key = derive_key(password, &self.salt);
        let plaintext = cipher::decrypt(&self.ciphertext, key.as_bytes(), &expand_nonce(&self.nonce))?;
        Ok(DecodedToken {
            plaintext,
            format: TokenFormat::Compact,
            key,
            salt: self.salt.to_vec(),
            nonce: self.nonce.to_vec(),
        })
    }
}

impl ParsedToken {
    pub fn format(&self) -> TokenFormat {
        match self {
            ParsedToken::Compact(_) => TokenFormat::Compact,
            ParsedToken::Legacy(_) => TokenFormat::Legacy,
        }
    }

    pub fn open(&self, password: &SecretString) -> LinkResult<DecodedToken> {
        match self {
            ParsedToken::Compact(token) => token.open(password),
            ParsedToken::Legacy(token) => token.open(password),
        }
    }
}

/// Base64 decode accepting URL-safe or standard alphabets, padded or not.
pub(crate) fn decode_base64(input: &str, what: &str) -> LinkResult<Vec<u8>> {
    let input = input.trim();
    if input.is_empty() {
        return Err(LinkError::Format(format!("{what} is empty")));
    }
    URL_SAFE_LENIENT
        .decode(input)
        .or_else(|_| STANDARD_LENIENT.decode(input))
        .map_err(|e| LinkError::Format(format!("{what} is not valid base64: {e}")))
}

/// Decode a token and determine its layout without deriving any key.
pub fn parse_token(token: &str) -> LinkResult<ParsedToken> {
    let bytes = decode_base64(token, "token")?;

    if let Some(payload) = legacy::sniff(&bytes) {
        tracing::debug!(len = bytes.len(), "token parsed as legacy structured record");
        return LegacyToken::from_payload(&payload).map(ParsedToken::Legacy);
    }

    tracing::debug!(len = bytes.len(), "token parsed as compact layout");
    CompactToken::from_bytes(&bytes).map(ParsedToken::Compact)
}

/// Encrypt `plaintext` into a compact token.
pub fn encode(plaintext: &[u8], password: &SecretString) -> LinkResult<String> {
    Ok(CompactToken::seal(plaintext, password)?.to_token())
}

/// Decrypt a token of either layout.
pub fn decode(token: &str, password: &SecretString) -> LinkResult<Vec<u8>> {
    Ok(decode_token(token, password)?.plaintext)
}

/// Decrypt a token of either layout, keeping the key material.
pub fn decode_token(token: &str, password: &SecretString) -> LinkResult<DecodedToken> {
    parse_token(token)?.open(password)
}

/// Serialize, optionally compact, and encrypt a configuration object.
pub fn encode_json(
    value: &Value,
    password: &SecretString,
    options: &EncodeOptions,
) -> LinkResult<String> {
    let bytes = if options.compact_keys {
        serde_json::to_vec(&compact(value)?)?
    } else {
        serde_json::to_vec(value)?
    };

    match options.format {
        TokenFormat::Compact => encode(&bytes, password),
        TokenFormat::Legacy => legacy::seal(&bytes, password),
    }
}

/// Decrypt a configuration token and expand short keys.
pub fn decode_json(token: &str, password: &SecretString) -> LinkResult<Value> {
    let plaintext = decode(token, password)?;
    let value: Value = serde_json::from_slice(&plaintext)?;
    expand(&value)
}
