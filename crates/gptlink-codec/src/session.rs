//! A decoded link plus the key material scoped to it
//!
//! The master key lives only inside [`Session`]: it is recomputed from the
//! link key on every open and dropped (zeroized) with the session. Storage
//! collaborators receive sealed records and namespaced keys, never the key.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use gptlink_core::config::LinkConfig;
use gptlink_core::types::TokenFormat;
use gptlink_core::{LinkError, LinkResult};
use gptlink_crypto::{cipher, namespace_for_token, NamespaceId, SessionKeys};
use secrecy::SecretString;
use serde_json::Value;

use crate::compact::expand;
use crate::link::{extract_fragment, LinkFragment};
use crate::token::decode_token;

pub struct Session {
    config: Value,
    format: TokenFormat,
    token_namespace: NamespaceId,
    keys: SessionKeys,
}

impl Session {
    /// Open a share URL (or bare token) with `password`.
    pub fn open(input: &str, password: &SecretString, link: &LinkConfig) -> LinkResult<Self> {
        let token = match extract_fragment(input, link)? {
            LinkFragment::Encrypted(token) => token,
            LinkFragment::Plain(_) => {
                return Err(LinkError::format(
                    "link is an unencrypted share; open it with decode_plain",
                ));
            }
        };

        let token_namespace = namespace_for_token(&token);
        let decoded = decode_token(&token, password)?;
        let keys = decoded.session_keys();
        let value: Value = serde_json::from_slice(&decoded.plaintext)?;

        tracing::info!(
            format = %decoded.format,
            token_namespace = %token_namespace,
            namespace = %keys.namespace,
            "opened share link"
        );

        Ok(Self {
            config: expand(&value)?,
            format: decoded.format,
            token_namespace,
            keys,
        })
    }

    /// The decrypted configuration with verbose keys.
    pub fn config(&self) -> &Value {
        &self.config
    }

    pub fn into_config(self) -> Value {
        self.config
    }

    pub fn format(&self) -> TokenFormat {
        self.format
    }

    /// Namespace derived from the token text alone (known before the password).
    pub fn token_namespace(&self) -> &NamespaceId {
        &self.token_namespace
    }

    /// Namespace bound to the link key; scopes persisted session data.
    pub fn namespace(&self) -> &NamespaceId {
        &self.keys.namespace
    }

    /// Storage key for `name` inside this session's namespace.
    pub fn storage_key(&self, name: &str) -> String {
        self.keys.namespace.scoped(name)
    }

    /// Encrypt a record for local persistence under the master key.
    ///
    /// Output is standard base64 of `[24-byte nonce][tag][ciphertext]`.
    pub fn seal_record(&self, record: &Value) -> LinkResult<String> {
        let json = serde_json::to_vec(record)?;
        let sealed = cipher::seal(self.keys.master_key.as_bytes(), &json)?;
        Ok(STANDARD.encode(sealed))
    }

    /// Decrypt a record produced by [`Session::seal_record`].
    pub fn open_record(&self, sealed: &str) -> LinkResult<Value> {
        let bytes = STANDARD
            .decode(sealed.trim())
            .map_err(|e| LinkError::Format(format!("sealed record is not valid base64: {e}")))?;
        let json = cipher::open(self.keys.master_key.as_bytes(), &bytes)?;
        Ok(serde_json::from_slice(&json)?)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &"[REDACTED]")
            .field("format", &self.format)
            .field("token_namespace", &self.token_namespace)
            .field("namespace", &self.keys.namespace)
            .field("master_key", &self.keys.master_key)
            .finish()
    }
}
