use serde::{Deserialize, Serialize};

/// Layout of an encrypted link token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenFormat {
    /// `base64url_nopad(salt[10] ‖ nonce[10] ‖ ciphertext)` (current default)
    #[default]
    Compact,
    /// Structured `{"enc","salt","nonce"}` JSON record, base64url-encoded
    Legacy,
}

impl std::fmt::Display for TokenFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenFormat::Compact => f.write_str("compact"),
            TokenFormat::Legacy => f.write_str("legacy"),
        }
    }
}

/// The legacy structured token record. Every field is standard base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyPayload {
    /// Ciphertext including the Poly1305 tag
    #[serde(alias = "ciphertext")]
    pub enc: String,
    pub salt: String,
    pub nonce: String,
}
