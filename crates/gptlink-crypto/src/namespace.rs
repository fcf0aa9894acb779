//! Per-link storage namespaces
//!
//! Two derivations, both recomputed on every visit (nothing maps links to
//! namespaces on disk):
//! - before the password is known: SHA-256 of the token text, 8 hex chars
//! - after decryption: SHA-512 over link key, master key hex and nonce

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};

use crate::kdf::derive_master_key;
use crate::keys::{DerivedKey, MasterKey};

/// Hex characters kept from the token hash
pub const TOKEN_NAMESPACE_LEN: usize = 8;

/// Hex characters kept from the key-bound namespace hash
pub const KEY_NAMESPACE_LEN: usize = 16;

/// Identifier scoping one link's locally persisted data
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceId(String);

impl NamespaceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix a storage key with this namespace (`<ns>:<key>`).
    pub fn scoped(&self, key: &str) -> String {
        format!("{}:{key}", self.0)
    }
}

impl std::fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key material a session needs to locate and encrypt its local data.
#[derive(Debug, Clone)]
pub struct SessionKeys {
    pub namespace: NamespaceId,
    pub master_key: MasterKey,
}

/// Namespace for a link whose password has not been entered yet.
pub fn namespace_for_token(token: &str) -> NamespaceId {
    let digest = Sha256::digest(token.as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(TOKEN_NAMESPACE_LEN);
    NamespaceId(id)
}

/// `hex(SHA-512(decryption_key ‖ master_key_hex ‖ nonce))`
pub fn derive_namespace_hash(decryption_key: &[u8], master_key_hex: &str, nonce: &[u8]) -> String {
    let mut hasher = Sha512::new();
    hasher.update(decryption_key);
    hasher.update(master_key_hex.as_bytes());
    hasher.update(nonce);
    hex::encode(hasher.finalize())
}

/// Derive the master key and key-bound namespace for a decrypted link.
///
/// `salt` and `nonce` are the values stored in the token, so the same link
/// always lands in the same namespace.
pub fn namespace_for_key(key: &DerivedKey, salt: &[u8], nonce: &[u8]) -> SessionKeys {
    let master_key = derive_master_key(key.as_bytes(), salt, nonce);
    let mut id = derive_namespace_hash(key.as_bytes(), &master_key.to_hex(), nonce);
    id.truncate(KEY_NAMESPACE_LEN);

    tracing::debug!(namespace = %id, "derived key-bound namespace");

    SessionKeys {
        namespace: NamespaceId(id),
        master_key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::derive_key;
    use secrecy::SecretString;

    const SALT: [u8; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
    const NONCE: [u8; 10] = [0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28, 0x29];

    const NAMESPACE_HASH: &str = "47018b604a1c275a0370838287fe02654278d4f4a1bcd8150107de4528484f26\
                                  d7d903a067e654c41f880c814f52ec027d8617035f26e42118d011328b53c23c";

    #[test]
    fn test_token_namespace_known_answer() {
        let ns = namespace_for_token("AAECAwQFBgcICQ");
        assert_eq!(ns.as_str(), "7bf2c1ab");
        assert_eq!(ns.as_str().len(), TOKEN_NAMESPACE_LEN);
    }

    #[test]
    fn test_token_namespace_distinguishes_links() {
        assert_ne!(namespace_for_token("token-a"), namespace_for_token("token-b"));
    }

    #[test]
    fn test_namespace_hash_known_answer() {
        let key = derive_key(&SecretString::from("correct horse"), &SALT);
        let master = derive_master_key(key.as_bytes(), &SALT, &NONCE);

        let hash = derive_namespace_hash(key.as_bytes(), &master.to_hex(), &NONCE);
        assert_eq!(hash, NAMESPACE_HASH);
    }

    #[test]
    fn test_namespace_for_key_is_stable() {
        let key = derive_key(&SecretString::from("correct horse"), &SALT);

        let first = namespace_for_key(&key, &SALT, &NONCE);
        let second = namespace_for_key(&key, &SALT, &NONCE);

        assert_eq!(first.namespace, second.namespace);
        assert_eq!(first.master_key.as_bytes(), second.master_key.as_bytes());
        assert_eq!(first.namespace.as_str(), &NAMESPACE_HASH[..KEY_NAMESPACE_LEN]);
    }

    #[test]
    fn test_master_key_differs_from_link_key() {
        let key = DerivedKey::from_bytes([9u8; 32]);
        let keys = namespace_for_key(&key, &SALT, &NONCE);
        assert_ne!(keys.master_key.as_bytes(), key.as_bytes());
    }

    #[test]
    fn test_scoped_storage_key() {
        let ns = namespace_for_token("AAECAwQFBgcICQ");
        assert_eq!(ns.scoped("history"), "7bf2c1ab:history");
    }
}
