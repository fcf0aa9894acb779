//! Unencrypted compressed shares (`#cfg=<token>`)
//!
//! For non-sensitive data where only size matters:
//! `base64url_nopad(zlib(JSON(compact(value))))`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use gptlink_core::LinkResult;
use serde_json::Value;

use crate::compact::{compact, expand};
use crate::deflate;
use crate::token::decode_base64;

/// Compact, serialize and compress `value` into a plain share token.
pub fn encode_plain(value: &Value, level: u32) -> LinkResult<String> {
    let json = serde_json::to_vec(&compact(value)?)?;
    let compressed = deflate::compress(&json, level)?;
    tracing::debug!(json = json.len(), compressed = compressed.len(), "encoded plain share");
    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

/// Inverse of [`encode_plain`]; also accepts raw-deflate payloads.
pub fn decode_plain(token: &str) -> LinkResult<Value> {
    let compressed = decode_base64(token, "share token")?;
    let json = deflate::decompress(&compressed)?;
    let value: Value = serde_json::from_slice(&json)?;
    expand(&value)
}
