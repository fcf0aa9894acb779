//! Static key map: verbose JSON field names ↔ short codes
//!
//! The browser client embeds the same table. Any change must bump
//! [`KEY_MAP_VERSION`] and update `fixtures/keymap.v1.json` (or its
//! successor) together with the pinned fingerprint in the tests.

use std::collections::HashMap;
use std::sync::LazyLock;

use sha2::{Digest, Sha256};

pub const KEY_MAP_VERSION: u32 = 1;

/// `(long, short)` pairs in canonical order
pub static KEY_MAP: &[(&str, &str)] = &[
    ("apiKey", "k"),
    ("apiBase", "b"),
    ("provider", "pv"),
    ("model", "m"),
    ("systemPrompt", "s"),
    ("temperature", "t"),
    ("maxTokens", "mx"),
    ("topP", "tp"),
    ("frequencyPenalty", "fp"),
    ("presencePenalty", "pp"),
    ("stream", "st"),
    ("messages", "ms"),
    ("role", "r"),
    ("content", "c"),
    ("name", "n"),
    ("conversations", "cv"),
    ("title", "ti"),
    ("id", "i"),
    ("createdAt", "ca"),
    ("updatedAt", "ua"),
    ("prompts", "p"),
    ("functions", "f"),
    ("description", "d"),
    ("parameters", "pa"),
    ("code", "cd"),
    ("enabled", "e"),
    ("mcpServers", "mc"),
    ("url", "u"),
    ("headers", "h"),
    ("command", "cm"),
    ("args", "a"),
    ("env", "ev"),
    ("toolCalls", "tc"),
    ("toolCallId", "tk"),
    ("arguments", "ag"),
    ("type", "ty"),
    ("properties", "pr"),
    ("required", "rq"),
    ("theme", "th"),
    ("language", "lg"),
];

static LONG_TO_SHORT: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| KEY_MAP.iter().copied().collect());

static SHORT_TO_LONG: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| KEY_MAP.iter().map(|&(long, short)| (short, long)).collect());

/// Short code for a verbose key, if mapped.
pub fn short_code(long: &str) -> Option<&'static str> {
    LONG_TO_SHORT.get(long).copied()
}

/// Verbose key for a short code, if mapped.
pub fn long_name(short: &str) -> Option<&'static str> {
    SHORT_TO_LONG.get(short).copied()
}

/// SHA-256 (hex) over the canonical `long=short\n` listing.
///
/// Both clients compare this value to detect a drifted table.
pub fn fingerprint() -> String {
    let mut hasher = Sha256::new();
    for (long, short) in KEY_MAP {
        hasher.update(long.as_bytes());
        hasher.update(b"=");
        hasher.update(short.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}
