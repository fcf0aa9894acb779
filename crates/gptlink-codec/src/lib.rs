//! gptlink-codec: password-protected configuration links
//!
//! Pipeline (encode):
//! ```text
//! config JSON → compact keys → JSON bytes → secretbox(derive(pw, salt), expand(nonce))
//!             → base64url(salt ‖ nonce ‖ ciphertext) → https://host/#gpt=<token>
//! ```
//!
//! Decoding sniffs the token layout: the legacy structured-JSON record is
//! tried first, the fixed-offset compact layout second.

pub mod compact;
pub mod deflate;
pub mod keymap;
pub mod legacy;
pub mod link;
pub mod session;
pub mod share;
pub mod token;

pub use compact::{compact, expand};
pub use link::{build_url, extract_fragment, LinkFragment};
pub use session::Session;
pub use share::{decode_plain, encode_plain};
pub use token::{
    decode, decode_json, decode_token, encode, encode_json, parse_token, DecodedToken,
    EncodeOptions, ParsedToken,
};
