//! Share URLs: tokens ride in the fragment (`#gpt=<token>`), which browsers
//! never send to a server.

use gptlink_core::config::LinkConfig;
use gptlink_core::{LinkError, LinkResult};

/// A token pulled out of a share URL, tagged by the parameter that carried it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkFragment {
    /// Password-protected token (`#gpt=`)
    Encrypted(String),
    /// Unencrypted compressed share (`#cfg=`)
    Plain(String),
}

impl LinkFragment {
    pub fn token(&self) -> &str {
        match self {
            LinkFragment::Encrypted(token) | LinkFragment::Plain(token) => token,
        }
    }
}

/// Attach `token` to `base_url` as `#<param>=<token>`, replacing any
/// existing fragment.
pub fn build_url(base_url: &str, param: &str, token: &str) -> String {
    let base = base_url.split_once('#').map_or(base_url, |(base, _)| base);
    format!("{base}#{param}={token}")
}

/// Find the token in a full URL, a bare `gpt=...` fragment, or a bare token.
pub fn extract_fragment(input: &str, link: &LinkConfig) -> LinkResult<LinkFragment> {
    let input = input.trim();
    let (fragment, had_fragment) = match input.split_once('#') {
        Some((_, fragment)) => (fragment, true),
        None if input.contains("://") => {
            return Err(LinkError::format("share URL has no #fragment"));
        }
        None => (input, false),
    };

    for part in fragment.split('&') {
        if let Some(token) = param_value(part, &link.encrypted_param) {
            return non_empty(token).map(LinkFragment::Encrypted);
        }
        if let Some(token) = param_value(part, &link.plain_param) {
            return non_empty(token).map(LinkFragment::Plain);
        }
    }

    if had_fragment {
        return Err(LinkError::Format(format!(
            "fragment carries neither {}= nor {}=",
            link.encrypted_param, link.plain_param
        )));
    }
    non_empty(fragment).map(LinkFragment::Encrypted)
}

fn param_value<'a>(part: &'a str, param: &str) -> Option<&'a str> {
    part.strip_prefix(param)?.strip_prefix('=')
}

fn non_empty(token: &str) -> LinkResult<String> {
    if token.is_empty() {
        Err(LinkError::format("empty token in share link"))
    } else {
        Ok(token.to_string())
    }
}
