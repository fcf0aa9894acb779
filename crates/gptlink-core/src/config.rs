use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::TokenFormat;
use crate::{LinkError, LinkResult};

/// Top-level configuration (loaded from gptlink.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GptlinkConfig {
    pub link: LinkConfig,
    pub codec: CodecConfig,
    pub log: LogConfig,
}

/// Where tokens are placed in a share URL
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Application URL the fragment is attached to
    pub base_url: String,
    /// Fragment parameter carrying encrypted tokens (default: gpt)
    pub encrypted_param: String,
    /// Fragment parameter carrying unencrypted compressed shares (default: cfg)
    pub plain_param: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Token layout for newly encoded links: "compact" or "legacy"
    pub format: TokenFormat,
    /// zlib level for plain shares, 0-9 (default: 6)
    pub compress_level: u32,
    /// Rename known JSON keys to short codes before encoding
    pub compact_keys: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            base_url: "https://chat.example.com/".into(),
            encrypted_param: "gpt".into(),
            plain_param: "cfg".into(),
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            format: TokenFormat::Compact,
            compress_level: 6,
            compact_keys: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl GptlinkConfig {
    /// Load from `path`, falling back to defaults when the file is missing.
    pub fn load(path: &Path) -> LinkResult<Self> {
        if !path.exists() {
            tracing::warn!("config file not found: {}  (using defaults)", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| LinkError::Config(format!("parsing {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LinkResult<()> {
        let link = &self.link;
        if link.encrypted_param.is_empty() || link.plain_param.is_empty() {
            return Err(LinkError::Config("fragment parameter names must not be empty".into()));
        }
        if link.encrypted_param == link.plain_param {
            return Err(LinkError::Config(format!(
                "encrypted_param and plain_param must differ (both are {:?})",
                link.encrypted_param
            )));
        }
        if self.codec.compress_level > 9 {
            return Err(LinkError::Config(format!(
                "compress_level must be 0-9, got {}",
                self.codec.compress_level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[link]
base_url = "https://chat.internal.test/app/"
encrypted_param = "g"
plain_param = "p"

[codec]
format = "legacy"
compress_level = 9
compact_keys = false

[log]
level = "debug"
format = "json"
"#;
        let config: GptlinkConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.link.base_url, "https://chat.internal.test/app/");
        assert_eq!(config.link.encrypted_param, "g");
        assert_eq!(config.link.plain_param, "p");
        assert_eq!(config.codec.format, TokenFormat::Legacy);
        assert_eq!(config.codec.compress_level, 9);
        assert!(!config.codec.compact_keys);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, "json");
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_defaults() {
        let config: GptlinkConfig = toml::from_str("").unwrap();

        assert_eq!(config.link.encrypted_param, "gpt");
        assert_eq!(config.link.plain_param, "cfg");
        assert_eq!(config.codec.format, TokenFormat::Compact);
        assert_eq!(config.codec.compress_level, 6);
        assert!(config.codec.compact_keys);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[codec]
compress_level = 1
"#;
        let config: GptlinkConfig = toml::from_str(toml_str).unwrap();

        // Overridden
        assert_eq!(config.codec.compress_level, 1);
        // Defaults
        assert_eq!(config.codec.format, TokenFormat::Compact);
        assert_eq!(config.link.encrypted_param, "gpt");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = GptlinkConfig::default();
        config.link.plain_param = "gpt".into();
        assert!(matches!(config.validate(), Err(LinkError::Config(_))));

        let mut config = GptlinkConfig::default();
        config.link.encrypted_param.clear();
        assert!(config.validate().is_err());

        let mut config = GptlinkConfig::default();
        config.codec.compress_level = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = GptlinkConfig::load(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.link.encrypted_param, "gpt");
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("gptlink.toml");
        std::fs::write(&path, "[link]\nbase_url = \"https://x.test/\"\n").unwrap();

        let config = GptlinkConfig::load(&path).unwrap();
        assert_eq!(config.link.base_url, "https://x.test/");
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("gptlink.toml");
        std::fs::write(&path, "[codec]\ncompress_level = 42\n").unwrap();

        assert!(GptlinkConfig::load(&path).is_err());
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = GptlinkConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: GptlinkConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.link.base_url, parsed.link.base_url);
        assert_eq!(config.codec.format, parsed.codec.format);
    }
}
