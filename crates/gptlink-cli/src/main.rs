//! gptlink: create and open password-protected configuration links
//!
//! Commands:
//!   encode [--input FILE]       - encrypt a JSON config into a share URL
//!   decode <URL|TOKEN>          - decrypt a share URL back to JSON
//!   namespace <URL|TOKEN>       - print the local storage namespace for a link
//!   share <FILE>                - unencrypted compressed share URL
//!   open-plain <URL|TOKEN>      - expand an unencrypted share
//!   config show                 - display the active configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::SecretString;
use std::io::Read;
use std::path::{Path, PathBuf};

use gptlink_codec::{
    build_url, decode_plain, decode_token, encode_json, encode_plain, extract_fragment,
    EncodeOptions, LinkFragment, Session,
};
use gptlink_core::config::GptlinkConfig;
use gptlink_core::types::TokenFormat;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "gptlink",
    version,
    about = "Password-protected configuration links",
    long_about = "gptlink: encode a chat configuration into an encrypted URL fragment and open it again"
)]
struct Cli {
    /// Path to gptlink.toml configuration file
    #[arg(long, short = 'c', env = "GPTLINK_CONFIG", default_value = "gptlink.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "GPTLINK_LOG")]
    log: Option<String>,

    /// Log format; overrides the config file
    #[arg(long, env = "GPTLINK_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt a JSON configuration into a share URL
    Encode {
        /// JSON file to encode (default: stdin)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
        /// Emit the legacy structured-JSON token layout
        #[arg(long)]
        legacy: bool,
        /// Keep verbose JSON keys (skip key compaction)
        #[arg(long)]
        no_compact: bool,
        /// Link password (prompted when absent)
        #[arg(long, env = "GPTLINK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Decrypt a share URL or token and print the configuration
    Decode {
        /// Share URL, `#gpt=` fragment, or bare token
        link: String,
        /// Print the payload as stored (short keys, no expansion)
        #[arg(long)]
        raw: bool,
        #[arg(long, env = "GPTLINK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Print the storage namespace for a link
    ///
    /// Without a password only the token namespace is available.
    Namespace {
        link: String,
        /// Also derive the key-bound namespace (prompts for the password)
        #[arg(long)]
        unlock: bool,
        #[arg(long, env = "GPTLINK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Build an unencrypted, compressed share URL for non-sensitive data
    Share {
        /// JSON file to share (default: stdin)
        input: Option<PathBuf>,
    },

    /// Expand an unencrypted share URL or token
    #[command(name = "open-plain")]
    OpenPlain { link: String },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = GptlinkConfig::load(&cli.config)
        .with_context(|| format!("loading config: {}", cli.config.display()))?;

    let level = cli.log.clone().unwrap_or_else(|| config.log.level.clone());
    let format = cli.log_format.clone().unwrap_or_else(|| {
        if config.log.format == "json" {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    });
    init_logging(&level, &format);

    match cli.command {
        Commands::Encode { input, legacy, no_compact, password } => {
            cmd_encode(&config, input.as_deref(), legacy, no_compact, password)
        }
        Commands::Decode { link, raw, password } => cmd_decode(&config, &link, raw, password),
        Commands::Namespace { link, unlock, password } => {
            cmd_namespace(&config, &link, unlock, password)
        }
        Commands::Share { input } => cmd_share(&config, input.as_deref()),
        Commands::OpenPlain { link } => cmd_open_plain(&config, &link),
        Commands::Config { action: ConfigAction::Show } => cmd_config_show(&config, &cli.config),
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so stdout stays pipeable.
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

// ── Input helpers ─────────────────────────────────────────────────────────────

fn read_json(input: Option<&Path>) -> Result<serde_json::Value> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };
    serde_json::from_str(&text).context("input is not valid JSON")
}

/// Use the flag/env password, or prompt on the terminal.
fn resolve_password(provided: Option<String>, confirm: bool) -> Result<SecretString> {
    if let Some(password) = provided {
        return Ok(SecretString::from(password));
    }
    let password = rpassword::prompt_password("Link password: ").context("reading password")?;
    if confirm {
        let again = rpassword::prompt_password("Confirm password: ").context("reading password")?;
        if again != password {
            anyhow::bail!("passwords do not match");
        }
    }
    Ok(SecretString::from(password))
}

fn encrypted_token(config: &GptlinkConfig, link: &str) -> Result<String> {
    match extract_fragment(link, &config.link)? {
        LinkFragment::Encrypted(token) => Ok(token),
        LinkFragment::Plain(_) => {
            anyhow::bail!("this is an unencrypted share; use `gptlink open-plain`")
        }
    }
}

// ── `gptlink encode` ──────────────────────────────────────────────────────────

fn cmd_encode(
    config: &GptlinkConfig,
    input: Option<&Path>,
    legacy: bool,
    no_compact: bool,
    password: Option<String>,
) -> Result<()> {
    let value = read_json(input)?;
    let password = resolve_password(password, true)?;

    let mut options = EncodeOptions::from(&config.codec);
    if legacy {
        options.format = TokenFormat::Legacy;
    }
    if no_compact {
        options.compact_keys = false;
    }

    let token = encode_json(&value, &password, &options).context("encoding link")?;
    tracing::debug!(format = %options.format, len = token.len(), "encoded link token");

    println!("{}", build_url(&config.link.base_url, &config.link.encrypted_param, &token));
    Ok(())
}

// ── `gptlink decode` ──────────────────────────────────────────────────────────

fn cmd_decode(config: &GptlinkConfig, link: &str, raw: bool, password: Option<String>) -> Result<()> {
    let password = resolve_password(password, false)?;

    let value = if raw {
        let token = encrypted_token(config, link)?;
        let decoded = decode_token(&token, &password)?;
        serde_json::from_slice(&decoded.plaintext).context("payload is not valid JSON")?
    } else {
        Session::open(link, &password, &config.link)?.into_config()
    };

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

// ── `gptlink namespace` ───────────────────────────────────────────────────────

fn cmd_namespace(
    config: &GptlinkConfig,
    link: &str,
    unlock: bool,
    password: Option<String>,
) -> Result<()> {
    let token = encrypted_token(config, link)?;
    println!("token namespace: {}", gptlink_crypto::namespace_for_token(&token));

    if unlock || password.is_some() {
        let password = resolve_password(password, false)?;
        let keys = decode_token(&token, &password)?.session_keys();
        println!("key namespace:   {}", keys.namespace);
    }
    Ok(())
}

// ── `gptlink share` / `gptlink open-plain` ────────────────────────────────────

fn cmd_share(config: &GptlinkConfig, input: Option<&Path>) -> Result<()> {
    let value = read_json(input)?;
    let token = encode_plain(&value, config.codec.compress_level)?;
    println!("{}", build_url(&config.link.base_url, &config.link.plain_param, &token));
    Ok(())
}

fn cmd_open_plain(config: &GptlinkConfig, link: &str) -> Result<()> {
    let token = plain_token(config, link)?;
    let value = decode_plain(&token)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn plain_token(config: &GptlinkConfig, link: &str) -> Result<String> {
    match extract_fragment(link, &config.link)? {
        LinkFragment::Plain(token) => Ok(token),
        // A bare token has no parameter to tell the kinds apart.
        LinkFragment::Encrypted(token) if !names_param(link, &config.link.encrypted_param) => {
            Ok(token)
        }
        LinkFragment::Encrypted(_) => {
            anyhow::bail!("this link is encrypted; use `gptlink decode`")
        }
    }
}

/// Whether the link's fragment (or the bare input) spells out `param=`.
fn names_param(link: &str, param: &str) -> bool {
    let link = link.trim();
    let fragment = link.split_once('#').map_or(link, |(_, fragment)| fragment);
    fragment
        .split('&')
        .any(|part| part.strip_prefix(param).is_some_and(|rest| rest.starts_with('=')))
}

// ── `gptlink config show` ─────────────────────────────────────────────────────

fn cmd_config_show(config: &GptlinkConfig, path: &Path) -> Result<()> {
    println!("# source: {}", path.display());
    print!("{}", toml::to_string_pretty(config).context("serializing config")?);
    Ok(())
}
