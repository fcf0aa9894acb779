use thiserror::Error;

pub type LinkResult<T> = Result<T, LinkError>;

#[derive(Debug, Error)]
pub enum LinkError {
    /// Token too short, malformed base64, or structurally unparseable.
    #[error("invalid token format: {0}")]
    Format(String),

    /// AEAD tag mismatch. Wrong password and corrupted data are
    /// intentionally reported the same way.
    #[error("decryption failed: incorrect password or corrupted data")]
    Authentication,

    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("compression error: {0}")]
    Compression(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LinkError {
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// True for the failures a user can fix by re-entering the password.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication)
    }
}
