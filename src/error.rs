//! Error types for claude-shell-guard

use std::path::PathBuf;

/// Errors raised while loading or saving a policy document
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to read policy {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse policy {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to parse policy {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to serialize policy: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Errors in the hook pipeline; every one of them resolves to a block
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no hook input received")]
    EmptyInput,

    #[error("malformed hook event: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    #[error(transparent)]
    Policy(#[from] PolicyError),
}
