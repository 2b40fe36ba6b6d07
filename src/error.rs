//! Error types for gpgpad.
//!
//! The core never raises errors across the host boundary for crypto
//! operations; those travel inside [`OperationResult`](crate::core::operation::OperationResult).
//! The types here cover everything else: configuration, provider
//! availability, document guards, and I/O at the CLI edge.

use thiserror::Error;

use crate::core::operation::Failure;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Operation(#[from] Failure),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to determine the user config directory")]
    NoConfigDir,

    #[error("failed to read config: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to write config: {0}")]
    WriteFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Errors reported by an OpenPGP provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The backend could not be initialized or contacted.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Provider-level crypto failure, diagnostic kept verbatim.
    #[error("{0}")]
    Operation(String),
}

/// Refusals raised by the editor session before the core is invoked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("document is empty")]
    Empty,

    #[error("no key fingerprint selected")]
    NoFingerprint,

    #[error("attempted double encryption: document is already encrypted")]
    AlreadyEncrypted,
}

pub type Result<T> = std::result::Result<T, Error>;
