// src/infra/errors.rs — Error types for BOOOMERANGS

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a single provider attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Required secret is absent; detected before any network I/O.
    MissingCredential,
    /// Connection failure, HTTP error status, or timeout.
    Network,
    /// Malformed, unexpected, or empty payload.
    BadResponse,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::MissingCredential => "missing_credential",
            ErrorKind::Network => "network",
            ErrorKind::BadResponse => "bad_response",
        };
        f.write_str(s)
    }
}

/// Failure of one adapter call. Never crosses the cascade boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Provider '{provider}' failed ({kind}): {message}")]
pub struct ProviderError {
    pub provider: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn missing_credential(provider: impl Into<String>, env_var: &str) -> Self {
        Self::new(
            provider,
            ErrorKind::MissingCredential,
            format!("{env_var} is not set"),
        )
    }

    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(provider, ErrorKind::Network, message)
    }

    pub fn bad_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(provider, ErrorKind::BadResponse, message)
    }

    /// Only transport-level failures are worth another try.
    pub fn is_retriable(&self) -> bool {
        self.kind == ErrorKind::Network
    }
}

#[derive(Error, Debug)]
pub enum BoomError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Internal signal; the cascade converts it to a local fallback answer.
    #[error("All providers exhausted")]
    AllProvidersExhausted,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
