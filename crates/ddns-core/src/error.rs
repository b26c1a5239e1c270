//! Error types for the DDNS updater
//!
//! Every failure a reconciliation cycle can hit is one of a small set of
//! kinds. Callers branch on [`Error::kind`] rather than on message text.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failure, timeout, or unusable response on an HTTP call
    #[error("Network error: {0}")]
    Network(String),

    /// The provider API answered, but with a failure
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Discriminant of [`Error`], for programmatic matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    Network,
    Provider,
    Json,
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// The kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Network(_) => ErrorKind::Network,
            Error::Provider { .. } => ErrorKind::Provider,
            Error::Json(_) => ErrorKind::Json,
        }
    }

    /// Whether this error must halt the process
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Config
    }
}
