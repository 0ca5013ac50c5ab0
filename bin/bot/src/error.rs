//! Error types for the bot binary.

use std::fmt;

/// Errors talking to the Telegram Bot API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The HTTP request failed or the body could not be decoded.
    RequestFailed {
        method: &'static str,
        reason: String,
    },
    /// The API answered with `ok: false`.
    Api {
        method: &'static str,
        description: String,
    },
    /// The HTTP client could not be built.
    ClientBuild { reason: String },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { method, reason } => {
                write!(f, "telegram {method} request failed: {reason}")
            }
            Self::Api {
                method,
                description,
            } => write!(f, "telegram {method} rejected: {description}"),
            Self::ClientBuild { reason } => write!(f, "failed to build HTTP client: {reason}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Fatal startup failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    /// Configuration is missing or invalid.
    Config { reason: String },
    /// The topic catalog is invalid.
    Catalog { reason: String },
    /// The LLM backend could not be created.
    Backend { reason: String },
    /// The Telegram transport could not be created.
    Transport { reason: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { reason } => write!(f, "invalid configuration: {reason}"),
            Self::Catalog { reason } => write!(f, "invalid topic catalog: {reason}"),
            Self::Backend { reason } => write!(f, "failed to create LLM backend: {reason}"),
            Self::Transport { reason } => write!(f, "failed to create transport: {reason}"),
        }
    }
}

impl std::error::Error for StartupError {}
