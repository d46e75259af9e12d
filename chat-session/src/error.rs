//! Typed errors for the chat session.

use reqwest::StatusCode;
use thiserror::Error;

/// Environment/config problems while building a [`crate::SessionConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid number in {var}: {reason}")]
    InvalidNumber {
        var: &'static str,
        reason: &'static str,
    },

    #[error("invalid API base URL `{0}`: must start with http:// or https://")]
    InvalidUrl(String),
}

/// Failures talking to the contract backend.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP/transport errors (connection refused, reset, TLS, ...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        snippet: String,
    },

    /// Backend payload did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid file {name}: {reason}")]
    InvalidFile { name: String, reason: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a session operation that did not go through.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The input buffer was empty or whitespace.
    #[error("message is empty")]
    EmptyInput,

    /// The backend accepted the upload but generated no questions.
    #[error("no questions were generated for the uploaded file")]
    NoQuestions,

    #[error(transparent)]
    Client(#[from] ClientError),
}
