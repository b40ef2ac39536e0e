//! Error types for the Loopia plugin
//!
//! This module defines all error types used throughout the crate. Adapters
//! turn these into host diagnostics at their boundary; nothing below the
//! adapters knows about diagnostics.

use thiserror::Error;

/// Result type alias for Loopia plugin operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the Loopia plugin
#[derive(Error, Debug)]
pub enum Error {
    /// The API answered with a status code other than `OK`
    #[error("Loopia API returned status {0}")]
    Status(String),

    /// Authentication errors (`AUTH_ERROR`)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors (`RATE_LIMITED`)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Domain, subdomain or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input (`BAD_INDATA`)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// XML-RPC fault response
    #[error("XML-RPC fault {code}: {message}")]
    Fault {
        /// Fault code reported by the server
        code: i64,
        /// Fault string reported by the server
        message: String,
    },

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Malformed or unexpected response documents
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a fault error
    pub fn fault(code: i64, message: impl Into<String>) -> Self {
        Self::Fault {
            code,
            message: message.into(),
        }
    }

    /// Map a Loopia status string to an error.
    ///
    /// Returns `None` for `OK`.
    pub fn from_status(status: &str) -> Option<Self> {
        match status {
            "OK" => None,
            "AUTH_ERROR" => Some(Self::auth("wrong username or password")),
            "RATE_LIMITED" => Some(Self::rate_limited("too many requests")),
            "BAD_INDATA" => Some(Self::invalid_input("the API rejected the request parameters")),
            other => Some(Self::Status(other.to_string())),
        }
    }

    /// Whether this error means the remote object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
