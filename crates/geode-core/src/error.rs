//! Error types for geode.
//!
//! This module provides a unified error type with explicit variants for
//! transport, protocol, input validation and decoding errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for geode operations.
///
/// List controllers never surface these to readers; they are logged and
/// folded into the result store. Sources and the CLI see them directly.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, local IO).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-success responses from the remote API.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (bad URL, cursor, filter).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// A response body that is not a result page.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },

    /// Local filesystem error (file-backed sources).
    #[error("IO error: {message}")]
    Io { message: String },
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io {
            message: err.to_string(),
        }
    }
}

/// A non-2xx response from the remote API.
///
/// The body is kept for logging only; nothing interprets it.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Response body text, if any.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self { status, message }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid pagination cursor.
    #[error("invalid cursor '{value}': {reason}")]
    Cursor { value: String, reason: String },

    /// Invalid filter parameter.
    #[error("invalid filter '{value}': {reason}")]
    Filter { value: String, reason: String },

    /// Invalid sort specification.
    #[error("invalid sort '{value}': {reason}")]
    Sort { value: String, reason: String },

    /// Unknown entity kind or screen name.
    #[error("unknown kind '{value}'")]
    Kind { value: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
