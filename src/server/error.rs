//! Error types for the HTTP server.

use std::net::SocketAddr;

use thiserror::Error;

use crate::parser::Error as ParserError;

/// Errors that can occur during HTTP server operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The listening socket could not be created, bound or put in listen mode.
    #[error("Failed to bind or listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The server configuration cannot be run.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The peer closed the connection before sending any bytes.
    #[error("Client disconnected without sending data")]
    ClientDisconnected,

    /// The request exceeded the configured maximum size.
    #[error("Request exceeds {0} bytes")]
    RequestTooLarge(usize),

    /// A response was built from a status code with no known reason phrase.
    #[error("Unknown status code: {0}")]
    UnknownStatusCode(u16),

    /// Internal server error, typically raised by a handler.
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
