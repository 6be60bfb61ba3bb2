//! Mark lookup error types.

use crate::domain::{InvalidMarkCode, MarkCode};

/// Errors from a mark source (web service or database).
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed (network error, timeout, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Database query or connection failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Could not start the runtime that drives database calls
    #[error("database runtime error: {0}")]
    Runtime(#[source] std::io::Error),

    /// Source is not reachable (used by the mock source)
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned when looking up a mark.
#[derive(Debug, thiserror::Error)]
pub enum GdbError {
    /// The code is not a valid mark code; nothing was looked up
    #[error(transparent)]
    InvalidCode(#[from] InvalidMarkCode),

    /// The source was reached but has no such mark
    #[error("{0} is not an existing geodetic mark")]
    UnknownMark(MarkCode),

    /// The source failed and no cached copy was available
    #[error("cannot connect to geodetic database for {code}: {source}")]
    Connection {
        code: MarkCode,
        #[source]
        source: SourceError,
    },

    /// The payload for the mark could not be decoded
    #[error("invalid record for {code}: {message}")]
    InvalidPayload { code: MarkCode, message: String },
}
