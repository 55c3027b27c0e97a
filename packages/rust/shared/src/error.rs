//! Error types for LeadScout.
//!
//! Library crates use [`LeadScoutError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all LeadScout operations.
#[derive(Debug, thiserror::Error)]
pub enum LeadScoutError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level HTTP error (connection, TLS, unreadable body).
    #[error("network error: {0}")]
    Network(String),

    /// A remote operation exceeded its allotted duration.
    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    /// The remote agent answered with a non-2xx status.
    ///
    /// `detail` carries the agent's structured error message verbatim when
    /// the body supplies one, otherwise a generic transport description.
    #[error("remote agent error (HTTP {status}): {detail}")]
    Remote { status: u16, detail: String },

    /// The extraction stage found no leads. This is a semantic outcome
    /// reported by the agent, not a transport failure.
    #[error("no leads detected on the source page")]
    EmptyResult,

    /// Response body could not be decoded into the expected shape.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A pipeline run was requested while another is still in flight.
    #[error("a pipeline run is already in progress")]
    Busy,
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LeadScoutError>;

impl LeadScoutError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is the semantic "no leads found" outcome,
    /// as opposed to a transport or remote failure.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult)
    }
}
