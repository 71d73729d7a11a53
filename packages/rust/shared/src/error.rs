//! Error types for the Civis ingester.
//!
//! Library crates use [`CivisError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all ingestion operations.
#[derive(Debug, thiserror::Error)]
pub enum CivisError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to the upstream API (including timeouts).
    #[error("network error: {0}")]
    Network(String),

    /// Malformed XML or a payload missing a required sub-structure.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad record shape, serialization failure, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CivisError>;

impl CivisError {
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

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = CivisError::config("year range is empty");
        assert_eq!(err.to_string(), "config error: year range is empty");

        let err = CivisError::parse("missing <proposicao> element");
        assert!(err.to_string().contains("<proposicao>"));

        let err = CivisError::Network("timed out".into());
        assert_eq!(err.to_string(), "network error: timed out");
    }

    #[test]
    fn io_error_keeps_path() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = CivisError::io("/tmp/motions.min/PL12342007.json", source);
        let msg = err.to_string();
        assert!(msg.contains("PL12342007.json"));
        assert!(msg.contains("denied"));
    }
}
