//! Error types for subjects-fast.
//!
//! Library crates use [`SubjectsFastError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all subjects-fast operations.
#[derive(Debug, thiserror::Error)]
pub enum SubjectsFastError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A remote archive could not be retrieved (non-2xx, connection, body read).
    #[error("retrieval error for {url}: {message}")]
    Retrieval { url: String, message: String },

    /// A ZIP archive could not be opened or extracted.
    #[error("archive error at {path:?}: {message}")]
    Archive { path: PathBuf, message: String },

    /// MARCXML parsing or field mapping error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (unknown facet name, bad URL, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SubjectsFastError>;

impl SubjectsFastError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a retrieval error for `url`.
    pub fn retrieval(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Retrieval {
            url: url.into(),
            message: msg.into(),
        }
    }

    /// Create an archive error for the archive at `path`.
    pub fn archive(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Archive {
            path: path.into(),
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
