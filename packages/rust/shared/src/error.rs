//! Error types for Geoflow.
//!
//! Library crates use [`GeoflowError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Geoflow operations.
#[derive(Debug, thiserror::Error)]
pub enum GeoflowError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching an archive.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Corrupt or unreadable archive container.
    #[error("extract error: {0}")]
    Extract(String),

    /// Corrupt compressed member (scoped to one member, never a stage).
    #[error("decompress error: {0}")]
    Decompress(String),

    /// Table parse error (scoped to one section, never a document).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A pipeline stage failed; carries the stage name and the cause.
    #[error("stage '{stage}' failed: {source}")]
    Stage {
        stage: &'static str,
        source: Box<GeoflowError>,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GeoflowError>;

impl GeoflowError {
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

    /// Attribute an error to a named pipeline stage.
    pub fn stage(stage: &'static str, source: GeoflowError) -> Self {
        Self::Stage {
            stage,
            source: Box::new(source),
        }
    }
}
