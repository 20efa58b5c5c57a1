//! Error types for Chapterbook.
//!
//! Library crates use [`ChapterbookError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Chapterbook operations.
#[derive(Debug, thiserror::Error)]
pub enum ChapterbookError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error (including chapter files that are not valid UTF-8).
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Page shell is missing a placeholder or could not be filled.
    #[error("template error: {message}")]
    Template { message: String },

    /// Data validation error.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ChapterbookError>;

impl ChapterbookError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a template error from any displayable message.
    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template {
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
        let err = ChapterbookError::config("font_min exceeds font_max");
        assert_eq!(err.to_string(), "config error: font_min exceeds font_max");

        let err = ChapterbookError::template("missing {{TOTAL_CH}}");
        assert!(err.to_string().contains("{{TOTAL_CH}}"));
    }

    #[test]
    fn io_error_keeps_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ChapterbookError::io("章节/第001章_开端.md", source);
        let msg = err.to_string();
        assert!(msg.contains("第001章_开端.md"));
        assert!(msg.contains("gone"));
    }
}
