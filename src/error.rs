//! Error types for the stereo pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the stereo pipeline
///
/// `DirectoryNotFound` and `CountMismatch` are fatal for a run; everything
/// else is recorded against the file it happened to and the batch continues.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory '{}' not found", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error(
        "Folders have different number of images: '{}' has {left_count}, '{}' has {right_count}",
        left.display(),
        right.display()
    )]
    CountMismatch {
        left: PathBuf,
        left_count: usize,
        right: PathBuf,
        right_count: usize,
    },

    #[error("Cannot rename {} to {}: target already exists", from.display(), to.display())]
    RenameCollision { from: PathBuf, to: PathBuf },

    #[error("Invalid date/time '{value}' in {file}")]
    InvalidTimestamp { file: String, value: String },

    #[error("Invalid orientation '{value}' for {}", path.display())]
    InvalidOrientation { path: PathBuf, value: String },

    #[error("Failed to read EXIF data from {}: {message}", path.display())]
    ExifRead { path: PathBuf, message: String },

    #[error("{tool} not found. Please install it and ensure it is in PATH")]
    ToolNotFound { tool: String },

    #[error("{tool} failed ({status}): {message}")]
    ToolFailed {
        tool: String,
        status: String,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// Whether this error ends the whole run rather than a single file
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::DirectoryNotFound { .. } | Error::CountMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let missing = Error::DirectoryNotFound {
            path: PathBuf::from("left"),
        };
        assert!(missing.is_fatal());

        let collision = Error::RenameCollision {
            from: PathBuf::from("b/x.jpg"),
            to: PathBuf::from("b/y.jpg"),
        };
        assert!(!collision.is_fatal());
    }

    #[test]
    fn test_count_mismatch_message_names_both_counts() {
        let err = Error::CountMismatch {
            left: PathBuf::from("left"),
            left_count: 2,
            right: PathBuf::from("right"),
            right_count: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("'left' has 2"));
        assert!(msg.contains("'right' has 3"));
    }
}
