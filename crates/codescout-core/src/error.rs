//! Extraction error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while locating, reading or parsing source files.
///
/// None of these escape [`CodeParserService::extract_definitions`](crate::CodeParserService::extract_definitions);
/// they are logged there and turned into an empty result. The tool layer
/// reports them to callers as a message.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Neither a file nor a directory was requested.
    #[error("Either file_path or directory must be provided")]
    MissingTarget,

    /// Path does not name a regular file.
    #[error("File '{}' does not exist", .0.display())]
    NotAFile(PathBuf),

    /// Path does not name a directory.
    #[error("Directory '{}' does not exist", .0.display())]
    NotADirectory(PathBuf),

    /// No parser is registered for the extension.
    #[error("No parser registered for extension '{0}'")]
    UnsupportedExtension(String),

    /// IO error.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory walk error.
    #[error("Walk error: {0}")]
    Walk(String),

    /// A parser panicked while handling the file.
    #[error("Parser panicked on {0}")]
    ParserPanicked(String),
}

impl ExtractError {
    /// Create an IO error with path context.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<ignore::Error> for ExtractError {
    fn from(err: ignore::Error) -> Self {
        ExtractError::Walk(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_tool_contract() {
        assert_eq!(
            ExtractError::MissingTarget.to_string(),
            "Either file_path or directory must be provided"
        );
        assert_eq!(
            ExtractError::NotAFile(PathBuf::from("/tmp/nope.py")).to_string(),
            "File '/tmp/nope.py' does not exist"
        );
        assert_eq!(
            ExtractError::NotADirectory(PathBuf::from("/tmp/nowhere")).to_string(),
            "Directory '/tmp/nowhere' does not exist"
        );
    }

    #[test]
    fn test_io_helper_keeps_path() {
        let err = ExtractError::io(
            "src/lib.rs",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("src/lib.rs"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
