//! Single-file definition extraction.
//!
//! [`CodeParserService`] resolves a file's parser from its extension, reads
//! and decodes the file, and runs the parser. It never fails outward: every
//! problem is logged and turns into an empty result.

use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::definition::CodeDefinition;
use crate::error::ExtractError;
use crate::parser::ParserRegistry;

/// Source of raw file bytes.
pub trait SourceReader: Send + Sync {
    /// Read the whole file at `path`.
    fn read(&self, path: &Path) -> Result<Vec<u8>, ExtractError>;
}

/// Reads regular files from the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemReader;

impl SourceReader for FileSystemReader {
    fn read(&self, path: &Path) -> Result<Vec<u8>, ExtractError> {
        if !path.is_file() {
            return Err(ExtractError::NotAFile(path.to_path_buf()));
        }
        std::fs::read(path).map_err(|e| ExtractError::io(path, e))
    }
}

/// Decode file bytes as UTF-8, falling back to Latin-1.
///
/// The fallback maps every byte to the code point of the same value, so it
/// cannot fail.
pub fn decode_source(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

/// Extracts definitions from individual files.
pub struct CodeParserService {
    registry: Arc<ParserRegistry>,
    reader: Arc<dyn SourceReader>,
}

impl CodeParserService {
    /// Create a service over every built-in language, reading from disk.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(ParserRegistry::new()))
    }

    /// Create a service over a caller-supplied registry.
    pub fn with_registry(registry: Arc<ParserRegistry>) -> Self {
        Self {
            registry,
            reader: Arc::new(FileSystemReader),
        }
    }

    /// Replace the source reader.
    pub fn with_reader(mut self, reader: Arc<dyn SourceReader>) -> Self {
        self.reader = reader;
        self
    }

    /// The registry used to resolve parsers.
    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Extract definitions from the file at `path`.
    ///
    /// Returns an empty list when the extension is unsupported, the file
    /// cannot be read, or the parser panics.
    pub fn extract_definitions(&self, path: impl AsRef<Path>) -> Vec<CodeDefinition> {
        let path = path.as_ref();
        match self.try_extract(path) {
            Ok(definitions) => definitions,
            Err(ExtractError::UnsupportedExtension(ext)) => {
                debug!(path = %path.display(), extension = %ext, "Skipping unsupported file");
                Vec::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to extract definitions");
                Vec::new()
            }
        }
    }

    /// Extract definitions, reporting why nothing could be extracted.
    pub fn try_extract(&self, path: &Path) -> Result<Vec<CodeDefinition>, ExtractError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let parser = self
            .registry
            .get_parser(extension)
            .ok_or_else(|| ExtractError::UnsupportedExtension(extension.to_string()))?;

        let bytes = self.reader.read(path)?;
        let content = decode_source(&bytes);
        let file_path = path.to_string_lossy();

        let definitions = panic::catch_unwind(AssertUnwindSafe(|| parser.parse(&content, &file_path)))
            .map_err(|_| ExtractError::ParserPanicked(file_path.to_string()))?;

        debug!(
            path = %file_path,
            language = parser.language_name(),
            count = definitions.len(),
            "Extracted definitions"
        );
        Ok(definitions)
    }

    /// Every extension with a registered parser.
    pub fn supported_extensions(&self) -> Vec<String> {
        self.registry.supported_extensions()
    }
}

impl Default for CodeParserService {
    fn default() -> Self {
        Self::new()
    }
}
