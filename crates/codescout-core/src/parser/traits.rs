//! Core parser trait for language-specific definition extraction.

use crate::definition::CodeDefinition;

use super::language::Language;

/// Language-specific definition extractor.
///
/// Implement this trait for each language. A parser is stateless after
/// construction (compiled patterns only), so one instance can be shared
/// across threads and reused for any number of files.
///
/// Parsing never fails: malformed or partial input yields whatever
/// definitions could be recognised, possibly none.
///
/// # Example Implementation
///
/// ```ignore
/// impl Parser for GoParser {
///     fn parse(&self, content: &str, file_path: &str) -> Vec<CodeDefinition> {
///         let source = Source::new(content, file_path);
///         // Scan for structs, interfaces, functions and methods...
///     }
///
///     fn language(&self) -> Language { Language::Go }
/// }
/// ```
pub trait Parser: Send + Sync {
    /// Extract definitions from `content`, tagging each with `file_path`.
    ///
    /// The same input always produces the same output, in the same order.
    fn parse(&self, content: &str, file_path: &str) -> Vec<CodeDefinition>;

    /// Language this parser handles.
    fn language(&self) -> Language;

    /// Human-readable language name.
    fn language_name(&self) -> &'static str {
        self.language().name()
    }

    /// File extensions this parser handles by default.
    fn supported_extensions(&self) -> &'static [&'static str] {
        self.language().extensions()
    }

    /// Check if this parser handles the given file extension.
    fn can_parse(&self, extension: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}
