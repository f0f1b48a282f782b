//! Parser registry mapping file extensions to lazily constructed parsers.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use super::language::Language;
use super::traits::Parser;

/// Builds a parser instance on first use.
pub type ParserFactory = Arc<dyn Fn() -> Arc<dyn Parser> + Send + Sync>;

/// One registered extension: its factory and the instance, once built.
struct ParserSlot {
    factory: ParserFactory,
    instance: OnceLock<Arc<dyn Parser>>,
}

impl ParserSlot {
    fn new(factory: ParserFactory) -> Self {
        Self {
            factory,
            instance: OnceLock::new(),
        }
    }
}

/// Registry of language parsers.
///
/// Maps lower-case file extensions to parser factories. Each extension gets
/// its own parser instance, built on the first lookup and reused afterwards.
/// Lookups may race from several threads; exactly one instance per extension
/// is ever kept.
pub struct ParserRegistry {
    slots: HashMap<String, ParserSlot>,
}

impl ParserRegistry {
    /// Create a registry with every built-in language registered.
    pub fn new() -> Self {
        let mut registry = Self::empty();

        for language in Language::ALL {
            registry.register_language(language);
        }

        registry
    }

    /// Create a registry with no parsers.
    pub fn empty() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Register a factory for each of `extensions`.
    ///
    /// Extensions are stored lower-case without a leading dot. Registering an
    /// extension again replaces the earlier factory and drops any instance
    /// already built for it.
    pub fn register<F>(&mut self, extensions: &[&str], factory: F)
    where
        F: Fn() -> Arc<dyn Parser> + Send + Sync + 'static,
    {
        let factory: ParserFactory = Arc::new(factory);
        for ext in extensions {
            let key = normalize_extension(ext);
            self.slots.insert(key, ParserSlot::new(Arc::clone(&factory)));
        }
    }

    /// Register a built-in language under its default extensions.
    pub fn register_language(&mut self, language: Language) {
        self.register(language.extensions(), move || language.create_parser());
    }

    /// Get the parser for an extension, building it on first request.
    pub fn get_parser(&self, extension: &str) -> Option<Arc<dyn Parser>> {
        let key = normalize_extension(extension);
        let slot = self.slots.get(&key)?;
        let parser = slot.instance.get_or_init(|| {
            debug!(extension = %key, "Constructing parser");
            (slot.factory)()
        });
        Some(Arc::clone(parser))
    }

    /// Get the parser for a path, by its extension.
    pub fn parser_for_path(&self, path: impl AsRef<Path>) -> Option<Arc<dyn Parser>> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.get_parser(ext))
    }

    /// Check whether an extension has a registered parser.
    pub fn can_parse(&self, extension: &str) -> bool {
        self.slots.contains_key(&normalize_extension(extension))
    }

    /// All registered extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self.slots.keys().cloned().collect();
        extensions.sort();
        extensions
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}
