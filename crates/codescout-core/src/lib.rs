pub mod config;
pub mod definition;
pub mod error;
pub mod parser;
pub mod service;
pub mod tools;

pub use config::{Config, ConfigError, ExtractionConfig, LoggingConfig};
pub use definition::{CodeDefinition, DefinitionKind};
pub use error::ExtractError;
pub use parser::{Language, Parser, ParserRegistry};
pub use service::{CodeParserService, FileSystemReader, SourceReader};
pub use tools::{DefinitionRecord, ExtractDefinitionsTool, ExtractRequest, ExtractResponse};
