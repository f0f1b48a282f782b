//! Regex-based definition extraction for source files.
//!
//! Provides a `Parser` trait for pulling named definitions out of source
//! text, with one implementation per supported language. Parsers match
//! declaration headers with regular expressions and find body ends by brace,
//! keyword or indentation balance. They never fail: input they cannot make
//! sense of yields fewer definitions, not an error.
//!
//! ## Components
//!
//! - `Parser` trait - Common interface for all language parsers
//! - `ParserRegistry` - Maps file extensions to lazily built parsers
//! - `Language` - The closed set of supported languages
//! - `scan` - Shared offset, block and docstring helpers
//!
//! ## Supported Languages
//!
//! C, C++, Java, JavaScript, TypeScript, Go, Rust, Python, Ruby, PHP,
//! Kotlin, Swift and Scala.

mod c;
mod cpp;
mod go;
mod java;
mod javascript;
mod kotlin;
mod language;
mod php;
mod python;
mod registry;
mod ruby;
mod rust;
mod scala;
pub mod scan;
mod swift;
mod traits;
mod typescript;

pub use c::CParser;
pub use cpp::CppParser;
pub use go::GoParser;
pub use java::JavaParser;
pub use javascript::JavaScriptParser;
pub use kotlin::KotlinParser;
pub use language::Language;
pub use php::PhpParser;
pub use python::PythonParser;
pub use registry::{ParserFactory, ParserRegistry};
pub use ruby::RubyParser;
pub use rust::RustParser;
pub use scala::ScalaParser;
pub use swift::SwiftParser;
pub use traits::Parser;
pub use typescript::TypeScriptParser;
