//! Supported languages and their default extensions.

use std::fmt;
use std::sync::Arc;

use super::c::CParser;
use super::cpp::CppParser;
use super::go::GoParser;
use super::java::JavaParser;
use super::javascript::JavaScriptParser;
use super::kotlin::KotlinParser;
use super::php::PhpParser;
use super::python::PythonParser;
use super::ruby::RubyParser;
use super::rust::RustParser;
use super::scala::ScalaParser;
use super::swift::SwiftParser;
use super::traits::Parser;
use super::typescript::TypeScriptParser;

/// Every language with a built-in parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    C,
    Cpp,
    Java,
    JavaScript,
    TypeScript,
    Go,
    Rust,
    Python,
    Ruby,
    Php,
    Kotlin,
    Swift,
    Scala,
}

impl Language {
    /// All built-in languages, in registration order.
    pub const ALL: [Language; 13] = [
        Language::C,
        Language::Cpp,
        Language::Java,
        Language::JavaScript,
        Language::TypeScript,
        Language::Go,
        Language::Rust,
        Language::Python,
        Language::Ruby,
        Language::Php,
        Language::Kotlin,
        Language::Swift,
        Language::Scala,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Java => "Java",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::Python => "Python",
            Language::Ruby => "Ruby",
            Language::Php => "PHP",
            Language::Kotlin => "Kotlin",
            Language::Swift => "Swift",
            Language::Scala => "Scala",
        }
    }

    /// Lower-case file extensions, without the leading dot.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::C => &["c", "h"],
            Language::Cpp => &["cpp", "hpp", "cc", "cxx", "hh", "hxx"],
            Language::Java => &["java"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::TypeScript => &["ts", "tsx", "mts", "cts"],
            Language::Go => &["go"],
            Language::Rust => &["rs"],
            Language::Python => &["py", "pyi"],
            Language::Ruby => &["rb", "rake"],
            Language::Php => &["php"],
            Language::Kotlin => &["kt", "kts"],
            Language::Swift => &["swift"],
            Language::Scala => &["scala", "sc"],
        }
    }

    /// Language owning `extension` by default, case-insensitive.
    pub fn from_extension(extension: &str) -> Option<Language> {
        let ext = extension.trim_start_matches('.');
        Language::ALL.into_iter().find(|lang| {
            lang.extensions()
                .iter()
                .any(|e| e.eq_ignore_ascii_case(ext))
        })
    }

    /// Construct a fresh parser for this language.
    pub fn create_parser(&self) -> Arc<dyn Parser> {
        match self {
            Language::C => Arc::new(CParser::new()),
            Language::Cpp => Arc::new(CppParser::new()),
            Language::Java => Arc::new(JavaParser::new()),
            Language::JavaScript => Arc::new(JavaScriptParser::new()),
            Language::TypeScript => Arc::new(TypeScriptParser::new()),
            Language::Go => Arc::new(GoParser::new()),
            Language::Rust => Arc::new(RustParser::new()),
            Language::Python => Arc::new(PythonParser::new()),
            Language::Ruby => Arc::new(RubyParser::new()),
            Language::Php => Arc::new(PhpParser::new()),
            Language::Kotlin => Arc::new(KotlinParser::new()),
            Language::Swift => Arc::new(SwiftParser::new()),
            Language::Scala => Arc::new(ScalaParser::new()),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
