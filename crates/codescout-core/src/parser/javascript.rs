//! JavaScript parser.
//!
//! Classes with their methods (including `static`, `async`, getters and
//! setters), function declarations, and functions bound with
//! `const`/`let`/`var` (function expressions and arrow functions). Only
//! functions outside any brace block are reported. JSDoc blocks become
//! docstrings.
//!
//! The patterns tolerate TypeScript annotations so the TypeScript parser can
//! build on this one.

use regex::Regex;

use crate::definition::{CodeDefinition, DefinitionKind};

use super::language::Language;
use super::scan::{
    block_doc_before, body_open, expression_end, find_block_end, is_inside_block, match_start,
    member_captures, skip_attribute_lines, Located, Region, Source,
};
use super::traits::Parser;

const NOT_A_METHOD: &[&str] = &[
    "if", "for", "while", "switch", "catch", "function", "return", "with",
];

/// Regex-based JavaScript parser.
pub struct JavaScriptParser {
    class: Regex,
    method: Regex,
    function: Regex,
    binding: Regex,
}

impl JavaScriptParser {
    pub fn new() -> Self {
        Self {
            class: Regex::new(
                r"\b(?:export\s+(?:default\s+)?)?(?:abstract\s+)?class\s+(\w+)(?:\s*<[^>{]*>)?(?:\s+extends\s+[\w.]+(?:<[^>{]*>)?)?(?:\s+implements\s+[\w.,\s<>]+)?\s*\{",
            )
            .expect("valid JS class pattern"),
            method: Regex::new(
                r"(?m)(?:^|[{;}])[ \t]*(?:(?:static|async|get|set|public|private|protected|readonly|abstract|override)\s+)*\*?\s*(#?\w+)\s*(?:<[^>(]*>)?\s*\(([^)]*)\)(?:\s*:\s*[^{;=]+)?\s*\{",
            )
            .expect("valid JS method pattern"),
            function: Regex::new(
                r"\b(?:async\s+)?function\s*\*?\s*(\w+)\s*(?:<[^>(]*>)?\s*\(([^)]*)\)",
            )
            .expect("valid JS function pattern"),
            binding: Regex::new(
                r"\b(?:const|let|var)\s+(\w+)\s*(?::\s*[^=;]+)?=\s*(?:async\s+)?(?:(function)\b[^(]*\(([^)]*)\)|(?:\(([^)]*)\)|\w+)(?:\s*:\s*[^=;{]+)?\s*=>)",
            )
            .expect("valid JS binding pattern"),
        }
    }

    /// Patterns that open a top-level definition, for boundary searches.
    pub(crate) fn definition_patterns(&self) -> [&Regex; 3] {
        [&self.class, &self.function, &self.binding]
    }

    fn classes(&self, source: &Source<'_>) -> Vec<(Located, Vec<CodeDefinition>)> {
        let text = source.text;
        let mut classes = Vec::new();

        for caps in self.class.captures_iter(text) {
            let (Some(m), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let start = match_start(&m);
            let open = m.end() - 1;
            let end = find_block_end(text, open, b'{', b'}');
            let def = source
                .define(name.as_str(), DefinitionKind::Class, start, end, &text[start..open])
                .with_docstring(jsdoc(text, start));
            let mut class = Located::new(def, start, end);
            let methods = self.methods(source, &mut class);
            classes.push((class, methods));
        }

        classes
    }

    fn methods(&self, source: &Source<'_>, class: &mut Located) -> Vec<CodeDefinition> {
        let text = source.text;
        let region = Region::new(text, class.start, class.end);
        let mut methods = Vec::new();

        for caps in member_captures(&self.method, region.text) {
            let (Some(m), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let relative = match_start(&m);
            if !region.is_member_position(relative) || NOT_A_METHOD.contains(&name.as_str()) {
                continue;
            }

            let start = region.absolute(relative);
            let open = region.absolute(m.end() - 1);
            let end = find_block_end(text, open, b'{', b'}');
            let method = source
                .define(name.as_str(), DefinitionKind::Method, start, end, &text[start..open])
                .with_docstring(jsdoc(text, start))
                .with_parent(class.def.name.clone());
            class.def.add_child(name.as_str());
            methods.push(method);
        }

        methods
    }

    fn functions(&self, source: &Source<'_>) -> Vec<Located> {
        let text = source.text;
        let mut functions = Vec::new();

        for caps in self.function.captures_iter(text) {
            let (Some(m), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let start = match_start(&m);
            if is_inside_block(text, start) {
                continue;
            }
            let Some(open) = body_open(text, m.end()) else {
                continue;
            };
            let end = find_block_end(text, open, b'{', b'}');
            let def = source
                .define(name.as_str(), DefinitionKind::Function, start, end, &text[start..open])
                .with_docstring(jsdoc(text, start));
            functions.push(Located::new(def, start, end));
        }

        for caps in self.binding.captures_iter(text) {
            let (Some(m), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let start = match_start(&m);
            if is_inside_block(text, start) {
                continue;
            }

            let (header_end, end) = if caps.get(2).is_some() {
                let Some(open) = body_open(text, m.end()) else {
                    continue;
                };
                (open, find_block_end(text, open, b'{', b'}'))
            } else {
                (m.end(), expression_end(text, m.end()))
            };
            let def = source
                .define(name.as_str(), DefinitionKind::Function, start, end, &text[start..header_end])
                .with_docstring(jsdoc(text, start));
            functions.push(Located::new(def, start, end));
        }

        functions.sort_by_key(|f| f.start);
        functions
    }
}

/// JSDoc block above `position`, looking past decorator lines.
pub(crate) fn jsdoc(text: &str, position: usize) -> Option<String> {
    block_doc_before(text, skip_attribute_lines(text, position, &["@"]))
}

impl Default for JavaScriptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for JavaScriptParser {
    fn parse(&self, content: &str, file_path: &str) -> Vec<CodeDefinition> {
        let source = Source::new(content, file_path);
        let mut defs = Vec::new();

        for (class, methods) in self.classes(&source) {
            defs.push(class.def);
            defs.extend(methods);
        }
        defs.extend(self.functions(&source).into_iter().map(|f| f.def));

        defs
    }

    fn language(&self) -> Language {
        Language::JavaScript
    }
}
