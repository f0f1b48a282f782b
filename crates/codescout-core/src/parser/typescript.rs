//! TypeScript parser, layered on the JavaScript parser.
//!
//! Everything the JavaScript parser finds, plus interfaces, type aliases and
//! enums.

use regex::Regex;

use crate::definition::{CodeDefinition, DefinitionKind};

use super::javascript::{jsdoc, JavaScriptParser};
use super::language::Language;
use super::scan::{find_block_end, find_next_definition, find_byte, match_start, Source};
use super::traits::Parser;

/// Regex-based TypeScript parser.
pub struct TypeScriptParser {
    js: JavaScriptParser,
    interface: Regex,
    type_alias: Regex,
    enum_decl: Regex,
}

impl TypeScriptParser {
    pub fn new() -> Self {
        Self {
            js: JavaScriptParser::new(),
            interface: Regex::new(
                r"\b(?:export\s+(?:default\s+)?)?(?:declare\s+)?interface\s+(\w+)(?:\s*<[^{]*?>)?(?:\s+extends\s+[^{]+)?\s*\{",
            )
            .expect("valid TS interface pattern"),
            type_alias: Regex::new(
                r"\b(?:export\s+)?(?:declare\s+)?type\s+(\w+)(?:\s*<[^=]*?>)?\s*=",
            )
            .expect("valid TS type pattern"),
            enum_decl: Regex::new(
                r"\b(?:export\s+)?(?:declare\s+)?(?:const\s+)?enum\s+(\w+)\s*\{",
            )
            .expect("valid TS enum pattern"),
        }
    }

    fn blocks(&self, source: &Source<'_>, re: &Regex, kind: DefinitionKind) -> Vec<CodeDefinition> {
        let text = source.text;
        re.captures_iter(text)
            .filter_map(|caps| {
                let m = caps.get(0)?;
                let name = caps.get(1)?;
                let start = match_start(&m);
                let open = m.end() - 1;
                let end = find_block_end(text, open, b'{', b'}');
                Some(
                    source
                        .define(name.as_str(), kind, start, end, &text[start..open])
                        .with_docstring(jsdoc(text, start)),
                )
            })
            .collect()
    }

    /// A type alias runs to its `;`, or up to the next definition when the
    /// semicolon is omitted. Object types end at their closing brace.
    fn type_aliases(&self, source: &Source<'_>) -> Vec<CodeDefinition> {
        let text = source.text;
        let [class, function, binding] = self.js.definition_patterns();
        let boundaries = [&self.type_alias, &self.interface, &self.enum_decl, class, function, binding];
        let mut aliases = Vec::new();

        for caps in self.type_alias.captures_iter(text) {
            let (Some(m), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let start = match_start(&m);
            let body = text[m.end()..].trim_start();
            let body_start = text.len() - body.len();

            let end = if body.starts_with('{') {
                find_block_end(text, body_start, b'{', b'}')
            } else {
                let next = find_next_definition(text, m.end(), &boundaries);
                match find_byte(text, m.end(), b';') {
                    Some(semi) if semi < next => semi + 1,
                    _ => next,
                }
            };

            let signature = text[start..end].trim().trim_end_matches(';');
            aliases.push(
                source
                    .define(name.as_str(), DefinitionKind::Type, start, end, signature)
                    .with_docstring(jsdoc(text, start)),
            );
        }

        aliases
    }
}

impl Default for TypeScriptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for TypeScriptParser {
    fn parse(&self, content: &str, file_path: &str) -> Vec<CodeDefinition> {
        let mut defs = self.js.parse(content, file_path);

        let source = Source::new(content, file_path);
        defs.extend(self.blocks(&source, &self.interface, DefinitionKind::Interface));
        defs.extend(self.type_aliases(&source));
        defs.extend(self.blocks(&source, &self.enum_decl, DefinitionKind::Enum));

        defs
    }

    fn language(&self) -> Language {
        Language::TypeScript
    }
}
