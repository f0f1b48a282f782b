//! Python parser.
//!
//! Blocks are delimited by indentation: a class or function body runs until
//! the next code line indented no deeper than its header. Methods are the
//! `def`s sitting at a class body's own indentation; nested classes are
//! linked to the class enclosing them. Only column-zero `def`s are reported
//! as functions. Docstrings are triple-quoted string literals opening the
//! body.

use regex::Regex;

use crate::definition::{CodeDefinition, DefinitionKind};

use super::language::Language;
use super::scan::{
    extract_docstring, find_block_end, find_byte, innermost_enclosing, line_end, link_nested,
    Located, Source,
};
use super::traits::Parser;

/// Regex-based Python parser.
pub struct PythonParser {
    class: Regex,
    function: Regex,
    docstring: Regex,
}

/// A `class` or `def` header with the extent of its block.
struct Block {
    name: String,
    indent: usize,
    start: usize,
    header_end: usize,
    end: usize,
    is_async: bool,
}

impl PythonParser {
    pub fn new() -> Self {
        Self {
            class: Regex::new(r"(?m)^([ \t]*)class\s+(\w+)\s*(?:\(([^)]*)\))?\s*:")
                .expect("valid Python class pattern"),
            function: Regex::new(r"(?m)^([ \t]*)(async\s+)?def\s+(\w+)\s*\(")
                .expect("valid Python def pattern"),
            docstring: Regex::new(
                r#"(?s)\A\s*[rRuUbBfF]{0,2}(?:"""(.*?)"""|'''(.*?)''')"#,
            )
            .expect("valid Python docstring pattern"),
        }
    }

    fn classes(&self, text: &str) -> Vec<Block> {
        self.class
            .captures_iter(text)
            .filter_map(|caps| {
                let m = caps.get(0)?;
                let indent = caps.get(1)?.as_str().len();
                let name = caps.get(2)?.as_str().to_string();
                let header_end = m.end();
                Some(Block {
                    name,
                    indent,
                    start: m.start() + indent,
                    header_end,
                    end: block_end(text, header_end, indent),
                    is_async: false,
                })
            })
            .collect()
    }

    fn functions(&self, text: &str) -> Vec<Block> {
        self.function
            .captures_iter(text)
            .filter_map(|caps| {
                let m = caps.get(0)?;
                let indent = caps.get(1)?.as_str().len();
                let name = caps.get(3)?.as_str().to_string();
                let header_end = def_header_end(text, m.end() - 1)?;
                Some(Block {
                    name,
                    indent,
                    start: m.start() + indent,
                    header_end,
                    end: block_end(text, header_end, indent),
                    is_async: caps.get(2).is_some(),
                })
            })
            .collect()
    }

    fn define(&self, source: &Source<'_>, block: &Block, kind: DefinitionKind) -> CodeDefinition {
        let text = source.text;
        let signature = text[block.start..block.header_end].trim_end_matches(':');
        let body = &text[block.header_end..block.end.max(block.header_end)];
        let def = source
            .define(block.name.clone(), kind, block.start, block.end, signature)
            .with_docstring(extract_docstring(body, &self.docstring, body.len()));
        if block.is_async {
            def.with_metadata("async", "true")
        } else {
            def
        }
    }
}

/// Offset just past the `:` closing a `def` header whose parameter list
/// opens at `paren`.
fn def_header_end(text: &str, paren: usize) -> Option<usize> {
    let close = find_block_end(text, paren, b'(', b')');
    find_byte(text, close, b':').map(|colon| colon + 1)
}

/// End of the block whose header ends at `header_end` and starts at column
/// `indent`. A body on the header line itself ends with that line.
fn block_end(text: &str, header_end: usize, indent: usize) -> usize {
    let header_line_end = line_end(text, header_end);
    let inline = text[header_end..header_line_end].trim();
    if !inline.is_empty() && !inline.starts_with('#') {
        return header_line_end;
    }

    let mut end = header_line_end;
    let mut pos = header_line_end;
    while pos < text.len() {
        let next_start = pos + 1;
        let next_end = line_end(text, next_start);
        let line = &text[next_start.min(next_end)..next_end];
        pos = next_end;

        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if line.len() - trimmed.len() <= indent {
            break;
        }
        end = next_end;
    }
    end
}

/// Indentation of the first code line after `header_end`.
fn body_indent(text: &str, header_end: usize, end: usize) -> Option<usize> {
    text[header_end..end]
        .lines()
        .skip(1)
        .find(|line| {
            let trimmed = line.trim_start();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|line| line.len() - line.trim_start().len())
}

impl Default for PythonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for PythonParser {
    fn parse(&self, content: &str, file_path: &str) -> Vec<CodeDefinition> {
        let source = Source::new(content, file_path);
        let classes = self.classes(content);
        let functions = self.functions(content);

        let mut located: Vec<Located> = classes
            .iter()
            .map(|c| Located::new(self.define(&source, c, DefinitionKind::Class), c.start, c.end))
            .collect();

        link_nested(&mut located);

        let mut members: Vec<Vec<CodeDefinition>> = vec![Vec::new(); classes.len()];
        let body_indents: Vec<Option<usize>> = classes
            .iter()
            .map(|c| body_indent(content, c.header_end, c.end))
            .collect();

        let mut top_level = Vec::new();
        for function in &functions {
            if function.indent == 0 {
                top_level.push(self.define(&source, function, DefinitionKind::Function));
                continue;
            }

            let Some(owner) = innermost_enclosing(&located, function.start) else {
                continue;
            };
            if body_indents[owner] != Some(function.indent) {
                continue;
            }
            let owner_name = located[owner].def.name.clone();
            located[owner].def.add_child(function.name.clone());
            members[owner].push(
                self.define(&source, function, DefinitionKind::Method)
                    .with_parent(owner_name),
            );
        }

        let mut defs = Vec::new();
        for (class, methods) in located.into_iter().zip(members) {
            defs.push(class.def);
            defs.extend(methods);
        }
        defs.extend(top_level);
        defs
    }

    fn language(&self) -> Language {
        Language::Python
    }
}
