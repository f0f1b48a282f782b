//! Ruby parser.
//!
//! Classes and modules are containers; `def`s and `attr_*` declarations
//! inside them become members of the innermost one. Block ends come from
//! keyword balance rather than braces.

use regex::Regex;

use crate::definition::{CodeDefinition, DefinitionKind};

use super::language::Language;
use super::scan::{
    innermost_enclosing, line_comments_before, line_end, line_start, link_nested, match_start,
    Located, Source,
};
use super::traits::Parser;

/// Words that open a block when they lead a line.
const OPENERS: &[&str] = &[
    "class", "module", "def", "if", "unless", "case", "begin", "while", "until", "for",
];

/// Visibility prefixes allowed before `def` on the same line.
const VISIBILITY: &[&str] = &["private", "protected", "public", "module_function"];

/// Regex-based Ruby parser.
pub struct RubyParser {
    class: Regex,
    module: Regex,
    method: Regex,
    attr: Regex,
    do_keyword: Regex,
    end_keyword: Regex,
    assigned_block: Regex,
}

impl RubyParser {
    pub fn new() -> Self {
        Self {
            class: Regex::new(r"(?m)^[ \t]*class[ \t]+((?:\w+::)*\w+)(?:[ \t]*<[ \t]*[\w:.]+)?")
                .expect("valid Ruby class pattern"),
            module: Regex::new(r"(?m)^[ \t]*module[ \t]+((?:\w+::)*\w+)")
                .expect("valid Ruby module pattern"),
            method: Regex::new(
                r"(?m)^[ \t]*(?:(?:private|protected|public|module_function)[ \t]+)?def[ \t]+(self\.)?(\w+[?!=]?)(?:[ \t]*\([^)]*\))?",
            )
            .expect("valid Ruby def pattern"),
            attr: Regex::new(
                r"(?m)^[ \t]*attr_(?:reader|writer|accessor)[ \t]+(:\w+(?:[ \t]*,[ \t]*:\w+)*)",
            )
            .expect("valid Ruby attr pattern"),
            do_keyword: Regex::new(r"\bdo\b").expect("valid do pattern"),
            end_keyword: Regex::new(r"\bend\b").expect("valid end pattern"),
            assigned_block: Regex::new(r"=\s*(?:if|unless|case|begin)\b")
                .expect("valid assignment pattern"),
        }
    }

    /// Net number of blocks opened on one comment-free line.
    fn balance(&self, line: &str) -> i64 {
        let trimmed = line.trim_start();
        if trimmed.starts_with("=begin") || trimmed.starts_with("=end") {
            return 0;
        }

        let mut words = trimmed.split(|c: char| !(c.is_alphanumeric() || c == '_'));
        let mut first = words.next().unwrap_or("");
        if VISIBILITY.contains(&first) {
            first = words.find(|w| !w.is_empty()).unwrap_or("");
        }

        let mut opened = 0;
        if OPENERS.contains(&first) {
            opened += 1;
        }
        // `while x do` opens one block, not two.
        if !matches!(first, "while" | "until" | "for") {
            opened += self.do_keyword.find_iter(line).count() as i64;
        }
        opened += self.assigned_block.find_iter(line).count() as i64;

        opened - self.end_keyword.find_iter(line).count() as i64
    }

    /// Offset of the end of the line whose `end` closes the block opened on
    /// the line containing `start`. Unbalanced blocks run to the end of the
    /// text.
    fn block_end(&self, text: &str, start: usize) -> usize {
        let mut depth = 0;
        let mut pos = line_start(text, start);

        while pos < text.len() {
            let end = line_end(text, pos);
            depth += self.balance(strip_comment(&text[pos..end]));
            if depth <= 0 {
                return end;
            }
            pos = end + 1;
        }

        text.len()
    }

    fn containers(&self, source: &Source<'_>) -> Vec<Located> {
        let text = source.text;
        let mut found: Vec<Located> = [
            (&self.class, DefinitionKind::Class),
            (&self.module, DefinitionKind::Module),
        ]
        .into_iter()
        .flat_map(|(re, kind)| {
            re.captures_iter(text).filter_map(move |caps| {
                let m = caps.get(0)?;
                let name = caps.get(1)?;
                Some((kind, m, name.as_str().to_string()))
            })
        })
        .map(|(kind, m, name)| {
            let start = match_start(&m);
            let end = self.block_end(text, start);
            let def = source
                .define(name, kind, start, end, m.as_str())
                .with_docstring(docstring(text, start));
            Located::new(def, start, end)
        })
        .collect();

        found.sort_by_key(|c| c.start);
        link_nested(&mut found);
        found
    }
}

/// Line with any trailing `#` comment removed. Interpolation (`#{`) is kept.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'#' || bytes.get(i + 1) == Some(&b'{') {
            continue;
        }
        if i == 0 || bytes[i - 1].is_ascii_whitespace() {
            return &line[..i];
        }
    }
    line
}

fn docstring(text: &str, position: usize) -> Option<String> {
    line_comments_before(text, position, "#", &[])
}

impl Default for RubyParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for RubyParser {
    fn parse(&self, content: &str, file_path: &str) -> Vec<CodeDefinition> {
        let source = Source::new(content, file_path);
        let text = content;
        let mut containers = self.containers(&source);

        let mut methods: Vec<Vec<CodeDefinition>> = vec![Vec::new(); containers.len()];
        let mut functions = Vec::new();
        for caps in self.method.captures_iter(text) {
            let (Some(m), Some(name)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            let start = match_start(&m);
            let end = self.block_end(text, start);
            let def = source
                .define(name.as_str(), DefinitionKind::Method, start, end, m.as_str())
                .with_docstring(docstring(text, start));
            let def = if caps.get(1).is_some() {
                def.with_metadata("singleton", "true")
            } else {
                def
            };

            match innermost_enclosing(&containers, start) {
                Some(owner) => {
                    let owner_name = containers[owner].def.name.clone();
                    containers[owner].def.add_child(name.as_str());
                    methods[owner].push(def.with_parent(owner_name));
                }
                None => functions.push(CodeDefinition {
                    kind: DefinitionKind::Function,
                    ..def
                }),
            }
        }

        let mut attributes: Vec<Vec<CodeDefinition>> = vec![Vec::new(); containers.len()];
        for caps in self.attr.captures_iter(text) {
            let (Some(m), Some(list)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let start = match_start(&m);
            let Some(owner) = innermost_enclosing(&containers, start) else {
                continue;
            };
            let owner_name = containers[owner].def.name.clone();
            for name in list.as_str().split(',') {
                let name = name.trim().trim_start_matches(':');
                if name.is_empty() {
                    continue;
                }
                containers[owner].def.add_child(name);
                attributes[owner].push(
                    source
                        .define(name, DefinitionKind::Attribute, start, m.end(), m.as_str())
                        .with_parent(owner_name.clone()),
                );
            }
        }

        let mut defs = Vec::new();
        for ((container, methods), attributes) in containers.into_iter().zip(methods).zip(attributes) {
            defs.push(container.def);
            defs.extend(methods);
            defs.extend(attributes);
        }
        defs.extend(functions);
        defs
    }

    fn language(&self) -> Language {
        Language::Ruby
    }
}
