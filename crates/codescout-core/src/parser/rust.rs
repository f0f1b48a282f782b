//! Rust parser.
//!
//! Extracts modules, structs, enums, traits, impl blocks, top-level
//! functions, constants, statics and type aliases. Trait and impl members
//! are reported as methods. Doc comments (`///` or `/** */`) become
//! docstrings; attribute lines between the doc and the item are skipped.

use regex::Regex;

use crate::definition::{CodeDefinition, DefinitionKind};

use super::language::Language;
use super::scan::{
    body_open, doc_before, find_block_end, find_byte, is_inside_block, match_start,
    statement_end, terminator, Region, Source,
};
use super::traits::Parser;

const ATTRIBUTE_PREFIXES: &[&str] = &["#["];

/// Regex-based Rust parser.
pub struct RustParser {
    module: Regex,
    structure: Regex,
    enumeration: Regex,
    trait_decl: Regex,
    implementation: Regex,
    function: Regex,
    constant: Regex,
    static_item: Regex,
    type_alias: Regex,
}

impl RustParser {
    pub fn new() -> Self {
        let vis = r"(?:pub(?:\s*\([^)]*\))?\s+)?";
        let compile = |pattern: String| Regex::new(&pattern).expect("valid Rust pattern");

        Self {
            module: compile(format!(r"\b{vis}mod\s+(\w+)\s*([{{;])")),
            structure: compile(format!(r"\b{vis}struct\s+(\w+)")),
            enumeration: compile(format!(r"\b{vis}enum\s+(\w+)")),
            trait_decl: compile(format!(r"\b{vis}(?:unsafe\s+)?(?:auto\s+)?trait\s+(\w+)")),
            implementation: compile(
                r"(?m)^[ \t]*(?:unsafe\s+)?impl\b(?:\s*<[^{]*?>)?\s+(?:!?(?:\w+::)*(\w+)(?:<[^{]*?>)?\s+for\s+&?(?:'\w+\s+)?(?:mut\s+)?(?:\w+::)*(\w+)|&?(?:'\w+\s+)?(?:mut\s+)?(?:\w+::)*(\w+))"
                    .to_string(),
            ),
            function: compile(format!(
                r#"\b{vis}(?:default\s+)?(?:(?:const|async|unsafe|extern(?:\s+"[^"]*")?)\s+)*fn\s+(\w+)(?:\s*<.*?>)?\s*\("#
            )),
            constant: compile(format!(r"\b{vis}const\s+(\w+)\s*:")),
            static_item: compile(format!(r"\b{vis}static\s+(?:mut\s+)?(\w+)\s*:")),
            type_alias: compile(format!(r"\b{vis}type\s+(\w+)(?:\s*<[^=;]*>)?\s*=")),
        }
    }

    fn doc(text: &str, position: usize) -> Option<String> {
        doc_before(text, position, "///", ATTRIBUTE_PREFIXES)
    }

    fn modules(&self, source: &Source<'_>) -> Vec<CodeDefinition> {
        let text = source.text;
        let mut modules = Vec::new();

        for caps in self.module.captures_iter(text) {
            let (Some(m), Some(name), Some(delim)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                continue;
            };
            let start = match_start(&m);
            let end = if delim.as_str() == "{" {
                find_block_end(text, delim.start(), b'{', b'}')
            } else {
                delim.end()
            };
            modules.push(
                source
                    .define(name.as_str(), DefinitionKind::Module, start, end, &text[start..delim.start()])
                    .with_docstring(Self::doc(text, start)),
            );
        }

        modules
    }

    /// Structs may be braced, tuple (`struct A(u8);`) or unit (`struct A;`).
    fn structs(&self, source: &Source<'_>) -> Vec<CodeDefinition> {
        let text = source.text;
        let mut structs = Vec::new();

        for caps in self.structure.captures_iter(text) {
            let (Some(m), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let start = match_start(&m);
            let (header_end, end) = match body_open(text, m.end()) {
                Some(open) => (open, find_block_end(text, open, b'{', b'}')),
                None => match find_byte(text, m.end(), b';') {
                    Some(semi) => (semi, semi + 1),
                    None => continue,
                },
            };
            structs.push(
                source
                    .define(name.as_str(), DefinitionKind::Struct, start, end, &text[start..header_end])
                    .with_docstring(Self::doc(text, start)),
            );
        }

        structs
    }

    fn enums(&self, source: &Source<'_>) -> Vec<CodeDefinition> {
        let text = source.text;
        self.enumeration
            .captures_iter(text)
            .filter_map(|caps| {
                let m = caps.get(0)?;
                let name = caps.get(1)?;
                let start = match_start(&m);
                let open = body_open(text, m.end())?;
                let end = find_block_end(text, open, b'{', b'}');
                Some(
                    source
                        .define(name.as_str(), DefinitionKind::Enum, start, end, &text[start..open])
                        .with_docstring(Self::doc(text, start)),
                )
            })
            .collect()
    }

    fn traits(&self, source: &Source<'_>) -> Vec<CodeDefinition> {
        let text = source.text;
        let mut defs = Vec::new();

        for caps in self.trait_decl.captures_iter(text) {
            let (Some(m), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let start = match_start(&m);
            let Some(open) = body_open(text, m.end()) else {
                continue;
            };
            let end = find_block_end(text, open, b'{', b'}');

            let mut trait_def = source
                .define(name.as_str(), DefinitionKind::Trait, start, end, &text[start..open])
                .with_docstring(Self::doc(text, start));
            let methods = self.members(source, Region::new(text, start, end), name.as_str(), true);
            for method in &methods {
                trait_def.add_child(method.name.clone());
            }

            defs.push(trait_def);
            defs.extend(methods);
        }

        defs
    }

    fn impls(&self, source: &Source<'_>) -> Vec<CodeDefinition> {
        let text = source.text;
        let mut defs = Vec::new();

        for caps in self.implementation.captures_iter(text) {
            let Some(m) = caps.get(0) else {
                continue;
            };
            let (name, type_name, is_trait_impl) = match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(tr), Some(ty), _) => (format!("{} for {}", tr.as_str(), ty.as_str()), ty.as_str(), true),
                (_, _, Some(ty)) => (ty.as_str().to_string(), ty.as_str(), false),
                _ => continue,
            };

            let start = match_start(&m);
            let Some(open) = body_open(text, m.end()) else {
                continue;
            };
            let end = find_block_end(text, open, b'{', b'}');

            let mut impl_def = source
                .define(name, DefinitionKind::Implementation, start, end, &text[start..open])
                .with_docstring(Self::doc(text, start));
            if is_trait_impl {
                impl_def = impl_def.with_parent(type_name);
            }
            let methods = self.members(source, Region::new(text, start, end), type_name, false);
            for method in &methods {
                impl_def.add_child(method.name.clone());
            }

            defs.push(impl_def);
            defs.extend(methods);
        }

        defs
    }

    /// Functions directly inside a trait or impl body. Signatures without a
    /// body are kept only for traits.
    fn members(
        &self,
        source: &Source<'_>,
        region: Region<'_>,
        parent: &str,
        allow_signatures: bool,
    ) -> Vec<CodeDefinition> {
        let text = source.text;
        let mut methods = Vec::new();

        for caps in self.function.captures_iter(region.text) {
            let (Some(m), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if !region.is_member_position(m.start()) {
                continue;
            }

            let start = region.absolute(match_start(&m));
            let paren = region.absolute(m.end() - 1);
            let (header_end, end) = match terminator(text, paren) {
                Some((open, b'{')) => (open, find_block_end(text, open, b'{', b'}')),
                Some((semi, _)) if allow_signatures => (semi, semi + 1),
                _ => continue,
            };

            methods.push(
                source
                    .define(name.as_str(), DefinitionKind::Method, start, end, &text[start..header_end])
                    .with_docstring(Self::doc(text, start))
                    .with_parent(parent),
            );
        }

        methods
    }

    fn functions(&self, source: &Source<'_>) -> Vec<CodeDefinition> {
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
            let (header_end, end) = match terminator(text, m.end() - 1) {
                Some((open, b'{')) => (open, find_block_end(text, open, b'{', b'}')),
                Some((semi, _)) => (semi, semi + 1),
                None => continue,
            };

            functions.push(
                source
                    .define(name.as_str(), DefinitionKind::Function, start, end, &text[start..header_end])
                    .with_docstring(Self::doc(text, start)),
            );
        }

        functions
    }

    /// Top-level items that end at their `;`: constants, statics, type aliases.
    fn items(&self, source: &Source<'_>, re: &Regex, kind: DefinitionKind) -> Vec<CodeDefinition> {
        let text = source.text;
        re.captures_iter(text)
            .filter_map(|caps| {
                let m = caps.get(0)?;
                let name = caps.get(1)?;
                let start = match_start(&m);
                if is_inside_block(text, start) {
                    return None;
                }
                let end = statement_end(text, m.end());
                let signature = text[start..end].trim().trim_end_matches(';');
                Some(
                    source
                        .define(name.as_str(), kind, start, end, signature)
                        .with_docstring(Self::doc(text, start)),
                )
            })
            .collect()
    }
}

impl Default for RustParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for RustParser {
    fn parse(&self, content: &str, file_path: &str) -> Vec<CodeDefinition> {
        let source = Source::new(content, file_path);
        let mut defs = Vec::new();

        defs.extend(self.modules(&source));
        defs.extend(self.structs(&source));
        defs.extend(self.enums(&source));
        defs.extend(self.traits(&source));
        defs.extend(self.impls(&source));
        defs.extend(self.functions(&source));
        defs.extend(self.items(&source, &self.constant, DefinitionKind::Constant));
        defs.extend(self.items(&source, &self.static_item, DefinitionKind::Static));
        defs.extend(self.items(&source, &self.type_alias, DefinitionKind::Type));

        defs
    }

    fn language(&self) -> Language {
        Language::Rust
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> Vec<CodeDefinition> {
        RustParser::new().parse(code, "lib.rs")
    }

    fn find<'a>(defs: &'a [CodeDefinition], name: &str) -> &'a CodeDefinition {
        defs.iter()
            .find(|d| d.name == name)
            .unwrap_or_else(|| panic!("no definition named {}", name))
    }

    #[test]
    fn test_single_line_impl() {
        let defs = parse("impl Foo { fn bar() {} }");
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "Foo");
        assert_eq!(defs[0].kind, DefinitionKind::Implementation);
        assert_eq!(defs[0].children, vec!["bar"]);
        assert_eq!(defs[1].name, "bar");
        assert_eq!(defs[1].kind, DefinitionKind::Method);
        assert_eq!(defs[1].parent.as_deref(), Some("Foo"));
    }

    #[test]
    fn test_parse_items() {
        let code = r#"
/// A point in space.
#[derive(Debug, Clone)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

pub struct Meters(pub f64);

pub enum Shape {
    Circle { r: f64 },
    Square(f64),
}

/// Adds one.
pub fn add_one(x: i32) -> i32 {
    x + 1
}

pub const LIMIT: usize = 10;
static mut COUNTER: u32 = 0;
pub type Result<T> = std::result::Result<T, Error>;
mod util;
"#;
        let defs = parse(code);

        let point = find(&defs, "Point");
        assert_eq!(point.kind, DefinitionKind::Struct);
        assert_eq!((point.start_line, point.end_line), (4, 7));
        assert_eq!(point.docstring.as_deref(), Some("A point in space."));

        let meters = find(&defs, "Meters");
        assert_eq!((meters.start_line, meters.end_line), (9, 9));

        let shape = find(&defs, "Shape");
        assert_eq!(shape.kind, DefinitionKind::Enum);
        assert_eq!((shape.start_line, shape.end_line), (11, 14));

        let add_one = find(&defs, "add_one");
        assert_eq!(add_one.kind, DefinitionKind::Function);
        assert_eq!(add_one.signature, "pub fn add_one(x: i32) -> i32");
        assert_eq!(add_one.docstring.as_deref(), Some("Adds one."));
        assert_eq!((add_one.start_line, add_one.end_line), (17, 19));

        let limit = find(&defs, "LIMIT");
        assert_eq!(limit.kind, DefinitionKind::Constant);
        assert_eq!(limit.signature, "pub const LIMIT: usize = 10");

        assert_eq!(find(&defs, "COUNTER").kind, DefinitionKind::Static);
        assert_eq!(find(&defs, "Result").kind, DefinitionKind::Type);

        let util = find(&defs, "util");
        assert_eq!(util.kind, DefinitionKind::Module);
        assert_eq!((util.start_line, util.end_line), (24, 24));
    }

    #[test]
    fn test_trait_with_signatures_and_defaults() {
        let code = r#"
pub trait Store: Send {
    fn get(&self, key: &str) -> Option<String>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
"#;
        let defs = parse(code);
        let store = find(&defs, "Store");
        assert_eq!(store.kind, DefinitionKind::Trait);
        assert_eq!(store.children, vec!["get", "contains"]);

        let get = find(&defs, "get");
        assert_eq!(get.parent.as_deref(), Some("Store"));
        assert_eq!((get.start_line, get.end_line), (3, 3));

        let contains = find(&defs, "contains");
        assert_eq!((contains.start_line, contains.end_line), (5, 7));
        assert!(defs.iter().all(|d| d.kind != DefinitionKind::Function));
    }

    #[test]
    fn test_trait_impl_naming() {
        let code = r#"
impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl<T: Clone> Stack<T> {
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }
}
"#;
        let defs = parse(code);
        let display = find(&defs, "Display for Point");
        assert_eq!(display.kind, DefinitionKind::Implementation);
        assert_eq!(display.parent.as_deref(), Some("Point"));
        assert_eq!(display.children, vec!["fmt"]);
        assert_eq!(find(&defs, "fmt").parent.as_deref(), Some("Point"));

        let stack = find(&defs, "Stack");
        assert!(stack.parent.is_none());
        assert_eq!(stack.children, vec!["push"]);
        assert_eq!(find(&defs, "push").parent.as_deref(), Some("Stack"));
    }

    #[test]
    fn test_impl_trait_return_is_not_an_impl_block() {
        let code = "fn evens() -> impl Iterator<Item = u32> {\n    (0..10).filter(|n| n % 2 == 0)\n}\n";
        let defs = parse(code);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].kind, DefinitionKind::Function);
    }

    #[test]
    fn test_inline_module_and_nested_items() {
        let code = "mod inner {\n    pub fn hidden() {}\n    const X: u8 = 1;\n}\n";
        let defs = parse(code);
        let inner = find(&defs, "inner");
        assert_eq!((inner.start_line, inner.end_line), (1, 4));
        assert_eq!(defs.len(), 1);
    }
}
