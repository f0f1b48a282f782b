//! Go parser.
//!
//! Struct and interface type declarations, top-level functions, and methods.
//! A method's parent is its receiver type with any pointer and type
//! parameters stripped; when that type is declared in the same file it lists
//! the method among its children.

use regex::Regex;

use crate::definition::{CodeDefinition, DefinitionKind};

use super::language::Language;
use super::scan::{
    block_doc_before, find_block_end, line_comments_before, match_start, Source,
};
use super::traits::Parser;

/// Regex-based Go parser.
pub struct GoParser {
    type_decl: Regex,
    function: Regex,
    method: Regex,
}

impl GoParser {
    pub fn new() -> Self {
        Self {
            type_decl: Regex::new(
                r"(?m)^[ \t]*type\s+(\w+)(?:\[[^\]]*\])?\s+(struct|interface)\s*\{",
            )
            .expect("valid Go type pattern"),
            function: Regex::new(
                r"(?m)^func\s+(\w+)(?:\[[^\]]*\])?\s*\(([^)]*)\)[^{\n]*\{",
            )
            .expect("valid Go function pattern"),
            method: Regex::new(
                r"(?m)^func\s+\(([^)]*)\)\s*(\w+)(?:\[[^\]]*\])?\s*\(([^)]*)\)[^{\n]*\{",
            )
            .expect("valid Go method pattern"),
        }
    }

    fn docstring(text: &str, position: usize) -> Option<String> {
        line_comments_before(text, position, "//", &[]).or_else(|| block_doc_before(text, position))
    }
}

/// Receiver type name: last token, without `*` or type parameters.
fn receiver_type(receiver: &str) -> Option<String> {
    let token = receiver.split_whitespace().last()?;
    let token = token.trim_start_matches('*');
    let token = token.split('[').next().unwrap_or(token);
    (!token.is_empty()).then(|| token.to_string())
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for GoParser {
    fn parse(&self, content: &str, file_path: &str) -> Vec<CodeDefinition> {
        let source = Source::new(content, file_path);
        let text = content;

        let mut types = Vec::new();
        for caps in self.type_decl.captures_iter(text) {
            let (Some(m), Some(name), Some(keyword)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                continue;
            };
            let start = match_start(&m);
            let open = m.end() - 1;
            let end = find_block_end(text, open, b'{', b'}');
            let kind = if keyword.as_str() == "struct" {
                DefinitionKind::Struct
            } else {
                DefinitionKind::Interface
            };
            types.push(
                source
                    .define(name.as_str(), kind, start, end, &text[start..open])
                    .with_docstring(Self::docstring(text, start)),
            );
        }

        let mut functions = Vec::new();
        for caps in self.function.captures_iter(text) {
            let (Some(m), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let start = m.start();
            let open = m.end() - 1;
            let end = find_block_end(text, open, b'{', b'}');
            functions.push(
                source
                    .define(name.as_str(), DefinitionKind::Function, start, end, &text[start..open])
                    .with_docstring(Self::docstring(text, start)),
            );
        }

        let mut methods = Vec::new();
        for caps in self.method.captures_iter(text) {
            let (Some(m), Some(receiver), Some(name)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                continue;
            };
            let start = m.start();
            let open = m.end() - 1;
            let end = find_block_end(text, open, b'{', b'}');
            let mut method = source
                .define(name.as_str(), DefinitionKind::Method, start, end, &text[start..open])
                .with_docstring(Self::docstring(text, start));

            if let Some(owner) = receiver_type(receiver.as_str()) {
                if let Some(ty) = types.iter_mut().find(|t| t.name == owner) {
                    ty.add_child(name.as_str());
                }
                method = method.with_parent(owner);
            }
            methods.push(method);
        }

        types.into_iter().chain(functions).chain(methods).collect()
    }

    fn language(&self) -> Language {
        Language::Go
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> Vec<CodeDefinition> {
        GoParser::new().parse(code, "main.go")
    }

    #[test]
    fn test_parse_function() {
        let code = "func Add(a, b int) int {\n\treturn a + b\n}\n";
        let defs = parse(code);
        assert_eq!(defs.len(), 1);
        let add = &defs[0];
        assert_eq!(add.name, "Add");
        assert_eq!(add.kind, DefinitionKind::Function);
        assert_eq!(add.start_line, 1);
        assert_eq!(add.end_line, 3);
        assert_eq!(add.signature, "func Add(a, b int) int");
    }

    #[test]
    fn test_struct_with_methods() {
        let code = r#"package store

// Store keeps items.
// It is safe for one goroutine.
type Store struct {
	items map[string]int
}

// Get returns an item.
func (s *Store) Get(key string) (int, bool) {
	v, ok := s.items[key]
	return v, ok
}

func (s Store) Len() int { return len(s.items) }

type Reader interface {
	Read(p []byte) (int, error)
}
"#;
        let defs = parse(code);

        let store = &defs[0];
        assert_eq!(store.name, "Store");
        assert_eq!(store.kind, DefinitionKind::Struct);
        assert_eq!((store.start_line, store.end_line), (5, 7));
        assert_eq!(
            store.docstring.as_deref(),
            Some("Store keeps items.\nIt is safe for one goroutine.")
        );
        assert_eq!(store.children, vec!["Get", "Len"]);

        let reader = &defs[1];
        assert_eq!(reader.kind, DefinitionKind::Interface);

        let get = defs.iter().find(|d| d.name == "Get").unwrap();
        assert_eq!(get.kind, DefinitionKind::Method);
        assert_eq!(get.parent.as_deref(), Some("Store"));
        assert_eq!((get.start_line, get.end_line), (10, 13));
        assert_eq!(get.docstring.as_deref(), Some("Get returns an item."));

        let len = defs.iter().find(|d| d.name == "Len").unwrap();
        assert_eq!((len.start_line, len.end_line), (15, 15));
    }

    #[test]
    fn test_receiver_type() {
        assert_eq!(receiver_type("s *Store"), Some("Store".to_string()));
        assert_eq!(receiver_type("l *List[T]"), Some("List".to_string()));
        assert_eq!(receiver_type("Point"), Some("Point".to_string()));
        assert_eq!(receiver_type("  "), None);
    }

    #[test]
    fn test_generic_function() {
        let code = "func Map[T, U any](xs []T, f func(T) U) []U {\n\treturn nil\n}\n";
        let defs = parse(code);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "Map");
        assert_eq!(defs[0].end_line, 3);
    }
}
