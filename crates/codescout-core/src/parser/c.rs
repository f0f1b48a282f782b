//! C parser.
//!
//! Extracts function definitions (with a body), structs and enums. Doc
//! comments are `/** ... */` blocks directly above the construct.

use regex::Regex;

use crate::definition::{CodeDefinition, DefinitionKind};

use super::language::Language;
use super::scan::{block_doc_before, find_block_end, match_start, Located, Source};
use super::traits::Parser;

/// Words that look like a return type or name in `else if (x) {` and friends.
pub(crate) const C_KEYWORDS: &[&str] = &[
    "if", "else", "while", "for", "switch", "return", "do", "sizeof", "case", "goto", "catch",
    "new", "delete", "throw",
];

/// Regex-based C parser.
pub struct CParser {
    function: Regex,
    record: Regex,
    typedef_name: Regex,
}

impl CParser {
    pub fn new() -> Self {
        Self {
            function: Regex::new(
                r"(?m)^[ \t]*(?:(?:static|extern|inline|const|volatile|unsigned|signed|struct|enum)\s+)*(\w+)(?:\s*\*+\s*|\s+)(\w+)\s*\(([^)]*)\)\s*\{",
            )
            .expect("valid C function pattern"),
            record: Regex::new(r"(?m)^[ \t]*(typedef\s+)?(struct|enum)\b\s*(\w*)\s*\{")
                .expect("valid C record pattern"),
            typedef_name: Regex::new(r"\A\s*(\w+)\s*;").expect("valid typedef name pattern"),
        }
    }

    /// Function definitions with their byte ranges.
    pub(crate) fn functions(&self, source: &Source<'_>) -> Vec<Located> {
        let text = source.text;
        let mut found = Vec::new();

        for caps in self.function.captures_iter(text) {
            let (Some(m), Some(ret), Some(name)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                continue;
            };
            if C_KEYWORDS.contains(&ret.as_str()) || C_KEYWORDS.contains(&name.as_str()) {
                continue;
            }

            let start = match_start(&m);
            let open = m.end() - 1;
            let end = find_block_end(text, open, b'{', b'}');
            let def = source
                .define(name.as_str(), DefinitionKind::Function, start, end, &text[start..open])
                .with_docstring(block_doc_before(text, start));
            found.push(Located::new(def, start, end));
        }

        found
    }

    /// Struct and enum definitions, optionally restricted to one keyword.
    pub(crate) fn records(&self, source: &Source<'_>, only: Option<&str>) -> Vec<Located> {
        let text = source.text;
        let mut found = Vec::new();

        for caps in self.record.captures_iter(text) {
            let (Some(m), Some(keyword)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            if only.is_some_and(|k| k != keyword.as_str()) {
                continue;
            }

            let start = match_start(&m);
            let open = m.end() - 1;
            let end = find_block_end(text, open, b'{', b'}');

            let mut name = caps
                .get(3)
                .map(|n| n.as_str().to_string())
                .filter(|n| !n.is_empty());
            if name.is_none() && caps.get(1).is_some() {
                name = self
                    .typedef_name
                    .captures(&text[end..])
                    .and_then(|c| c.get(1))
                    .map(|n| n.as_str().to_string());
            }
            let name = name.unwrap_or_else(|| "anonymous".to_string());

            let kind = if keyword.as_str() == "enum" {
                DefinitionKind::Enum
            } else {
                DefinitionKind::Struct
            };
            let def = source
                .define(name, kind, start, end, &text[start..open])
                .with_docstring(block_doc_before(text, start));
            found.push(Located::new(def, start, end));
        }

        found
    }
}

impl Default for CParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for CParser {
    fn parse(&self, content: &str, file_path: &str) -> Vec<CodeDefinition> {
        let source = Source::new(content, file_path);

        self.records(&source, None)
            .into_iter()
            .chain(self.functions(&source))
            .map(|found| found.def)
            .collect()
    }

    fn language(&self) -> Language {
        Language::C
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> Vec<CodeDefinition> {
        CParser::new().parse(code, "test.c")
    }

    #[test]
    fn test_parse_function() {
        let code = r#"
/**
 * Adds two integers.
 */
static int add(int a, int b) {
    return a + b;
}
"#;
        let defs = parse(code);
        assert_eq!(defs.len(), 1);
        let add = &defs[0];
        assert_eq!(add.name, "add");
        assert_eq!(add.kind, DefinitionKind::Function);
        assert_eq!(add.start_line, 5);
        assert_eq!(add.end_line, 7);
        assert_eq!(add.signature, "static int add(int a, int b)");
        assert_eq!(add.docstring.as_deref(), Some("Adds two integers."));
    }

    #[test]
    fn test_pointer_return_and_brace_on_next_line() {
        let code = "const char *name_of(int id)\n{\n    return names[id];\n}\n";
        let defs = parse(code);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "name_of");
        assert_eq!(defs[0].start_line, 1);
        assert_eq!(defs[0].end_line, 4);
    }

    #[test]
    fn test_control_flow_is_not_a_function() {
        let code = "int main(void) {\n    if (x) {\n    }\n    else if (y) {\n    }\n}\n";
        let defs = parse(code);
        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["main"]);
    }

    #[test]
    fn test_struct_and_enum() {
        let code = r#"
struct point {
    int x;
    int y;
};

enum color { RED, GREEN };
"#;
        let defs = parse(code);
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "point");
        assert_eq!(defs[0].kind, DefinitionKind::Struct);
        assert_eq!(defs[0].start_line, 2);
        assert_eq!(defs[0].end_line, 5);
        assert_eq!(defs[1].name, "color");
        assert_eq!(defs[1].kind, DefinitionKind::Enum);
    }

    #[test]
    fn test_anonymous_and_typedef_records() {
        let code = "typedef struct {\n    int id;\n} user_t;\n\nstruct {\n    int n;\n} counter;\n";
        let defs = parse(code);
        assert_eq!(defs[0].name, "user_t");
        assert_eq!(defs[1].name, "anonymous");
    }

    #[test]
    fn test_unterminated_function_runs_to_eof() {
        let code = "int broken(void) {\n    return 1;\n";
        let defs = parse(code);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].end_line, 2);
    }
}
