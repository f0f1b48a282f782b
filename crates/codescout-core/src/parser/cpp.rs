//! C++ parser, layered on the C parser.
//!
//! Reuses C function and enum extraction, then adds classes and structs with
//! their in-body methods, out-of-line `Class::method` definitions, scoped
//! enums and namespaces. C functions that sit inside a class body are
//! reported as methods of that class instead.

use regex::Regex;

use crate::definition::{CodeDefinition, DefinitionKind};

use super::c::{CParser, C_KEYWORDS};
use super::language::Language;
use super::scan::{block_doc_before, find_block_end, match_start, Located, Region, Source};
use super::traits::Parser;

/// Regex-based C++ parser.
pub struct CppParser {
    c: CParser,
    class: Regex,
    scoped_enum: Regex,
    namespace: Regex,
    member: Regex,
    qualified_method: Regex,
}

impl CppParser {
    pub fn new() -> Self {
        Self {
            c: CParser::new(),
            class: Regex::new(
                r"(?m)^[ \t]*(?:template\s*<[^>]*>\s*)?(class|struct)\s+(\w+)(?:\s+final)?(?:\s*:\s*[^{;]+)?\s*\{",
            )
            .expect("valid C++ class pattern"),
            scoped_enum: Regex::new(r"(?m)^[ \t]*enum\s+(?:class|struct)\s+(\w+)(?:\s*:\s*\w+)?\s*\{")
                .expect("valid C++ enum pattern"),
            namespace: Regex::new(r"\bnamespace\s+(\w+(?:::\w+)*)\s*\{")
                .expect("valid C++ namespace pattern"),
            member: Regex::new(
                r"(?m)^[ \t]*(?:(?:virtual|static|inline|explicit|constexpr|friend)\s+)*(?:[\w:<>,]+[ \t*&]+)?(~?\w+)\s*\(([^)]*)\)[^;{}]*\{",
            )
            .expect("valid C++ member pattern"),
            qualified_method: Regex::new(
                r"(?m)^[ \t]*(?:(?:static|inline|virtual|constexpr)\s+)*(?:[\w:<>,]+[ \t*&]+)?(\w+)::(~?\w+)\s*\(([^)]*)\)[^;{}]*\{",
            )
            .expect("valid C++ qualified method pattern"),
        }
    }

    fn classes(&self, source: &Source<'_>) -> Vec<Located> {
        let text = source.text;
        let mut classes = Vec::new();

        for caps in self.class.captures_iter(text) {
            let (Some(m), Some(keyword), Some(name)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                continue;
            };
            let start = match_start(&m);
            let open = m.end() - 1;
            let end = find_block_end(text, open, b'{', b'}');
            let kind = if keyword.as_str() == "class" {
                DefinitionKind::Class
            } else {
                DefinitionKind::Struct
            };
            let def = source
                .define(name.as_str(), kind, start, end, &text[start..open])
                .with_docstring(block_doc_before(text, start));
            classes.push(Located::new(def, start, end));
        }

        classes
    }

    fn members(&self, source: &Source<'_>, class: &mut Located) -> Vec<CodeDefinition> {
        let text = source.text;
        let region = Region::new(text, class.start, class.end);
        let mut methods = Vec::new();

        for caps in self.member.captures_iter(region.text) {
            let (Some(m), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if !region.is_member_position(m.start()) || C_KEYWORDS.contains(&name.as_str()) {
                continue;
            }

            let start = region.absolute(match_start(&m));
            let open = region.absolute(m.end() - 1);
            let end = find_block_end(text, open, b'{', b'}');
            let method = source
                .define(name.as_str(), DefinitionKind::Method, start, end, &text[start..open])
                .with_docstring(block_doc_before(text, start))
                .with_parent(class.def.name.clone());
            class.def.add_child(name.as_str());
            methods.push(method);
        }

        methods
    }

    fn qualified_methods(&self, source: &Source<'_>, classes: &mut [Located]) -> Vec<CodeDefinition> {
        let text = source.text;
        let mut methods = Vec::new();

        for caps in self.qualified_method.captures_iter(text) {
            let (Some(m), Some(owner), Some(name)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                continue;
            };
            let start = match_start(&m);
            let open = m.end() - 1;
            let end = find_block_end(text, open, b'{', b'}');
            let method = source
                .define(name.as_str(), DefinitionKind::Method, start, end, &text[start..open])
                .with_docstring(block_doc_before(text, start))
                .with_parent(owner.as_str());

            if let Some(class) = classes.iter_mut().find(|c| c.def.name == owner.as_str()) {
                class.def.add_child(name.as_str());
            }
            methods.push(method);
        }

        methods
    }

    fn simple_blocks(&self, source: &Source<'_>, re: &Regex, kind: DefinitionKind) -> Vec<CodeDefinition> {
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
                        .with_docstring(block_doc_before(text, start)),
                )
            })
            .collect()
    }
}

impl Default for CppParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for CppParser {
    fn parse(&self, content: &str, file_path: &str) -> Vec<CodeDefinition> {
        let source = Source::new(content, file_path);
        let mut classes = self.classes(&source);

        let mut members = Vec::new();
        for class in classes.iter_mut() {
            members.push(self.members(&source, class));
        }
        let qualified = self.qualified_methods(&source, &mut classes);

        let mut defs = Vec::new();
        defs.extend(self.c.records(&source, Some("enum")).into_iter().map(|e| e.def));
        defs.extend(self.simple_blocks(&source, &self.scoped_enum, DefinitionKind::Enum));
        defs.extend(self.simple_blocks(&source, &self.namespace, DefinitionKind::Namespace));

        let functions: Vec<Located> = self
            .c
            .functions(&source)
            .into_iter()
            .filter(|f| !classes.iter().any(|c| c.contains(f.start)))
            .collect();

        for (class, methods) in classes.into_iter().zip(members) {
            defs.push(class.def);
            defs.extend(methods);
        }
        defs.extend(qualified);
        defs.extend(functions.into_iter().map(|f| f.def));

        defs
    }

    fn language(&self) -> Language {
        Language::Cpp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> Vec<CodeDefinition> {
        CppParser::new().parse(code, "test.cpp")
    }

    fn find<'a>(defs: &'a [CodeDefinition], name: &str) -> &'a CodeDefinition {
        defs.iter()
            .find(|d| d.name == name)
            .unwrap_or_else(|| panic!("no definition named {}", name))
    }

    #[test]
    fn test_class_with_inline_methods() {
        let code = r#"
class Shape : public Drawable {
public:
    Shape(int sides) : sides_(sides) {}
    virtual ~Shape() {}
    int sides() const {
        if (sides_ > 0) {
            return sides_;
        }
        return 0;
    }
private:
    int sides_;
};
"#;
        let defs = parse(code);
        let shape = find(&defs, "Shape");
        assert_eq!(shape.kind, DefinitionKind::Class);
        assert_eq!(shape.start_line, 2);
        assert_eq!(shape.end_line, 14);
        assert_eq!(shape.children, vec!["Shape", "~Shape", "sides"]);

        let sides = defs.iter().find(|d| d.name == "sides").unwrap();
        assert_eq!(sides.kind, DefinitionKind::Method);
        assert_eq!(sides.parent.as_deref(), Some("Shape"));
        assert_eq!(sides.start_line, 6);
        assert_eq!(sides.end_line, 11);
        assert!(defs.iter().all(|d| d.kind != DefinitionKind::Function));
    }

    #[test]
    fn test_out_of_line_method() {
        let code = r#"
class Counter {
public:
    void bump();
};

void Counter::bump() {
    count_++;
}

int helper(int x) {
    return x;
}
"#;
        let defs = parse(code);
        let bump = find(&defs, "bump");
        assert_eq!(bump.kind, DefinitionKind::Method);
        assert_eq!(bump.parent.as_deref(), Some("Counter"));
        assert_eq!(bump.start_line, 7);
        assert_eq!(find(&defs, "Counter").children, vec!["bump"]);
        assert_eq!(find(&defs, "helper").kind, DefinitionKind::Function);
    }

    #[test]
    fn test_namespace_and_scoped_enum() {
        let code = r#"
namespace geo {
enum class Axis : int { X, Y };
struct Point {
    int x;
};
}
"#;
        let defs = parse(code);
        let ns = find(&defs, "geo");
        assert_eq!(ns.kind, DefinitionKind::Namespace);
        assert_eq!(ns.start_line, 2);
        assert_eq!(ns.end_line, 7);
        assert_eq!(find(&defs, "Axis").kind, DefinitionKind::Enum);
        assert_eq!(find(&defs, "Point").kind, DefinitionKind::Struct);
        assert_eq!(defs.iter().filter(|d| d.name == "Point").count(), 1);
    }
}
