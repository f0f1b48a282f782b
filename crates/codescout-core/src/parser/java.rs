//! Java parser.
//!
//! Classes, interfaces and enums are found anywhere in the file; methods are
//! taken from the direct body of each type. Nested types are linked to the
//! type that encloses them. Javadoc blocks become docstrings.

use regex::Regex;

use crate::definition::{CodeDefinition, DefinitionKind};

use super::language::Language;
use super::scan::{
    doc_before, find_block_end, link_nested, match_start, member_captures, Located, Region,
    Source,
};
use super::traits::Parser;

const ANNOTATION_PREFIXES: &[&str] = &["@"];

/// Words the method pattern can mistake for a return type or name.
const NOT_A_METHOD: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "new", "throw", "else", "synchronized",
    "try", "do",
];

/// Regex-based Java parser.
pub struct JavaParser {
    type_decl: Regex,
    method: Regex,
}

impl JavaParser {
    pub fn new() -> Self {
        Self {
            type_decl: Regex::new(
                r"(?m)^[ \t]*(?:(?:public|private|protected|abstract|final|static|sealed|non-sealed|strictfp)\s+)*(class|interface|enum|@interface)\s+(\w+)[^{;]*\{",
            )
            .expect("valid Java type pattern"),
            method: Regex::new(
                r"(?m)(?:^|[{;}])[ \t]*(?:@\w+(?:\([^)]*\))?\s+)*((?:(?:public|private|protected|static|final|abstract|synchronized|native|default|strictfp)\s+)*(?:<[^>]+>\s+)?([\w.$]+(?:\s*<[^;{}()]*>)?(?:\[\])*)\s+(\w+)\s*\(([^)]*)\)(?:\s*throws\s+[\w.,\s]+?)?)\s*([{;])",
            )
            .expect("valid Java method pattern"),
        }
    }

    fn types(&self, source: &Source<'_>) -> Vec<Located> {
        let text = source.text;
        let mut types = Vec::new();

        for caps in self.type_decl.captures_iter(text) {
            let (Some(m), Some(keyword), Some(name)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                continue;
            };
            let kind = match keyword.as_str() {
                "class" => DefinitionKind::Class,
                "enum" => DefinitionKind::Enum,
                _ => DefinitionKind::Interface,
            };

            let start = match_start(&m);
            let open = m.end() - 1;
            let end = find_block_end(text, open, b'{', b'}');
            let def = source
                .define(name.as_str(), kind, start, end, &text[start..open])
                .with_docstring(doc_before(text, start, "//", ANNOTATION_PREFIXES));
            types.push(Located::new(def, start, end));
        }

        types
    }

    fn methods(&self, source: &Source<'_>, owner: &mut Located) -> Vec<CodeDefinition> {
        let text = source.text;
        let region = Region::new(text, owner.start, owner.end);
        let stubs_allowed = owner.def.kind == DefinitionKind::Interface;
        let mut methods = Vec::new();

        // Annotations stay out of the span; the declaration starts at its
        // modifiers.
        for caps in member_captures(&self.method, region.text) {
            let (Some(decl), Some(ret), Some(name), Some(terminator)) =
                (caps.get(1), caps.get(2), caps.get(3), caps.get(5))
            else {
                continue;
            };
            if !region.is_member_position(decl.start())
                || NOT_A_METHOD.contains(&ret.as_str())
                || NOT_A_METHOD.contains(&name.as_str())
            {
                continue;
            }

            let start = region.absolute(decl.start());
            let term = region.absolute(terminator.start());
            let end = if terminator.as_str() == "{" {
                find_block_end(text, term, b'{', b'}')
            } else if stubs_allowed || is_abstract(decl.as_str()) {
                term + 1
            } else {
                continue;
            };

            let method = source
                .define(name.as_str(), DefinitionKind::Method, start, end, &text[start..term])
                .with_docstring(doc_before(text, start, "//", ANNOTATION_PREFIXES))
                .with_parent(owner.def.name.clone());
            owner.def.add_child(name.as_str());
            methods.push(method);
        }

        methods
    }
}

fn is_abstract(header: &str) -> bool {
    header.split_whitespace().any(|w| w == "abstract" || w == "native")
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for JavaParser {
    fn parse(&self, content: &str, file_path: &str) -> Vec<CodeDefinition> {
        let source = Source::new(content, file_path);
        let mut types = self.types(&source);

        let members: Vec<Vec<CodeDefinition>> = types
            .iter_mut()
            .map(|owner| self.methods(&source, owner))
            .collect();
        link_nested(&mut types);

        types
            .into_iter()
            .zip(members)
            .flat_map(|(owner, methods)| std::iter::once(owner.def).chain(methods))
            .collect()
    }

    fn language(&self) -> Language {
        Language::Java
    }
}
