//! Kotlin parser.
//!
//! Classes, interfaces, objects and companion objects are containers. A
//! `fun`, `val` or `var` directly in a container body is a member; one
//! outside every block is top-level. Members of a companion object report
//! `Class.Companion` as their parent. Extension functions report their
//! receiver type as parent.

use regex::Regex;

use crate::definition::{CodeDefinition, DefinitionKind};

use super::language::Language;
use super::scan::{
    declaration_end, doc_before, header_text_end, innermost_enclosing, link_nested, match_start,
    placement, Located, Placement, Source,
};
use super::traits::Parser;

const ANNOTATION_PREFIXES: &[&str] = &["@"];

/// Regex-based Kotlin parser.
pub struct KotlinParser {
    class: Regex,
    companion: Regex,
    function: Regex,
    property: Regex,
    typealias: Regex,
}

impl KotlinParser {
    pub fn new() -> Self {
        Self {
            class: Regex::new(
                r"(?m)^[ \t]*((?:(?:public|private|protected|internal|abstract|final|open|sealed|data|enum|annotation|inner|value|inline|expect|actual)\s+)*)(class|interface|object)\s+(\w+)",
            )
            .expect("valid Kotlin class pattern"),
            companion: Regex::new(
                r"(?m)^[ \t]*(?:(?:public|private|protected|internal)\s+)?companion\s+object(?:[ \t]+(\w+))?",
            )
            .expect("valid Kotlin companion pattern"),
            function: Regex::new(
                r"(?m)(?:^|[{;}])[ \t]*(?:(?:public|private|protected|internal|override|open|abstract|final|inline|suspend|operator|infix|tailrec|external|actual|expect)\s+)*fun\s+(?:<[^>]*>\s+)?(?:([\w.<>?]+)\.)?(\w+)\s*\(",
            )
            .expect("valid Kotlin fun pattern"),
            property: Regex::new(
                r"(?m)(?:^|[{;}])[ \t]*(?:(?:public|private|protected|internal|override|open|abstract|final|const|lateinit|actual|expect)\s+)*(?:val|var)\s+(\w+)",
            )
            .expect("valid Kotlin property pattern"),
            typealias: Regex::new(
                r"(?m)^[ \t]*(?:(?:public|private|protected|internal)\s+)?typealias\s+(\w+)",
            )
            .expect("valid Kotlin typealias pattern"),
        }
    }

    fn containers(&self, source: &Source<'_>) -> Vec<Located> {
        let text = source.text;
        let mut found = Vec::new();

        for caps in self.class.captures_iter(text) {
            let (Some(m), Some(modifiers), Some(keyword), Some(name)) =
                (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
            else {
                continue;
            };
            let kind = match keyword.as_str() {
                "interface" => DefinitionKind::Interface,
                "object" => DefinitionKind::Object,
                _ if modifiers.as_str().split_whitespace().any(|w| w == "enum") => {
                    DefinitionKind::Enum
                }
                _ => DefinitionKind::Class,
            };
            found.push(self.container(source, &m, name.as_str(), kind));
        }

        for caps in self.companion.captures_iter(text) {
            let Some(m) = caps.get(0) else {
                continue;
            };
            let name = caps.get(1).map_or("Companion", |n| n.as_str());
            found.push(self.container(source, &m, name, DefinitionKind::CompanionObject));
        }

        found.sort_by_key(|c| c.start);
        found
    }

    fn container(
        &self,
        source: &Source<'_>,
        m: &regex::Match<'_>,
        name: &str,
        kind: DefinitionKind,
    ) -> Located {
        let text = source.text;
        let start = match_start(m);
        let end = declaration_end(text, m.end());
        let signature = &text[start..header_text_end(text, m.end())];
        let def = source
            .define(name, kind, start, end, signature)
            .with_docstring(doc_before(text, start, "//", ANNOTATION_PREFIXES));
        Located::new(def, start, end)
    }

    fn define(
        &self,
        source: &Source<'_>,
        name: &str,
        kind: DefinitionKind,
        start: usize,
        header_from: usize,
    ) -> CodeDefinition {
        let text = source.text;
        let end = declaration_end(text, header_from);
        let signature = &text[start..header_text_end(text, header_from)];
        source
            .define(name, kind, start, end, signature)
            .with_docstring(doc_before(text, start, "//", ANNOTATION_PREFIXES))
    }
}

/// Parent name reported by members of each container.
fn member_parents(containers: &[Located]) -> Vec<String> {
    containers
        .iter()
        .map(|c| {
            if c.def.kind != DefinitionKind::CompanionObject {
                return c.def.name.clone();
            }
            match innermost_enclosing(containers, c.start) {
                Some(outer) => format!("{}.{}", containers[outer].def.name, c.def.name),
                None => c.def.name.clone(),
            }
        })
        .collect()
}

impl Default for KotlinParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for KotlinParser {
    fn parse(&self, content: &str, file_path: &str) -> Vec<CodeDefinition> {
        let source = Source::new(content, file_path);
        let text = content;
        let mut containers = self.containers(&source);
        let parents = member_parents(&containers);

        let mut methods: Vec<Vec<CodeDefinition>> = vec![Vec::new(); containers.len()];
        let mut properties: Vec<Vec<CodeDefinition>> = vec![Vec::new(); containers.len()];
        let mut functions = Vec::new();
        let mut top_properties = Vec::new();

        for caps in self.function.captures_iter(text) {
            let (Some(m), Some(name)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            let start = match_start(&m);
            let paren = m.end() - 1;
            match placement(text, &containers, start) {
                Placement::Member(owner) => {
                    containers[owner].def.add_child(name.as_str());
                    methods[owner].push(
                        self.define(&source, name.as_str(), DefinitionKind::Method, start, paren)
                            .with_parent(parents[owner].clone()),
                    );
                }
                Placement::TopLevel => {
                    let def = match caps.get(1) {
                        Some(receiver) => self
                            .define(&source, name.as_str(), DefinitionKind::ExtensionFunction, start, paren)
                            .with_parent(receiver.as_str()),
                        None => self.define(&source, name.as_str(), DefinitionKind::Function, start, paren),
                    };
                    functions.push(def);
                }
                Placement::Nested => {}
            }
        }

        for caps in self.property.captures_iter(text) {
            let (Some(m), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let start = match_start(&m);
            let def = self.define(&source, name.as_str(), DefinitionKind::Property, start, m.end());
            match placement(text, &containers, start) {
                Placement::Member(owner) => {
                    containers[owner].def.add_child(name.as_str());
                    properties[owner].push(def.with_parent(parents[owner].clone()));
                }
                Placement::TopLevel => top_properties.push(def),
                Placement::Nested => {}
            }
        }

        let aliases: Vec<CodeDefinition> = self
            .typealias
            .captures_iter(text)
            .filter_map(|caps| {
                let m = caps.get(0)?;
                let name = caps.get(1)?;
                let start = match_start(&m);
                Some(self.define(&source, name.as_str(), DefinitionKind::Typealias, start, m.end()))
            })
            .collect();

        link_nested(&mut containers);

        let mut defs = Vec::new();
        for ((container, methods), properties) in containers.into_iter().zip(methods).zip(properties) {
            defs.push(container.def);
            defs.extend(methods);
            defs.extend(properties);
        }
        defs.extend(functions);
        defs.extend(top_properties);
        defs.extend(aliases);
        defs
    }

    fn language(&self) -> Language {
        Language::Kotlin
    }
}
