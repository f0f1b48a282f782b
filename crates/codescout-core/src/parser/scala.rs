//! Scala parser.
//!
//! Classes, case classes, objects, case objects, traits and enums, with
//! their `def`, `val` and `var` members, plus top-level definitions. Every
//! container and top-level name is qualified with the package clauses that
//! precede it.

use regex::Regex;

use crate::definition::{CodeDefinition, DefinitionKind};

use super::language::Language;
use super::scan::{
    declaration_end, doc_before, header_text_end, link_nested, match_start, placement, Located,
    Placement, Source,
};
use super::traits::Parser;

const ANNOTATION_PREFIXES: &[&str] = &["@"];

/// Regex-based Scala parser.
pub struct ScalaParser {
    package: Regex,
    container: Regex,
    def: Regex,
    value: Regex,
    type_decl: Regex,
}

/// Members of one container, grouped by kind.
#[derive(Default, Clone)]
struct Members {
    methods: Vec<CodeDefinition>,
    vals: Vec<CodeDefinition>,
    vars: Vec<CodeDefinition>,
}

impl Members {
    fn flatten(self) -> impl Iterator<Item = CodeDefinition> {
        self.methods.into_iter().chain(self.vals).chain(self.vars)
    }
}

impl ScalaParser {
    pub fn new() -> Self {
        Self {
            package: Regex::new(r"(?m)^[ \t]*package\s+([\w.]+)")
                .expect("valid Scala package pattern"),
            container: Regex::new(
                r"(?m)^[ \t]*(?:@\w+(?:\([^)]*\))?[ \t]+)*(?:(?:abstract|final|sealed|implicit|private|protected|open)(?:\[\w+\])?\s+)*(case\s+class|case\s+object|class|object|trait|enum)\s+(\w+)",
            )
            .expect("valid Scala container pattern"),
            def: Regex::new(
                r"(?m)(?:^|[{;}])[ \t]*(?:@\w+(?:\([^)]*\))?[ \t]+)*(?:(?:private|protected|override|final|implicit|inline|transparent|abstract)(?:\[\w+\])?\s+)*def\s+(\w+|[^\s\[(:]+)",
            )
            .expect("valid Scala def pattern"),
            value: Regex::new(
                r"(?m)(?:^|[{;}])[ \t]*(?:@\w+(?:\([^)]*\))?[ \t]+)*(?:(?:private|protected|override|final|implicit|lazy|inline)(?:\[\w+\])?\s+)*(val|var)\s+(\w+)",
            )
            .expect("valid Scala val pattern"),
            type_decl: Regex::new(
                r"(?m)^[ \t]*(?:(?:private|protected|override|opaque)(?:\[\w+\])?\s+)*type\s+(\w+)",
            )
            .expect("valid Scala type pattern"),
        }
    }

    /// Package clauses as `(offset, name)`, in source order.
    fn packages(&self, text: &str) -> Vec<(usize, String)> {
        self.package
            .captures_iter(text)
            .filter_map(|caps| {
                let start = caps.get(0)?.start();
                let name = caps.get(1)?.as_str();
                (name != "object").then(|| (start, name.to_string()))
            })
            .collect()
    }

    fn containers(&self, source: &Source<'_>, packages: &[(usize, String)]) -> Vec<Located> {
        let text = source.text;
        self.container
            .captures_iter(text)
            .filter_map(|caps| {
                let m = caps.get(0)?;
                let keyword = caps.get(1)?.as_str();
                let name = caps.get(2)?.as_str();
                let kind = match keyword.split_whitespace().collect::<Vec<_>>().as_slice() {
                    ["case", "class"] => DefinitionKind::CaseClass,
                    ["case", "object"] => DefinitionKind::CaseObject,
                    ["object"] => DefinitionKind::Object,
                    ["trait"] => DefinitionKind::Trait,
                    ["enum"] => DefinitionKind::Enum,
                    _ => DefinitionKind::Class,
                };
                let start = match_start(&m);
                let def = define(source, qualify(packages, start, name), kind, m);
                Some(Located::new(def, start, declaration_end(text, m.end())))
            })
            .collect()
    }
}

fn define(
    source: &Source<'_>,
    name: impl Into<String>,
    kind: DefinitionKind,
    m: regex::Match<'_>,
) -> CodeDefinition {
    let text = source.text;
    let start = match_start(&m);
    let end = declaration_end(text, m.end());
    let signature = &text[start..header_text_end(text, m.end())];
    source
        .define(name, kind, start, end, signature)
        .with_docstring(doc_before(text, start, "//", ANNOTATION_PREFIXES))
}

/// `pkg.name`, joining every package clause before `position`.
fn qualify(packages: &[(usize, String)], position: usize, name: &str) -> String {
    let prefix: Vec<&str> = packages
        .iter()
        .take_while(|(offset, _)| *offset < position)
        .map(|(_, package)| package.as_str())
        .collect();
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix.join("."), name)
    }
}

impl Default for ScalaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for ScalaParser {
    fn parse(&self, content: &str, file_path: &str) -> Vec<CodeDefinition> {
        let source = Source::new(content, file_path);
        let text = content;
        let packages = self.packages(text);
        let mut containers = self.containers(&source, &packages);

        let mut members = vec![Members::default(); containers.len()];
        let mut top_level = Members::default();
        let mut types = Vec::new();

        for caps in self.def.captures_iter(text) {
            let (Some(m), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            match placement(text, &containers, match_start(&m)) {
                Placement::Member(owner) => members[owner].methods.push(
                    define(&source, name.as_str(), DefinitionKind::Method, m)
                        .with_parent(containers[owner].def.name.clone()),
                ),
                Placement::TopLevel => top_level.methods.push(define(
                    &source,
                    qualify(&packages, m.start(), name.as_str()),
                    DefinitionKind::Function,
                    m,
                )),
                Placement::Nested => {}
            }
        }

        for caps in self.value.captures_iter(text) {
            let (Some(m), Some(keyword), Some(name)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                continue;
            };
            let is_val = keyword.as_str() == "val";
            let kind = if is_val { DefinitionKind::Val } else { DefinitionKind::Var };
            let (group, def) = match placement(text, &containers, match_start(&m)) {
                Placement::Member(owner) => (
                    &mut members[owner],
                    define(&source, name.as_str(), kind, m)
                        .with_parent(containers[owner].def.name.clone()),
                ),
                Placement::TopLevel => (
                    &mut top_level,
                    define(&source, qualify(&packages, m.start(), name.as_str()), kind, m),
                ),
                Placement::Nested => continue,
            };
            if is_val {
                group.vals.push(def);
            } else {
                group.vars.push(def);
            }
        }

        for caps in self.type_decl.captures_iter(text) {
            let (Some(m), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if placement(text, &containers, match_start(&m)) == Placement::TopLevel {
                types.push(define(
                    &source,
                    qualify(&packages, m.start(), name.as_str()),
                    DefinitionKind::Type,
                    m,
                ));
            }
        }

        let members: Vec<Vec<CodeDefinition>> = members
            .into_iter()
            .map(|group| group.flatten().collect())
            .collect();
        for (container, group) in containers.iter_mut().zip(&members) {
            for member in group {
                container.def.add_child(member.name.clone());
            }
        }
        link_nested(&mut containers);

        let mut defs = Vec::new();
        for (container, group) in containers.into_iter().zip(members) {
            defs.push(container.def);
            defs.extend(group);
        }
        defs.extend(top_level.flatten());
        defs.extend(types);
        defs
    }

    fn language(&self) -> Language {
        Language::Scala
    }
}
