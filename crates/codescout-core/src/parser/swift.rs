//! Swift parser.
//!
//! Classes, structs, enums, protocols, actors and extensions are containers.
//! Functions, initializers and stored or computed properties directly inside
//! one are members. An extension is recorded as `extension T` with parent
//! `T`, and its members report `T` as their parent.

use regex::Regex;

use crate::definition::{CodeDefinition, DefinitionKind};

use super::language::Language;
use super::scan::{
    declaration_end, doc_before, header_text_end, link_nested, match_start, placement, Located,
    Placement, Source,
};
use super::traits::Parser;

const ATTRIBUTE_PREFIXES: &[&str] = &["@"];

/// Words the container pattern picks up after `class` in `class func` and
/// friends.
const NOT_A_TYPE: &[&str] = &["func", "var", "let", "init", "deinit", "subscript"];

/// Regex-based Swift parser.
pub struct SwiftParser {
    container: Regex,
    function: Regex,
    property: Regex,
    typealias: Regex,
}

impl SwiftParser {
    pub fn new() -> Self {
        Self {
            container: Regex::new(
                r"(?m)^[ \t]*(?:@\w+(?:\([^)]*\))?[ \t]+)*(?:(?:public|private|internal|fileprivate|open|final|indirect)\s+)*(class|struct|enum|protocol|extension|actor)\s+([\w.]+)",
            )
            .expect("valid Swift container pattern"),
            function: Regex::new(
                r"(?m)(?:^|[{;}])[ \t]*(?:@\w+(?:\([^)]*\))?[ \t]+)*(?:(?:public|private|internal|fileprivate|open|final|static|class|override|mutating|nonmutating|convenience|required|dynamic|nonisolated)\s+)*(?:func\s+([^\s(<]+)|(init)\b[?!]?|(deinit)\b)",
            )
            .expect("valid Swift func pattern"),
            property: Regex::new(
                r"(?m)(?:^|[{;}])[ \t]*(?:@\w+(?:\([^)]*\))?[ \t]+)*(?:(?:public|private|internal|fileprivate|open|final|static|class|override|lazy|weak|unowned|dynamic|nonisolated)(?:\(set\))?\s+)*(?:let|var)\s+(\w+)",
            )
            .expect("valid Swift property pattern"),
            typealias: Regex::new(
                r"(?m)^[ \t]*(?:(?:public|private|internal|fileprivate|open)\s+)*typealias\s+(\w+)",
            )
            .expect("valid Swift typealias pattern"),
        }
    }

    fn containers(&self, source: &Source<'_>) -> Vec<Located> {
        let text = source.text;
        self.container
            .captures_iter(text)
            .filter_map(|caps| {
                let m = caps.get(0)?;
                let keyword = caps.get(1)?.as_str();
                let name = caps.get(2)?.as_str();
                if NOT_A_TYPE.contains(&name) {
                    return None;
                }

                let kind = match keyword {
                    "struct" => DefinitionKind::Struct,
                    "enum" => DefinitionKind::Enum,
                    "protocol" => DefinitionKind::Protocol,
                    "extension" => DefinitionKind::Extension,
                    _ => DefinitionKind::Class,
                };
                let def = if kind == DefinitionKind::Extension {
                    self.define(source, format!("extension {}", name), kind, m)
                        .with_parent(name)
                } else {
                    self.define(source, name, kind, m)
                };
                let def = if keyword == "actor" {
                    def.with_metadata("actor", "true")
                } else {
                    def
                };

                let start = match_start(&m);
                Some(Located::new(def, start, declaration_end(text, m.end())))
            })
            .collect()
    }

    fn define(
        &self,
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
            .with_docstring(doc_before(text, start, "///", ATTRIBUTE_PREFIXES))
    }
}

impl Default for SwiftParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for SwiftParser {
    fn parse(&self, content: &str, file_path: &str) -> Vec<CodeDefinition> {
        let source = Source::new(content, file_path);
        let text = content;
        let mut containers = self.containers(&source);
        let parents: Vec<String> = containers
            .iter()
            .map(|c| match c.def.kind {
                DefinitionKind::Extension => c.def.parent.clone().unwrap_or_default(),
                _ => c.def.name.clone(),
            })
            .collect();

        let mut methods: Vec<Vec<CodeDefinition>> = vec![Vec::new(); containers.len()];
        let mut functions = Vec::new();
        for caps in self.function.captures_iter(text) {
            let Some(m) = caps.get(0) else {
                continue;
            };
            let Some(name) = caps.get(1).or(caps.get(2)).or(caps.get(3)) else {
                continue;
            };
            let start = match_start(&m);
            match placement(text, &containers, start) {
                Placement::Member(owner) => {
                    containers[owner].def.add_child(name.as_str());
                    methods[owner].push(
                        self.define(&source, name.as_str(), DefinitionKind::Method, m)
                            .with_parent(parents[owner].clone()),
                    );
                }
                Placement::TopLevel if caps.get(1).is_some() => {
                    functions.push(self.define(&source, name.as_str(), DefinitionKind::Function, m));
                }
                _ => {}
            }
        }

        let mut properties: Vec<Vec<CodeDefinition>> = vec![Vec::new(); containers.len()];
        for caps in self.property.captures_iter(text) {
            let (Some(m), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if let Placement::Member(owner) = placement(text, &containers, match_start(&m)) {
                containers[owner].def.add_child(name.as_str());
                properties[owner].push(
                    self.define(&source, name.as_str(), DefinitionKind::Property, m)
                        .with_parent(parents[owner].clone()),
                );
            }
        }

        let aliases: Vec<CodeDefinition> = self
            .typealias
            .captures_iter(text)
            .filter_map(|caps| {
                let m = caps.get(0)?;
                let name = caps.get(1)?;
                (placement(text, &containers, match_start(&m)) == Placement::TopLevel)
                    .then(|| self.define(&source, name.as_str(), DefinitionKind::Typealias, m))
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
        defs.extend(aliases);
        defs
    }

    fn language(&self) -> Language {
        Language::Swift
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> Vec<CodeDefinition> {
        SwiftParser::new().parse(code, "Shapes.swift")
    }

    fn find<'a>(defs: &'a [CodeDefinition], name: &str, kind: DefinitionKind) -> &'a CodeDefinition {
        defs.iter()
            .find(|d| d.name == name && d.kind == kind)
            .unwrap_or_else(|| panic!("no {} named {}", kind, name))
    }

    const SOURCE: &str = r#"import Foundation

/// A drawable shape.
protocol Shape {
    var area: Double { get }
    func draw() -> String
}

/**
 * A circle.
 */
public final class Circle: Shape {
    let radius: Double
    private(set) var label = "circle"

    init(radius: Double) {
        self.radius = radius
    }

    deinit {
        print("bye")
    }

    var area: Double {
        return .pi * radius * radius
    }

    /// Renders it.
    @discardableResult
    func draw() -> String {
        let s = "o"
        return s
    }

    class func unit() -> Circle { Circle(radius: 1) }
}

extension Circle: CustomStringConvertible {
    var description: String { label }
}

struct Point {
    var x = 0
    var y = 0
}

enum Direction {
    case north, south
}

func distance(_ a: Point, _ b: Point) -> Double {
    return 0
}

typealias Handler = (Int) -> Void
"#;

    #[test]
    fn test_output_order() {
        let defs = parse(SOURCE);
        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Shape",
                "draw",
                "area",
                "Circle",
                "init",
                "deinit",
                "draw",
                "unit",
                "radius",
                "label",
                "area",
                "extension Circle",
                "description",
                "Point",
                "x",
                "y",
                "Direction",
                "distance",
                "Handler",
            ]
        );
    }

    #[test]
    fn test_protocol_and_class() {
        let defs = parse(SOURCE);

        let shape = find(&defs, "Shape", DefinitionKind::Protocol);
        assert_eq!((shape.start_line, shape.end_line), (4, 7));
        assert_eq!(shape.docstring.as_deref(), Some("A drawable shape."));
        assert_eq!(shape.children, vec!["draw", "area"]);

        let circle = find(&defs, "Circle", DefinitionKind::Class);
        assert_eq!((circle.start_line, circle.end_line), (12, 36));
        assert_eq!(circle.docstring.as_deref(), Some("A circle."));
        assert_eq!(circle.signature, "public final class Circle: Shape");

        let draw = defs
            .iter()
            .find(|d| d.name == "draw" && d.parent.as_deref() == Some("Circle"))
            .unwrap();
        assert_eq!((draw.start_line, draw.end_line), (30, 33));
        assert_eq!(draw.docstring.as_deref(), Some("Renders it."));
        assert_eq!(draw.signature, "func draw() -> String");

        let deinit = find(&defs, "deinit", DefinitionKind::Method);
        assert_eq!((deinit.start_line, deinit.end_line), (20, 22));

        let label = find(&defs, "label", DefinitionKind::Property);
        assert_eq!((label.start_line, label.end_line), (14, 14));
        assert!(!defs.iter().any(|d| d.name == "s"));
    }

    #[test]
    fn test_extension() {
        let defs = parse(SOURCE);
        let ext = find(&defs, "extension Circle", DefinitionKind::Extension);
        assert_eq!(ext.parent.as_deref(), Some("Circle"));
        assert_eq!(ext.children, vec!["description"]);

        let description = find(&defs, "description", DefinitionKind::Property);
        assert_eq!(description.parent.as_deref(), Some("Circle"));
    }

    #[test]
    fn test_members_on_the_container_line() {
        let defs = parse("protocol P { func f() }\nstruct S { var x = 1; func g() {} }\n");
        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["P", "f", "S", "g", "x"]);
        assert_eq!(defs[0].children, vec!["f"]);
        assert_eq!(defs[1].signature, "func f()");
        assert_eq!(defs[1].parent.as_deref(), Some("P"));
        assert_eq!(defs[2].children, vec!["g", "x"]);
        assert_eq!(defs[4].signature, "var x");
    }

    #[test]
    fn test_top_level() {
        let defs = parse(SOURCE);
        let distance = find(&defs, "distance", DefinitionKind::Function);
        assert_eq!((distance.start_line, distance.end_line), (51, 53));
        assert_eq!(distance.parent, None);

        let handler = find(&defs, "Handler", DefinitionKind::Typealias);
        assert_eq!(handler.start_line, 55);
    }
}
