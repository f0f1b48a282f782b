//! PHP parser.
//!
//! Classes, interfaces, traits and enums with their methods, properties and
//! constants, plus free functions. Container and function names are
//! qualified with the nearest preceding `namespace` declaration.

use regex::Regex;

use crate::definition::{CodeDefinition, DefinitionKind};

use super::language::Language;
use super::scan::{
    doc_before, find_block_end, is_inside_block, match_start, statement_end, terminator, Located,
    Region, Source,
};
use super::traits::Parser;

const ATTRIBUTE_PREFIXES: &[&str] = &["#[", "@"];

/// Regex-based PHP parser.
pub struct PhpParser {
    namespace: Regex,
    container: Regex,
    method: Regex,
    property: Regex,
    constant: Regex,
    function: Regex,
}

impl PhpParser {
    pub fn new() -> Self {
        Self {
            namespace: Regex::new(r"(?m)^[ \t]*namespace\s+([\w\\]+)\s*[;{]")
                .expect("valid PHP namespace pattern"),
            container: Regex::new(
                r"(?m)^[ \t]*(?:(?:abstract|final|readonly)\s+)*(class|interface|trait|enum)\s+(\w+)[^{;]*\{",
            )
            .expect("valid PHP container pattern"),
            method: Regex::new(
                r"(?m)(?:^|[{;}])[ \t]*(?:(?:public|private|protected|static|abstract|final)\s+)*function\s+&?(\w+)\s*\(",
            )
            .expect("valid PHP method pattern"),
            property: Regex::new(
                r"(?m)(?:^|[{;}])[ \t]*(?:(?:public|private|protected|static|readonly|var)\s+)+(?:\??[\w\\|]+\s+)?\$(\w+)",
            )
            .expect("valid PHP property pattern"),
            constant: Regex::new(
                r"(?m)(?:^|[{;}])[ \t]*(?:(?:public|private|protected|final)\s+)*const\s+(?:\w+\s+)?(\w+)\s*=",
            )
            .expect("valid PHP constant pattern"),
            function: Regex::new(r"(?m)^[ \t]*function\s+&?(\w+)\s*\(")
                .expect("valid PHP function pattern"),
        }
    }

    /// Namespace declarations as `(offset, name)` pairs in source order.
    fn namespaces(&self, text: &str) -> Vec<(usize, String)> {
        self.namespace
            .captures_iter(text)
            .filter_map(|caps| Some((caps.get(0)?.start(), caps.get(1)?.as_str().to_string())))
            .collect()
    }

    fn containers(&self, source: &Source<'_>, namespaces: &[(usize, String)]) -> Vec<Located> {
        let text = source.text;
        self.container
            .captures_iter(text)
            .filter_map(|caps| {
                let m = caps.get(0)?;
                let kind = match caps.get(1)?.as_str() {
                    "class" => DefinitionKind::Class,
                    "interface" => DefinitionKind::Interface,
                    "trait" => DefinitionKind::Trait,
                    _ => DefinitionKind::Enum,
                };
                let start = match_start(&m);
                let open = m.end() - 1;
                let end = find_block_end(text, open, b'{', b'}');
                let name = qualify(namespaces, start, caps.get(2)?.as_str());
                let def = source
                    .define(name, kind, start, end, &text[start..open])
                    .with_docstring(doc_before(text, start, "//", ATTRIBUTE_PREFIXES));
                Some(Located::new(def, start, end))
            })
            .collect()
    }

    /// Methods, then properties, then constants declared directly in `owner`.
    fn members(&self, source: &Source<'_>, owner: &mut Located) -> Vec<CodeDefinition> {
        let text = source.text;
        let region = Region::new(text, owner.start, owner.end);
        let parent = owner.def.name.clone();
        let mut members = Vec::new();

        for caps in self.method.captures_iter(region.text) {
            let (Some(m), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let relative = match_start(&m);
            if !region.is_member_position(relative) {
                continue;
            }
            let start = region.absolute(relative);
            let paren = region.absolute(m.end() - 1);
            let close = find_block_end(text, paren, b'(', b')');
            let Some((term, byte)) = terminator(text, close) else {
                continue;
            };
            let end = if byte == b'{' {
                find_block_end(text, term, b'{', b'}')
            } else {
                term + 1
            };
            members.push(
                source
                    .define(name.as_str(), DefinitionKind::Method, start, end, &text[start..term])
                    .with_docstring(doc_before(text, start, "//", ATTRIBUTE_PREFIXES))
                    .with_parent(parent.clone()),
            );
        }

        for (re, kind) in [
            (&self.property, DefinitionKind::Property),
            (&self.constant, DefinitionKind::Constant),
        ] {
            for caps in re.captures_iter(region.text) {
                let (Some(m), Some(name)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let relative = match_start(&m);
                if !region.is_member_position(relative) {
                    continue;
                }
                let start = region.absolute(relative);
                let end = property_end(text, region.absolute(m.end()));
                members.push(
                    source
                        .define(name.as_str(), kind, start, end, text[start..end].trim_end_matches([';', ',']))
                        .with_docstring(doc_before(text, start, "//", ATTRIBUTE_PREFIXES))
                        .with_parent(parent.clone()),
                );
            }
        }

        for member in &members {
            owner.def.add_child(member.name.clone());
        }
        members
    }
}

/// `Namespace\name` when a namespace is declared before `position`.
fn qualify(namespaces: &[(usize, String)], position: usize, name: &str) -> String {
    namespaces
        .iter()
        .take_while(|(offset, _)| *offset < position)
        .last()
        .map(|(_, ns)| format!("{}\\{}", ns, name))
        .unwrap_or_else(|| name.to_string())
}

/// End of a property or constant declaration. A `,` or `)` at the top level
/// ends a promoted constructor parameter.
fn property_end(text: &str, from: usize) -> usize {
    let mut depth: i64 = 0;
    for (i, b) in text.bytes().enumerate().skip(from) {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' if depth == 0 => return i,
            b')' | b']' | b'}' => depth -= 1,
            b',' if depth == 0 => return i,
            b';' if depth == 0 => return i + 1,
            _ => {}
        }
    }
    statement_end(text, from)
}

impl Default for PhpParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for PhpParser {
    fn parse(&self, content: &str, file_path: &str) -> Vec<CodeDefinition> {
        let source = Source::new(content, file_path);
        let text = content;
        let namespaces = self.namespaces(text);
        let mut containers = self.containers(&source, &namespaces);

        let members: Vec<Vec<CodeDefinition>> = containers
            .iter_mut()
            .map(|owner| self.members(&source, owner))
            .collect();

        let mut defs: Vec<CodeDefinition> = Vec::new();
        let first_container = containers.first().map(|c| c.start);
        for (owner, members) in containers.into_iter().zip(members) {
            defs.push(owner.def);
            defs.extend(members);
        }

        for caps in self.function.captures_iter(text) {
            let (Some(m), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let start = match_start(&m);
            if first_container.is_some_and(|first| first < start) && is_inside_block(text, start) {
                continue;
            }
            let paren = m.end() - 1;
            let close = find_block_end(text, paren, b'(', b')');
            let Some((open, b'{')) = terminator(text, close) else {
                continue;
            };
            let end = find_block_end(text, open, b'{', b'}');
            defs.push(
                source
                    .define(
                        qualify(&namespaces, start, name.as_str()),
                        DefinitionKind::Function,
                        start,
                        end,
                        &text[start..open],
                    )
                    .with_docstring(doc_before(text, start, "//", ATTRIBUTE_PREFIXES)),
            );
        }

        defs
    }

    fn language(&self) -> Language {
        Language::Php
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> Vec<CodeDefinition> {
        PhpParser::new().parse(code, "test.php")
    }

    fn find<'a>(defs: &'a [CodeDefinition], name: &str) -> &'a CodeDefinition {
        defs.iter()
            .find(|d| d.name == name)
            .unwrap_or_else(|| panic!("no definition named {}", name))
    }

    const MODEL: &str = r#"<?php

namespace App\Models;

use Foo\Bar;

/**
 * A user.
 */
final class User extends Model implements JsonSerializable
{
    public const TABLE = 'users';

    private ?string $name = null;
    protected static array $cache = [
        'a' => 1,
    ];

    public function __construct(string $name)
    {
        $this->name = $name;
    }

    // Name accessor.
    public function getName(): ?string
    {
        return $this->name;
    }
}

interface Greets
{
    public function greet(string $who): string;
}

function helper($x)
{
    return $x;
}
"#;

    #[test]
    fn test_namespaced_class_members() {
        let defs = parse(MODEL);
        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "App\\Models\\User",
                "__construct",
                "getName",
                "name",
                "cache",
                "TABLE",
                "App\\Models\\Greets",
                "greet",
                "App\\Models\\helper",
            ]
        );

        let user = &defs[0];
        assert_eq!(user.kind, DefinitionKind::Class);
        assert_eq!((user.start_line, user.end_line), (10, 29));
        assert_eq!(user.docstring.as_deref(), Some("A user."));
        assert_eq!(
            user.signature,
            "final class User extends Model implements JsonSerializable"
        );
        assert_eq!(
            user.children,
            vec!["__construct", "getName", "name", "cache", "TABLE"]
        );

        let ctor = find(&defs, "__construct");
        assert_eq!(ctor.parent.as_deref(), Some("App\\Models\\User"));
        assert_eq!((ctor.start_line, ctor.end_line), (19, 22));
        assert_eq!(ctor.signature, "public function __construct(string $name)");
        assert_eq!(ctor.docstring, None);

        let get_name = find(&defs, "getName");
        assert_eq!(get_name.docstring.as_deref(), Some("Name accessor."));

        let cache = find(&defs, "cache");
        assert_eq!(cache.kind, DefinitionKind::Property);
        assert_eq!((cache.start_line, cache.end_line), (15, 17));

        let table = find(&defs, "TABLE");
        assert_eq!(table.kind, DefinitionKind::Constant);
        assert_eq!(table.signature, "public const TABLE = 'users'");

        let greet = find(&defs, "greet");
        assert_eq!((greet.start_line, greet.end_line), (33, 33));
        assert_eq!(greet.parent.as_deref(), Some("App\\Models\\Greets"));

        let helper = find(&defs, "App\\Models\\helper");
        assert_eq!(helper.kind, DefinitionKind::Function);
        assert_eq!((helper.start_line, helper.end_line), (36, 39));
    }

    #[test]
    fn test_without_namespace() {
        let code = "<?php\ntrait Loggable {\n    function log($m) { echo $m; }\n}\n";
        let defs = parse(code);
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "Loggable");
        assert_eq!(defs[0].kind, DefinitionKind::Trait);
        assert_eq!(defs[1].name, "log");
        assert_eq!(defs[1].kind, DefinitionKind::Method);
    }

    #[test]
    fn test_members_on_the_container_line() {
        let code = "<?php\ninterface I { public function x(); }\ntrait Tr { function t() {} }\n";
        let defs = parse(code);
        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["I", "x", "Tr", "t"]);
        assert_eq!(defs[0].children, vec!["x"]);
        assert_eq!(defs[1].signature, "public function x()");
        assert_eq!((defs[1].start_line, defs[1].end_line), (2, 2));
        assert_eq!(defs[3].parent.as_deref(), Some("Tr"));
    }

    #[test]
    fn test_promoted_constructor_property() {
        let code = "<?php\nclass Point {\n    public function __construct(\n        private int $x,\n        private int $y,\n    ) {}\n}\n";
        let defs = parse(code);
        let x = find(&defs, "x");
        assert_eq!(x.kind, DefinitionKind::Property);
        assert_eq!((x.start_line, x.end_line), (4, 4));
        assert_eq!(x.signature, "private int $x");
    }
}
