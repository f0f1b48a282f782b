//! Code definition records.
//!
//! A parse produces a flat list of [`CodeDefinition`]s. Hierarchy is encoded by
//! name: a member carries its container's name in `parent`, and the container
//! lists member names in `children`. Each member also appears as its own entry
//! in the list.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of construct a definition describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    Class,
    Struct,
    Enum,
    Interface,
    Trait,
    Protocol,
    Module,
    Namespace,
    Object,
    CaseClass,
    CaseObject,
    CompanionObject,
    Implementation,
    Extension,
    Function,
    ExtensionFunction,
    Method,
    Property,
    Attribute,
    Constant,
    Static,
    Type,
    Typealias,
    Val,
    Var,
}

impl DefinitionKind {
    /// Tag used in serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionKind::Class => "class",
            DefinitionKind::Struct => "struct",
            DefinitionKind::Enum => "enum",
            DefinitionKind::Interface => "interface",
            DefinitionKind::Trait => "trait",
            DefinitionKind::Protocol => "protocol",
            DefinitionKind::Module => "module",
            DefinitionKind::Namespace => "namespace",
            DefinitionKind::Object => "object",
            DefinitionKind::CaseClass => "case_class",
            DefinitionKind::CaseObject => "case_object",
            DefinitionKind::CompanionObject => "companion_object",
            DefinitionKind::Implementation => "implementation",
            DefinitionKind::Extension => "extension",
            DefinitionKind::Function => "function",
            DefinitionKind::ExtensionFunction => "extension_function",
            DefinitionKind::Method => "method",
            DefinitionKind::Property => "property",
            DefinitionKind::Attribute => "attribute",
            DefinitionKind::Constant => "constant",
            DefinitionKind::Static => "static",
            DefinitionKind::Type => "type",
            DefinitionKind::Typealias => "typealias",
            DefinitionKind::Val => "val",
            DefinitionKind::Var => "var",
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single named construct found in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDefinition {
    /// Identifier, possibly namespace- or package-qualified.
    pub name: String,

    /// Construct kind.
    pub kind: DefinitionKind,

    /// Path of the file the definition was found in.
    pub file_path: String,

    /// 1-based line of the definition header.
    pub start_line: usize,

    /// 1-based line where the construct ends, never before `start_line`.
    pub end_line: usize,

    /// Header text as it appears in the source, trimmed.
    pub signature: String,

    /// Documentation attached to the construct, if any.
    pub docstring: Option<String>,

    /// Name of the enclosing container.
    pub parent: Option<String>,

    /// Names of directly contained members, in discovery order.
    pub children: Vec<String>,

    /// Free-form extra data, such as `async` or `singleton` markers.
    pub metadata: BTreeMap<String, String>,
}

impl CodeDefinition {
    /// Create a definition without docstring, parent or children.
    pub fn new(
        name: impl Into<String>,
        kind: DefinitionKind,
        file_path: impl Into<String>,
        start_line: usize,
        end_line: usize,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            file_path: file_path.into(),
            start_line,
            end_line: end_line.max(start_line),
            signature: signature.into().trim().to_string(),
            docstring: None,
            parent: None,
            children: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a docstring. Empty strings are dropped.
    pub fn with_docstring(mut self, docstring: Option<String>) -> Self {
        self.docstring = docstring.filter(|d| !d.is_empty());
        self
    }

    /// Set the enclosing container's name.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Record a member name.
    pub fn add_child(&mut self, name: impl Into<String>) {
        self.children.push(name.into());
    }

    /// Number of lines spanned, inclusive.
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}
