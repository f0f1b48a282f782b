//! The `extract_definitions` tool.
//!
//! Extracts definitions from one file, or from every supported file in a
//! directory walk that honors ignore files.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{split_extensions, ExtractionConfig, ALWAYS_SKIPPED_DIRS};
use crate::definition::{CodeDefinition, DefinitionKind};
use crate::error::ExtractError;
use crate::service::CodeParserService;

/// Arguments of an extraction request.
///
/// Unset flags fall back to the tool's [`ExtractionConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractRequest {
    /// Single file to extract from. Wins over `directory`.
    pub file_path: Option<String>,

    /// Directory to walk.
    pub directory: Option<String>,

    pub recursive: Option<bool>,
    pub include_hidden: Option<bool>,
    pub respect_gitignore: Option<bool>,

    /// Extensions to include, with or without a leading dot.
    pub file_extensions: Option<Vec<String>>,
}

impl ExtractRequest {
    /// Request for a single file.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            file_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Request for a directory walk.
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            directory: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = Some(recursive);
        self
    }

    pub fn include_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = Some(include_hidden);
        self
    }

    pub fn respect_gitignore(mut self, respect_gitignore: bool) -> Self {
        self.respect_gitignore = Some(respect_gitignore);
        self
    }

    pub fn file_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }
}

/// Flattened, serializable form of a [`CodeDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DefinitionKind,
    pub file_path: String,
    pub line_number: usize,
    pub end_line_number: usize,
    pub signature: String,
    pub docstring: Option<String>,
    pub parent: Option<String>,
    pub children: Vec<String>,
    pub metadata: BTreeMap<String, String>,
}

impl From<CodeDefinition> for DefinitionRecord {
    fn from(def: CodeDefinition) -> Self {
        Self {
            name: def.name,
            kind: def.kind,
            file_path: def.file_path,
            line_number: def.start_line,
            end_line_number: def.end_line,
            signature: def.signature,
            docstring: def.docstring,
            parent: def.parent,
            children: def.children,
            metadata: def.metadata,
        }
    }
}

/// Result of an extraction request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub definitions: Vec<DefinitionRecord>,
    pub error: Option<String>,
}

impl ExtractResponse {
    /// Render as JSON, the form transports pass on to callers.
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    fn success(definitions: Vec<CodeDefinition>) -> Self {
        Self {
            definitions: definitions.into_iter().map(DefinitionRecord::from).collect(),
            error: None,
        }
    }

    fn failure(err: &ExtractError) -> Self {
        Self {
            definitions: Vec::new(),
            error: Some(err.to_string()),
        }
    }
}

/// Walk settings after request values and config defaults are merged.
#[derive(Debug, Clone)]
struct WalkOptions {
    recursive: bool,
    include_hidden: bool,
    respect_gitignore: bool,
    extensions: Vec<String>,
}

/// Extracts definitions for a file or a directory.
pub struct ExtractDefinitionsTool {
    service: Arc<CodeParserService>,
    config: ExtractionConfig,
}

impl ExtractDefinitionsTool {
    /// Create a tool with default settings over every built-in language.
    pub fn new() -> Self {
        Self::with_config(ExtractionConfig::default())
    }

    /// Create a tool with custom walk settings.
    pub fn with_config(config: ExtractionConfig) -> Self {
        Self::with_service(Arc::new(CodeParserService::new()), config)
    }

    /// Create a tool over an existing service.
    pub fn with_service(service: Arc<CodeParserService>, config: ExtractionConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Run a request. Failures are reported in the response's `error`.
    pub fn execute(&self, request: &ExtractRequest) -> ExtractResponse {
        match self.run(request) {
            Ok(definitions) => ExtractResponse::success(definitions),
            Err(e) => {
                debug!(error = %e, "Extraction request failed");
                ExtractResponse::failure(&e)
            }
        }
    }

    fn run(&self, request: &ExtractRequest) -> Result<Vec<CodeDefinition>, ExtractError> {
        if let Some(file) = non_empty(&request.file_path) {
            let path = absolute(file)?;
            if !path.is_file() {
                return Err(ExtractError::NotAFile(path));
            }
            return Ok(self.service.extract_definitions(&path));
        }

        if let Some(directory) = non_empty(&request.directory) {
            let root = absolute(directory)?;
            if !root.is_dir() {
                return Err(ExtractError::NotADirectory(root));
            }
            let options = self.walk_options(request);
            let files = self.collect_files(&root, &options);
            debug!(root = %root.display(), files = files.len(), "Collected files");

            let definitions: Vec<CodeDefinition> = files
                .iter()
                .flat_map(|file| self.service.extract_definitions(file))
                .collect();
            return Ok(definitions);
        }

        Err(ExtractError::MissingTarget)
    }

    fn walk_options(&self, request: &ExtractRequest) -> WalkOptions {
        let requested: Vec<String> = request
            .file_extensions
            .iter()
            .flatten()
            .flat_map(|ext| split_extensions(ext))
            .collect();
        let extensions = if !requested.is_empty() {
            requested
        } else if !self.config.extensions.is_empty() {
            self.config
                .extensions
                .iter()
                .flat_map(|ext| split_extensions(ext))
                .collect()
        } else {
            self.service.supported_extensions()
        };

        WalkOptions {
            recursive: request.recursive.unwrap_or(self.config.recursive),
            include_hidden: request.include_hidden.unwrap_or(self.config.include_hidden),
            respect_gitignore: request
                .respect_gitignore
                .unwrap_or(self.config.respect_gitignore),
            extensions,
        }
    }

    /// Files under `root` that pass the walk filters, sorted by name within
    /// each directory.
    fn collect_files(&self, root: &Path, options: &WalkOptions) -> Vec<PathBuf> {
        let ignores = options.respect_gitignore;
        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(!options.include_hidden)
            .git_ignore(ignores)
            .git_global(ignores)
            .git_exclude(ignores)
            .ignore(ignores)
            .parents(ignores)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(|entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir
                    && ALWAYS_SKIPPED_DIRS
                        .iter()
                        .any(|skipped| entry.file_name() == OsStr::new(skipped)))
            });
        if !options.recursive {
            builder.max_depth(Some(1));
        }

        let mut files = Vec::new();
        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %ExtractError::from(err), "Skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let wanted = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase())
                .is_some_and(|e| options.extensions.contains(&e));
            if !wanted {
                continue;
            }

            match entry.metadata() {
                Ok(meta) if meta.len() > self.config.max_file_size => {
                    debug!(path = %path.display(), size = meta.len(), "Skipping large file");
                    continue;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Skipping unreadable file");
                    continue;
                }
            }

            files.push(entry.into_path());
        }
        files
    }
}

impl Default for ExtractDefinitionsTool {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn absolute(path: &str) -> Result<PathBuf, ExtractError> {
    let path = Path::new(path);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|e| ExtractError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_json() {
        let request: ExtractRequest = serde_json::from_str(
            r#"{"directory": "src", "recursive": true, "file_extensions": [".py", "rs"]}"#,
        )
        .unwrap();
        assert_eq!(request.directory.as_deref(), Some("src"));
        assert_eq!(request.recursive, Some(true));
        assert_eq!(request.include_hidden, None);
        assert_eq!(
            request.file_extensions,
            Some(vec![".py".to_string(), "rs".to_string()])
        );

        let empty: ExtractRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ExtractRequest::default());
    }

    #[test]
    fn test_record_keys() {
        let mut def = CodeDefinition::new("Foo", DefinitionKind::CaseClass, "a.scala", 3, 5, "case class Foo")
            .with_parent("pkg");
        def.add_child("bar");
        let record = DefinitionRecord::from(def);
        assert_eq!(record.line_number, 3);
        assert_eq!(record.end_line_number, 5);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "case_class");
        assert_eq!(json["line_number"], 3);
        assert_eq!(json["end_line_number"], 5);
        assert_eq!(json["parent"], "pkg");
        assert_eq!(json["children"][0], "bar");
        assert!(json["docstring"].is_null());
        assert!(json["metadata"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_missing_target() {
        let tool = ExtractDefinitionsTool::new();
        let response = tool.execute(&ExtractRequest::default());
        assert!(response.definitions.is_empty());
        assert_eq!(
            response.error.as_deref(),
            Some("Either file_path or directory must be provided")
        );

        let blank = tool.execute(&ExtractRequest::file("  "));
        assert!(blank.error.is_some());
    }

    #[test]
    fn test_walk_options_precedence() {
        let config = ExtractionConfig {
            recursive: true,
            extensions: vec!["go".to_string()],
            ..ExtractionConfig::default()
        };
        let tool = ExtractDefinitionsTool::with_config(config);

        let options = tool.walk_options(&ExtractRequest::directory("."));
        assert!(options.recursive);
        assert!(options.respect_gitignore);
        assert_eq!(options.extensions, vec!["go"]);

        let options = tool.walk_options(
            &ExtractRequest::directory(".")
                .recursive(false)
                .file_extensions([".PY", "rs"]),
        );
        assert!(!options.recursive);
        assert_eq!(options.extensions, vec!["py", "rs"]);

        let options = ExtractDefinitionsTool::new().walk_options(&ExtractRequest::directory("."));
        assert!(options.extensions.contains(&"kt".to_string()));
    }
}
