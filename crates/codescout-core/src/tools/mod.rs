//! Caller-facing operations built on the parser service.
//!
//! Each tool takes a serde-deserializable request and returns a serializable
//! response that carries its own error message, so a transport layer can
//! pass both through as JSON without further mapping.

pub mod extract;

pub use extract::{DefinitionRecord, ExtractDefinitionsTool, ExtractRequest, ExtractResponse};
