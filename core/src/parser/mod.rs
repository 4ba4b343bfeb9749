#![deny(missing_docs)]

//! # Parser Module
//!
//! Handles parsing of Go source code using the tree-sitter Go grammar.
//! Extracts struct declarations, fields, struct tags, doc comments, imports and
//! method receivers, each with exact byte offsets into the original source.

pub(crate) mod comments;
pub mod extractors;
pub mod models;

pub use extractors::parse_go;
pub use models::{
    Comment, ParsedField, ParsedFile, ParsedImport, ParsedMethod, ParsedStruct, TagLiteral,
};
