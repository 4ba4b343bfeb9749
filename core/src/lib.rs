#![deny(missing_docs)]

//! # goinject Core
//!
//! Core library for injecting hand-written metadata into generated Go sources.
//! Directives written as `//` comments on structs and fields are turned into
//! struct tag edits and synthesized declarations, applied as byte-exact edits.

/// Shared error types.
pub mod error;

/// Byte ranges into the original source.
pub mod span;

/// Go parsing (tree-sitter).
pub mod parser;

/// Directive recognition and extraction.
pub mod directive;

/// Struct tag parsing and merging.
pub mod tags;

/// Go code generation.
pub mod codegen;

/// Edit plans and their application.
pub mod edit;

/// Resolution of directives to edits.
pub mod plan;

/// Rewrite configuration.
pub mod options;

/// The end-to-end rewrite of one file.
pub mod rewrite;

pub use directive::{extract_directives, Directive, DirectiveKind, Extraction};
pub use edit::{apply, apply_str, EditPlan, EditSpan};
pub use error::{AppError, AppResult};
pub use options::{Options, DEFAULT_SKIP_PREFIX};
pub use parser::{parse_go, ParsedField, ParsedFile, ParsedStruct};
pub use plan::{build_plan, Planned};
pub use rewrite::{rewrite_source, Rewrite};
pub use span::Span;
pub use tags::{merge, TagError, TagItem, TagItems};
