#![deny(missing_docs)]

//! # Directives
//!
//! Comment-encoded instructions attached to Go structs and fields.
//!
//! - **patterns**: pure recognizers turning one comment into a directive payload.
//! - **extract**: walks a parsed file and collects directives in source order.

pub mod extract;
pub mod patterns;

pub use extract::{extract_directives, Extraction};

use crate::span::Span;
use derive_more::Display;

/// The kind of a recognized directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DirectiveKind {
    /// `@inject_tag:` merges its payload into the field tag.
    #[display("inject_tag")]
    TagInject,
    /// Synthesized for skip-prefixed fields: every skip token set to `"-"`.
    #[display("skip_tags")]
    SkipTags,
    /// `@validation:` registers a pattern the field must match.
    #[display("validation")]
    Validation,
    /// `@inject_orm_table:` synthesizes a `TableName()` accessor.
    #[display("orm_table")]
    OrmTable,
    /// `@inject_interface:` synthesizes a marker interface and its stub.
    #[display("interface")]
    Interface,
}

impl DirectiveKind {
    /// Whether the directive belongs on a struct declaration rather than a field.
    pub fn is_struct_level(&self) -> bool {
        matches!(self, DirectiveKind::OrmTable | DirectiveKind::Interface)
    }

    /// Whether the directive edits the field's tag literal.
    pub fn edits_tag(&self) -> bool {
        matches!(self, DirectiveKind::TagInject | DirectiveKind::SkipTags)
    }
}

/// One recognized directive occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// What the directive asks for.
    pub kind: DirectiveKind,
    /// The payload following the prefix, trimmed (and sanitized for struct-level kinds).
    pub payload: String,
    /// The struct the directive belongs to.
    pub owner_decl: String,
    /// The field the directive belongs to, for field-level kinds.
    pub owner_field: Option<String>,
    /// The comment the directive was read from. `None` for synthesized skip directives.
    pub comment: Option<Span>,
}
