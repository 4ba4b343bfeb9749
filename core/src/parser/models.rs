//! # Data Models
//!
//! Intermediate Representation (IR) of a parsed Go source file.
//! Only the shapes the injector rewrites are modelled: imports, struct
//! declarations with their fields and tags, and method receivers.

use crate::span::Span;

/// A single comment token (`// ...` or `/* ... */`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Byte range of the comment including its delimiters.
    pub span: Span,
    /// Raw comment text including the leading `//` or `/*`.
    pub text: String,
    /// Zero-based line the comment starts on.
    pub start_row: usize,
    /// Zero-based line the comment ends on.
    pub end_row: usize,
    /// Whether only whitespace precedes the comment on its line.
    pub own_line: bool,
}

/// The struct tag literal trailing a field declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagLiteral {
    /// Byte range of the literal including its delimiters.
    pub span: Span,
    /// `true` for a backtick literal, `false` for an interpreted `"..."` literal.
    pub raw: bool,
    /// The literal text without its delimiters.
    pub text: String,
}

/// A field extracted from a struct type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedField {
    /// Declared names. Empty for embedded fields, several for `A, B string`.
    pub names: Vec<String>,
    /// Leading doc comments, top to bottom.
    pub docs: Vec<Comment>,
    /// The tag literal, if the field carries one.
    pub tag: Option<TagLiteral>,
}

impl ParsedField {
    /// The field name directives are keyed by (the first declared name).
    pub fn name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }
}

/// A struct type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStruct {
    /// The struct name.
    pub name: String,
    /// Byte range of the enclosing `type` declaration.
    ///
    /// For grouped declarations (`type ( ... )`) this covers the whole group,
    /// so that code inserted after it stays outside the parentheses.
    pub decl: Span,
    /// Leading doc comments of the declaration (or of the spec inside a group).
    pub docs: Vec<Comment>,
    /// The list of fields, in source order.
    pub fields: Vec<ParsedField>,
}

/// One import spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedImport {
    /// Explicit package name (`rgx`, `_`, `.`), if any.
    pub name: Option<String>,
    /// Unquoted import path.
    pub path: String,
    /// Byte range of the import spec.
    pub spec: Span,
    /// Byte range of the enclosing `import` declaration.
    pub decl: Span,
    /// Whether the spec sits inside a parenthesized import block.
    pub grouped: bool,
}

impl ParsedImport {
    /// The identifier the imported package is referred to by, if it has one.
    ///
    /// Blank (`_`) and dot (`.`) imports have no usable qualifier.
    pub fn qualifier(&self) -> Option<&str> {
        match self.name.as_deref() {
            Some("_") | Some(".") => None,
            Some(name) => Some(name),
            None => self.path.rsplit('/').next(),
        }
    }
}

/// A method declaration, reduced to what duplicate detection needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMethod {
    /// Base type name of the receiver (pointer and type arguments stripped).
    pub receiver: String,
    /// The method name.
    pub name: String,
}

/// A whole Go source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFile {
    /// The package name.
    pub package: String,
    /// Byte range of the `package` clause.
    pub package_clause: Span,
    /// All import specs, in source order.
    pub imports: Vec<ParsedImport>,
    /// Struct declarations, in source order.
    pub structs: Vec<ParsedStruct>,
    /// Method declarations, in source order.
    pub methods: Vec<ParsedMethod>,
    /// Every type name declared at the top level.
    pub type_names: Vec<String>,
    /// Every comment in the file, in source order.
    pub comments: Vec<Comment>,
}

impl ParsedFile {
    /// Looks up a struct by name.
    pub fn find_struct(&self, name: &str) -> Option<&ParsedStruct> {
        self.structs.iter().find(|s| s.name == name)
    }

    /// Whether `receiver` already has a method called `name`.
    pub fn has_method(&self, receiver: &str, name: &str) -> bool {
        self.methods
            .iter()
            .any(|m| m.receiver == receiver && m.name == name)
    }

    /// Whether a top-level type called `name` is declared.
    pub fn declares_type(&self, name: &str) -> bool {
        self.type_names.iter().any(|t| t == name)
    }
}
