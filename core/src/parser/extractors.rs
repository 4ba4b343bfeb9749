//! # Extraction Logic
//!
//! Parses Go source with tree-sitter and lowers the concrete syntax tree into
//! the IR in [`models`](super::models).

use crate::error::{AppError, AppResult};
use crate::parser::comments::{collect_comments, leading_docs};
use crate::parser::models::{
    Comment, ParsedField, ParsedFile, ParsedImport, ParsedMethod, ParsedStruct, TagLiteral,
};
use crate::span::Span;
use tree_sitter::{Node, Parser};

/// Parses a Go source file.
///
/// Fails with [`AppError::Parse`] when the source contains syntax errors or has
/// no `package` clause; the injector never edits a file it cannot fully read.
///
/// # Examples
/// ```
/// use goinject_core::parser::parse_go;
///
/// let code = "package pb\n\ntype IP struct {\n\tAddress string `json:\"address\"`\n}\n";
/// let file = parse_go(code).unwrap();
/// assert_eq!(file.package, "pb");
/// assert_eq!(file.structs[0].name, "IP");
/// assert_eq!(file.structs[0].fields[0].tag.as_ref().unwrap().text, "json:\"address\"");
/// ```
pub fn parse_go(source: &str) -> AppResult<ParsedFile> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| AppError::General(format!("Failed to load Go grammar: {}", e)))?;

    // The grammar needs a final newline after the last declaration.
    let padded;
    let text_src = if source.ends_with('\n') {
        source
    } else {
        padded = format!("{}\n", source);
        padded.as_str()
    };

    let tree = parser
        .parse(text_src, None)
        .ok_or_else(|| AppError::Parse("parser returned no syntax tree".into()))?;
    let root = tree.root_node();

    if root.has_error() {
        let at = first_error(root).unwrap_or(root).start_position();
        return Err(AppError::Parse(format!(
            "syntax error at {}:{}",
            at.row + 1,
            at.column + 1
        )));
    }

    let src = text_src.as_bytes();
    let comments = collect_comments(root, src);

    let mut package = None;
    let mut imports = Vec::new();
    let mut structs = Vec::new();
    let mut methods = Vec::new();
    let mut type_names = Vec::new();

    let mut cursor = root.walk();
    for node in root.named_children(&mut cursor) {
        match node.kind() {
            "package_clause" => {
                if let Some(ident) = first_named(node) {
                    package = Some((text(ident, src), span(node)));
                }
            }
            "import_declaration" => collect_imports(node, src, &mut imports),
            "type_declaration" => {
                collect_types(node, src, &comments, &mut structs, &mut type_names)
            }
            "method_declaration" => {
                if let Some(method) = parse_method(node, src) {
                    methods.push(method);
                }
            }
            _ => {}
        }
    }

    let (package, package_clause) =
        package.ok_or_else(|| AppError::Parse("missing package clause".into()))?;

    let limit = source.len();
    for import in &mut imports {
        import.spec = clamp(import.spec, limit);
        import.decl = clamp(import.decl, limit);
    }
    for item in &mut structs {
        item.decl = clamp(item.decl, limit);
    }

    Ok(ParsedFile {
        package,
        package_clause: clamp(package_clause, limit),
        imports,
        structs,
        methods,
        type_names,
        comments,
    })
}

/// Finds the first error or missing node in pre-order.
fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }

        if node.has_error() && cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

fn collect_imports(decl: Node<'_>, src: &[u8], out: &mut Vec<ParsedImport>) {
    let mut cursor = decl.walk();
    for child in decl.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => out.extend(parse_import_spec(child, decl, src, false)),
            "import_spec_list" => {
                let mut list_cursor = child.walk();
                for spec in child.named_children(&mut list_cursor) {
                    if spec.kind() == "import_spec" {
                        out.extend(parse_import_spec(spec, decl, src, true));
                    }
                }
            }
            _ => {}
        }
    }
}

fn parse_import_spec(
    spec: Node<'_>,
    decl: Node<'_>,
    src: &[u8],
    grouped: bool,
) -> Option<ParsedImport> {
    let path = spec.child_by_field_name("path")?;
    let path = text(path, src);

    Some(ParsedImport {
        name: spec.child_by_field_name("name").map(|n| text(n, src)),
        path: path.trim_matches(|c| c == '"' || c == '`').to_string(),
        spec: span(spec),
        decl: span(decl),
        grouped,
    })
}

fn collect_types(
    decl: Node<'_>,
    src: &[u8],
    comments: &[Comment],
    structs: &mut Vec<ParsedStruct>,
    type_names: &mut Vec<String>,
) {
    let mut cursor = decl.walk();
    let grouped = decl.children(&mut cursor).any(|c| c.kind() == "(");

    let mut cursor = decl.walk();
    for spec in decl.named_children(&mut cursor) {
        if !matches!(spec.kind(), "type_spec" | "type_alias") {
            continue;
        }
        let Some(name) = spec.child_by_field_name("name") else {
            continue;
        };
        let name = text(name, src);
        type_names.push(name.clone());

        if spec.kind() != "type_spec" {
            continue;
        }
        let Some(ty) = spec.child_by_field_name("type") else {
            continue;
        };
        if ty.kind() != "struct_type" {
            continue;
        }

        // Doc comments sit above the spec in a group, above `type` otherwise.
        let anchor = if grouped { spec } else { decl };
        let docs = leading_docs(
            comments,
            src,
            anchor.start_byte(),
            anchor.start_position().row,
        );

        structs.push(ParsedStruct {
            name,
            decl: span(decl),
            docs,
            fields: parse_fields(ty, src, comments),
        });
    }
}

fn parse_fields(struct_type: Node<'_>, src: &[u8], comments: &[Comment]) -> Vec<ParsedField> {
    let mut fields = Vec::new();

    let mut cursor = struct_type.walk();
    let Some(list) = struct_type
        .named_children(&mut cursor)
        .find(|n| n.kind() == "field_declaration_list")
    else {
        return fields;
    };

    let mut list_cursor = list.walk();
    for field in list.named_children(&mut list_cursor) {
        if field.kind() != "field_declaration" {
            continue;
        }

        let mut name_cursor = field.walk();
        let names = field
            .children_by_field_name("name", &mut name_cursor)
            .map(|n| text(n, src))
            .collect();

        let tag = field
            .child_by_field_name("tag")
            .and_then(|t| parse_tag_literal(t, src));

        fields.push(ParsedField {
            names,
            docs: leading_docs(comments, src, field.start_byte(), field.start_position().row),
            tag,
        });
    }

    fields
}

fn parse_tag_literal(node: Node<'_>, src: &[u8]) -> Option<TagLiteral> {
    let raw = match node.kind() {
        "raw_string_literal" => true,
        "interpreted_string_literal" => false,
        _ => return None,
    };

    let (start, end) = (node.start_byte(), node.end_byte());
    if end < start + 2 {
        return None;
    }

    Some(TagLiteral {
        span: Span::new(start, end),
        raw,
        text: String::from_utf8_lossy(&src[start + 1..end - 1]).into_owned(),
    })
}

fn parse_method(node: Node<'_>, src: &[u8]) -> Option<ParsedMethod> {
    let name = node.child_by_field_name("name")?;
    let receiver = node.child_by_field_name("receiver")?;

    let mut cursor = receiver.walk();
    let param = receiver
        .named_children(&mut cursor)
        .find(|n| n.kind() == "parameter_declaration")?;
    let ty = param.child_by_field_name("type")?;

    Some(ParsedMethod {
        receiver: receiver_base(ty, src)?,
        name: text(name, src),
    })
}

/// Strips pointers, parentheses and type arguments from a receiver type.
fn receiver_base(ty: Node<'_>, src: &[u8]) -> Option<String> {
    match ty.kind() {
        "type_identifier" => Some(text(ty, src)),
        "pointer_type" | "parenthesized_type" => receiver_base(first_named(ty)?, src),
        "generic_type" => receiver_base(ty.child_by_field_name("type")?, src),
        _ => None,
    }
}

fn first_named(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let first = node.named_children(&mut cursor).next();
    first
}

fn text(node: Node<'_>, src: &[u8]) -> String {
    node.utf8_text(src).unwrap_or_default().to_string()
}

/// Keeps a span inside the caller's source when parsing added a final newline.
fn clamp(span: Span, limit: usize) -> Span {
    Span::new(span.start.min(limit), span.end.min(limit))
}

fn span(node: Node<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}
