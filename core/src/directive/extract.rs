//! # Directive Extraction
//!
//! Walks the structs of a parsed file and collects their directives in source
//! order: struct-level directives first, then each field's directives top to bottom.

use crate::directive::patterns::{recognize, sanitize_interface_name, sanitize_table_name};
use crate::directive::{Directive, DirectiveKind};
use crate::options::Options;
use crate::parser::{Comment, ParsedFile, ParsedStruct};
use log::{debug, warn};

/// The directives of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Valid directives, in source order.
    pub directives: Vec<Directive>,
    /// Directives recognized but rejected (invalid interface or table name).
    pub dropped: usize,
}

/// Collects every directive in `file`.
///
/// Unrecognized comments are ignored. Struct-level directives written on a field, and
/// field-level directives written on a struct, are ignored as well.
pub fn extract_directives(file: &ParsedFile, options: &Options) -> Extraction {
    let mut extraction = Extraction::default();
    let skip_payload = skip_payload(options);

    for item in &file.structs {
        extract_struct_directives(item, &mut extraction);

        for field in &item.fields {
            let Some(field_name) = field.name() else {
                continue;
            };

            if options.is_skipped_field(field_name) {
                extraction.directives.push(Directive {
                    kind: DirectiveKind::SkipTags,
                    payload: skip_payload.clone(),
                    owner_decl: item.name.clone(),
                    owner_field: Some(field_name.to_string()),
                    comment: None,
                });
            }

            for doc in &field.docs {
                let Some((kind, payload)) = recognize(&doc.text) else {
                    continue;
                };
                if kind.is_struct_level() {
                    debug!(kind:% = kind, field = field_name; "Ignoring struct directive on a field");
                    continue;
                }

                extraction.directives.push(Directive {
                    kind,
                    payload,
                    owner_decl: item.name.clone(),
                    owner_field: Some(field_name.to_string()),
                    comment: Some(doc.span),
                });
            }
        }
    }

    extraction
}

fn extract_struct_directives(item: &ParsedStruct, extraction: &mut Extraction) {
    for doc in &item.docs {
        let Some((kind, payload)) = recognize(&doc.text) else {
            continue;
        };

        let sanitized = match kind {
            DirectiveKind::OrmTable => sanitize_table_name(&payload),
            DirectiveKind::Interface => sanitize_interface_name(&payload),
            _ => {
                debug!(kind:% = kind, decl = item.name.as_str(); "Ignoring field directive on a struct");
                continue;
            }
        };

        match sanitized {
            Some(payload) => extraction
                .directives
                .push(struct_directive(item, kind, payload, doc)),
            None => {
                warn!(
                    kind:% = kind, decl = item.name.as_str(), payload = payload.as_str();
                    "Dropping directive with invalid name"
                );
                extraction.dropped += 1;
            }
        }
    }
}

fn struct_directive(item: &ParsedStruct, kind: DirectiveKind, payload: String, doc: &Comment) -> Directive {
    Directive {
        kind,
        payload,
        owner_decl: item.name.clone(),
        owner_field: None,
        comment: Some(doc.span),
    }
}

/// `token:"-"` for every configured skip token.
fn skip_payload(options: &Options) -> String {
    options
        .skip_tokens
        .iter()
        .map(|token| format!("{}:\"-\"", token))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_go;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = r#"package pb

// @inject_orm_table: "ip"
// @inject_interface: storable
// @inject_tag: json:"ignored"
type IP struct {
	// @inject_tag: valid:"ip" yaml:"ip" json:"overrided"
	// unrelated note
	// @validation: "^[0-9.]+$"
	Address string `protobuf:"bytes,1,opt,name=Address,proto3" json:"Address,omitempty"`
	// @inject_orm_table: "nope"
	Port int32 `protobuf:"varint,2,opt,name=port"`
	XXX_unrecognized []byte `json:"-"`
}

// @inject_interface: Bad_Name
type Empty struct{}
"#;

    fn summary(extraction: &Extraction) -> Vec<(DirectiveKind, &str, Option<&str>, &str)> {
        extraction
            .directives
            .iter()
            .map(|d| {
                (
                    d.kind,
                    d.owner_decl.as_str(),
                    d.owner_field.as_deref(),
                    d.payload.as_str(),
                )
            })
            .collect()
    }

    #[test]
    fn test_source_order_and_kinds() {
        let file = parse_go(SOURCE).unwrap();
        let extraction = extract_directives(&file, &Options::default());

        assert_eq!(
            summary(&extraction),
            vec![
                (DirectiveKind::OrmTable, "IP", None, "ip"),
                (DirectiveKind::Interface, "IP", None, "Storable"),
                (
                    DirectiveKind::TagInject,
                    "IP",
                    Some("Address"),
                    r#"valid:"ip" yaml:"ip" json:"overrided""#
                ),
                (DirectiveKind::Validation, "IP", Some("Address"), r#""^[0-9.]+$""#),
            ]
        );
        assert_eq!(extraction.dropped, 1);
    }

    #[test]
    fn test_comment_spans_point_at_source() {
        let file = parse_go(SOURCE).unwrap();
        let extraction = extract_directives(&file, &Options::default());

        let validation = &extraction.directives[3];
        let span = validation.comment.unwrap();
        assert_eq!(&SOURCE[span.range()], r#"// @validation: "^[0-9.]+$""#);
    }

    #[test]
    fn test_skip_tokens() {
        let file = parse_go(SOURCE).unwrap();
        let options = Options::default().with_skip_tokens(["xml", "json"]);
        let extraction = extract_directives(&file, &options);

        let skip: Vec<_> = extraction
            .directives
            .iter()
            .filter(|d| d.kind == DirectiveKind::SkipTags)
            .collect();
        assert_eq!(skip.len(), 1);
        assert_eq!(skip[0].owner_field.as_deref(), Some("XXX_unrecognized"));
        assert_eq!(skip[0].payload, r#"xml:"-" json:"-""#);
        assert!(skip[0].comment.is_none());
    }

    #[test]
    fn test_no_directives() {
        let file = parse_go("package pb\n\ntype A struct {\n\tB string `json:\"b\"`\n}\n").unwrap();
        let extraction = extract_directives(&file, &Options::default());
        assert!(extraction.directives.is_empty());
        assert_eq!(extraction.dropped, 0);
    }
}
