//! # Directive Patterns
//!
//! Pure recognizers for directive comments. Each takes the raw comment text and
//! returns the payload, or `None` when the comment is not that directive.
//! Patterns are compiled once and never mutated afterwards.

use crate::directive::DirectiveKind;
use regex::Regex;
use std::sync::OnceLock;

fn inject_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^//.*?@inject_tag\s*:\s*(.*)$").expect("Invalid regex"))
}

fn validation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^//.*?@validation\s*:\s*(.*)$").expect("Invalid regex"))
}

fn orm_table_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^//.*?@inject_(?:beego_)?orm_table\s*:\s*(.*)$").expect("Invalid regex")
    })
}

fn interface_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^//.*?@inject_interface\s*:\s*(.*)$").expect("Invalid regex"))
}

fn capture(re: &Regex, comment: &str) -> Option<String> {
    let payload = re.captures(comment)?.get(1)?.as_str().trim();
    if payload.is_empty() {
        None
    } else {
        Some(payload.to_string())
    }
}

/// Payload of an `@inject_tag:` comment.
///
/// # Examples
/// ```
/// use goinject_core::directive::patterns::tag_from_comment;
///
/// assert_eq!(tag_from_comment(r#"// @inject_tag: valid:"abc""#).as_deref(), Some(r#"valid:"abc""#));
/// assert_eq!(tag_from_comment("// @inject_tag:"), None);
/// ```
pub fn tag_from_comment(comment: &str) -> Option<String> {
    capture(inject_tag_re(), comment)
}

/// Payload of a `@validation:` comment.
pub fn validation_from_comment(comment: &str) -> Option<String> {
    capture(validation_re(), comment)
}

/// Raw payload of an `@inject_orm_table:` comment, before sanitizing.
pub fn orm_table_from_comment(comment: &str) -> Option<String> {
    capture(orm_table_re(), comment)
}

/// Raw payload of an `@inject_interface:` comment, before sanitizing.
pub fn interface_from_comment(comment: &str) -> Option<String> {
    capture(interface_re(), comment)
}

/// Recognizes any directive in a comment.
pub fn recognize(comment: &str) -> Option<(DirectiveKind, String)> {
    if let Some(tag) = tag_from_comment(comment) {
        return Some((DirectiveKind::TagInject, tag));
    }
    if let Some(rule) = validation_from_comment(comment) {
        return Some((DirectiveKind::Validation, rule));
    }
    if let Some(table) = orm_table_from_comment(comment) {
        return Some((DirectiveKind::OrmTable, table));
    }
    interface_from_comment(comment).map(|name| (DirectiveKind::Interface, name))
}

/// Validates a marker interface name: ASCII letters only, first letter uppercased.
///
/// # Examples
/// ```
/// use goinject_core::directive::patterns::sanitize_interface_name;
///
/// assert_eq!(sanitize_interface_name("storable").as_deref(), Some("Storable"));
/// assert_eq!(sanitize_interface_name("Not_Valid"), None);
/// ```
pub fn sanitize_interface_name(name: &str) -> Option<String> {
    let mut chars = name.chars();
    let first = chars.next()?;
    if !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let mut sanitized = String::with_capacity(name.len());
    sanitized.push(first.to_ascii_uppercase());
    sanitized.extend(chars);
    Some(sanitized)
}

/// Validates an ORM table name, accepting it bare or wrapped in quotes.
pub fn sanitize_table_name(payload: &str) -> Option<String> {
    let unquoted = ['"', '`']
        .iter()
        .find_map(|q| {
            payload
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .unwrap_or(payload)
        .trim();

    let invalid = |c: char| c.is_control() || matches!(c, '"' | '\\' | '`');
    if unquoted.is_empty() || unquoted.contains(invalid) {
        None
    } else {
        Some(unquoted.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tag_from_comment() {
        let cases = [
            (r#"//@inject_tag: valid:"abc""#, Some(r#"valid:"abc""#)),
            (r#"//   @inject_tag: valid:"abcd""#, Some(r#"valid:"abcd""#)),
            (r#"// @inject_tag:      valid:"xyz""#, Some(r#"valid:"xyz""#)),
            (r#"// @inject_tag : valid:"xyz"  "#, Some(r#"valid:"xyz""#)),
            ("// fdsafsa", None),
            ("//@inject_tag:", None),
            ("//@inject_tag:   ", None),
            (r#"// @inject_tag: json:"abc" yaml:"abc"#, Some(r#"json:"abc" yaml:"abc"#)),
            (r#"// test @inject_tag: json:"abc" yaml:"abc"#, Some(r#"json:"abc" yaml:"abc"#)),
            (r#"/* @inject_tag: json:"abc" */"#, None),
            (r#"// @Inject_Tag: json:"abc""#, None),
        ];
        for (comment, expected) in cases {
            assert_eq!(tag_from_comment(comment).as_deref(), expected, "comment: {comment:?}");
        }
    }

    #[test]
    fn test_recognize_kinds() {
        assert_eq!(
            recognize(r#"// @validation: "^[a-z]+$""#),
            Some((DirectiveKind::Validation, r#""^[a-z]+$""#.to_string()))
        );
        assert_eq!(
            recognize(r#"// @inject_orm_table: "ip""#),
            Some((DirectiveKind::OrmTable, r#""ip""#.to_string()))
        );
        assert_eq!(
            recognize(r#"// @inject_beego_orm_table: "url""#),
            Some((DirectiveKind::OrmTable, r#""url""#.to_string()))
        );
        assert_eq!(
            recognize("// @inject_interface: Storable"),
            Some((DirectiveKind::Interface, "Storable".to_string()))
        );
        assert_eq!(recognize("// Address is the peer address."), None);
    }

    #[test]
    fn test_sanitize_interface_name() {
        assert_eq!(sanitize_interface_name("Storable").as_deref(), Some("Storable"));
        assert_eq!(sanitize_interface_name("storable").as_deref(), Some("Storable"));
        assert_eq!(sanitize_interface_name("httpHandler").as_deref(), Some("HttpHandler"));
        assert_eq!(sanitize_interface_name(""), None);
        assert_eq!(sanitize_interface_name("Stor4ble"), None);
        assert_eq!(sanitize_interface_name("Stor able"), None);
        assert_eq!(sanitize_interface_name("Störable"), None);
    }

    #[test]
    fn test_sanitize_table_name() {
        assert_eq!(sanitize_table_name(r#""ip""#).as_deref(), Some("ip"));
        assert_eq!(sanitize_table_name("url").as_deref(), Some("url"));
        assert_eq!(sanitize_table_name("`t_user`").as_deref(), Some("t_user"));
        assert_eq!(sanitize_table_name(r#""""#), None);
        assert_eq!(sanitize_table_name(r#""a"b""#), None);
        assert_eq!(sanitize_table_name(r#"a\b"#), None);
    }
}
