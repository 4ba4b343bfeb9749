#![deny(missing_docs)]

//! # Code Generation
//!
//! Builds the Go declarations spliced into rewritten files:
//! - `Validate() bool` methods from `@validation` rules.
//! - `TableName() string` accessors from `@inject_orm_table`.
//! - Marker interfaces and their stub methods from `@inject_interface`.
//! - The `regexp` import the validators depend on.
//!
//! Every function returns a bare declaration without leading or trailing newlines;
//! placement and spacing are decided by the planner.

use heck::ToLowerCamelCase;

/// Package alias used when the file does not import `regexp` already.
pub const REGEXP_ALIAS: &str = "rgx";

/// Suffix appended to the lower-camel interface name to form the marker method.
pub const MARKER_SUFFIX: &str = "Marker";

/// Name of the synthesized validator method.
pub const VALIDATE_METHOD: &str = "Validate";

/// Name of the synthesized ORM accessor.
pub const TABLE_NAME_METHOD: &str = "TableName";

/// One `@validation` rule of a struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRule<'a> {
    /// The Go field the rule checks.
    pub field: &'a str,
    /// The pattern, quoted or bare.
    pub pattern: &'a str,
}

/// Builds a validator method that checks every rule in order and fails on the first miss.
///
/// `regexp` is the identifier the `regexp` package is imported under.
///
/// # Examples
/// ```
/// use goinject_core::codegen::{validator_method, ValidationRule};
///
/// let rules = [ValidationRule { field: "Scheme", pattern: "http|https" }];
/// let code = validator_method("URL", &rules, "rgx");
/// assert!(code.starts_with("func (m *URL) Validate() bool {"));
/// assert!(code.contains("rgx.MustCompile(`http|https`).MatchString(m.Scheme)"));
/// ```
pub fn validator_method(struct_name: &str, rules: &[ValidationRule<'_>], regexp: &str) -> String {
    let mut code = format!("func (m *{}) {}() bool {{\n", struct_name, VALIDATE_METHOD);

    for rule in rules {
        code.push_str(&format!(
            "\tif !{}.MustCompile({}).MatchString(m.{}) {{\n\t\treturn false\n\t}}\n",
            regexp,
            pattern_literal(rule.pattern),
            rule.field
        ));
    }

    code.push_str("\treturn true\n}");
    code
}

/// Builds the ORM table name accessor.
pub fn table_name_method(struct_name: &str, table: &str) -> String {
    format!(
        "func (*{}) {}() string {{\n\treturn {}\n}}",
        struct_name,
        TABLE_NAME_METHOD,
        go_quote(table)
    )
}

/// The marker method of an interface: lower-camel name plus [`MARKER_SUFFIX`].
///
/// # Examples
/// ```
/// use goinject_core::codegen::marker_method_name;
///
/// assert_eq!(marker_method_name("Storable"), "storableMarker");
/// ```
pub fn marker_method_name(interface: &str) -> String {
    format!("{}{}", interface.to_lower_camel_case(), MARKER_SUFFIX)
}

/// Builds the marker interface declaration.
pub fn marker_interface(interface: &str) -> String {
    format!(
        "// {name} is a marker interface.\ntype {name} interface {{\n\t{method}()\n}}",
        name = interface,
        method = marker_method_name(interface)
    )
}

/// Builds the stub method that makes `struct_name` satisfy `interface`.
pub fn marker_stub(struct_name: &str, interface: &str) -> String {
    format!("func (*{}) {}() {{}}", struct_name, marker_method_name(interface))
}

/// Renders `alias "path"` for an import spec.
pub fn import_spec(alias: &str, path: &str) -> String {
    format!("{} {}", alias, go_quote(path))
}

/// Turns a validation pattern into a Go string literal.
///
/// Patterns that already form one complete, well-formed Go string literal are
/// kept verbatim. Anything else is bare text and becomes a raw literal, or an
/// interpreted literal when it contains a backtick.
pub fn pattern_literal(pattern: &str) -> String {
    if is_go_string_literal(pattern) {
        pattern.to_string()
    } else if pattern.contains('`') {
        go_quote(pattern)
    } else {
        format!("`{}`", pattern)
    }
}

/// Whether `text` is exactly one Go string literal, raw or interpreted.
fn is_go_string_literal(text: &str) -> bool {
    if let Some(body) = text
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    {
        return !body.contains('`');
    }

    let Some(body) = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return false;
    };
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\n' => return false,
            b'\\' => match escape_len(&bytes[i + 1..]) {
                Some(len) => i += 1 + len,
                None => return false,
            },
            _ => i += 1,
        }
    }
    true
}

/// Length of a valid escape sequence following a backslash.
fn escape_len(rest: &[u8]) -> Option<usize> {
    let digits = |count: usize, radix: u32| {
        let text = std::str::from_utf8(rest.get(1..=count)?).ok()?;
        let valid = text.bytes().all(|b| (b as char).is_digit(radix));
        valid.then(|| u32::from_str_radix(text, radix).ok()).flatten()
    };
    match rest.first()? {
        b'a' | b'b' | b'f' | b'n' | b'r' | b't' | b'v' | b'\\' | b'"' => Some(1),
        b'0'..=b'3' => {
            let text = std::str::from_utf8(rest.get(..3)?).ok()?;
            u32::from_str_radix(text, 8).ok().map(|_| 3)
        }
        b'x' => digits(2, 16).map(|_| 3),
        b'u' => digits(4, 16).and_then(char::from_u32).map(|_| 5),
        b'U' => digits(8, 16).and_then(char::from_u32).map(|_| 9),
        _ => None,
    }
}

/// Quotes `text` as a Go interpreted string literal.
pub fn go_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                quoted.push_str(&format!("\\x{:02x}", c as u32))
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
