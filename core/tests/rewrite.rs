use goinject_core::{parse_go, rewrite_source, Options, TagItems};
use pretty_assertions::assert_eq;

const PEER: &str = include_str!("fixtures/peer.pb.go");
const PEER_GOLDEN: &str = include_str!("fixtures/peer.pb.go.golden");
const PLAIN: &str = include_str!("fixtures/plain.pb.go");

fn without_directive_lines(source: &str) -> String {
    let mut out: String = source
        .lines()
        .filter(|line| !line.contains("// @"))
        .collect::<Vec<_>>()
        .join("\n");
    out.push('\n');
    out
}

fn tag_of<'a>(source: &'a str, field: &str) -> &'a str {
    let line = source
        .lines()
        .find(|l| l.trim_start().starts_with(field))
        .unwrap();
    let start = line.find('`').unwrap();
    let end = line.rfind('`').unwrap();
    &line[start + 1..end]
}

#[test]
fn test_generated_file_matches_golden() {
    let rewrite = rewrite_source(PEER, &Options::default()).unwrap();
    assert_eq!(rewrite.output, PEER_GOLDEN);
    assert_eq!(rewrite.dropped, 0);
    assert!(rewrite.changed);
}

#[test]
fn test_url_scheme_scenario() {
    let rewrite = rewrite_source(PEER, &Options::default()).unwrap();
    assert!(rewrite.output.contains(
        "Scheme string `protobuf:\"bytes,1,opt,name=scheme,proto3\" json:\"scheme,omitempty\" valid:\"http|https\"`"
    ));
    assert!(rewrite
        .output
        .contains("Url    string `protobuf:\"bytes,2,opt,name=url,proto3\" json:\"url,omitempty\"`"));
}

#[test]
fn test_rewrite_is_idempotent() {
    let first = rewrite_source(PEER, &Options::default()).unwrap();
    let second = rewrite_source(&first.output, &Options::default()).unwrap();
    assert_eq!(second.output, first.output);
    assert_eq!(second.edits, 0);
    assert!(!second.changed);
}

#[test]
fn test_removal_mode_is_idempotent() {
    let options = Options::default().with_remove_comments(true);
    let first = rewrite_source(PEER, &options).unwrap();
    assert_eq!(first.output, without_directive_lines(PEER_GOLDEN));
    assert!(first.output.contains("\t// Port of the service.\n"));

    let second = rewrite_source(&first.output, &options).unwrap();
    assert_eq!(second.output, first.output);
    assert_eq!(second.directives, 0);
}

#[test]
fn test_no_directives_is_byte_identical() {
    let rewrite = rewrite_source(PLAIN, &Options::default()).unwrap();
    assert_eq!(rewrite.output, PLAIN);
    assert_eq!(rewrite.directives, 0);
    assert!(!rewrite.changed);
}

#[test]
fn test_skip_tokens_cover_every_bookkeeping_field() {
    let options = Options::default().with_skip_tokens(["xml", "json"]);
    let rewrite = rewrite_source(PEER, &options).unwrap();

    for field in ["XXX_NoUnkeyedLiteral", "XXX_unrecognized", "XXX_sizecache"] {
        for line in rewrite.output.lines().filter(|l| l.trim_start().starts_with(field)) {
            let tag = &line[line.find('`').unwrap() + 1..line.rfind('`').unwrap()];
            let items = TagItems::parse(tag).unwrap();
            assert_eq!(items.get("json"), Some("\"-\""), "{line}");
            assert_eq!(items.get("xml"), Some("\"-\""), "{line}");
            assert_eq!(items.len(), 2, "{line}");
        }
    }

    // Regular fields are untouched by skip tokens.
    assert!(!tag_of(&rewrite.output, "Url ").contains("xml"));
}

#[test]
fn test_order_preserved_with_growing_payloads() {
    let mut source = String::from("package pb\n\ntype Wide struct {\n");
    for i in 0..12 {
        source.push_str(&format!(
            "\t// @inject_tag: k{i}:\"{}\"\n\tF{i} string `json:\"f{i}\"`\n",
            "v".repeat(i * 3)
        ));
    }
    source.push_str("}\n");

    let rewrite = rewrite_source(&source, &Options::default()).unwrap();
    assert_eq!(rewrite.edits, 12);
    for i in 0..12 {
        let expected = format!("json:\"f{i}\" k{i}:\"{}\"", "v".repeat(i * 3));
        assert_eq!(tag_of(&rewrite.output, &format!("F{i} ")), expected);
    }
    assert!(parse_go(&rewrite.output).is_ok());
}

#[test]
fn test_output_still_parses() {
    let rewrite = rewrite_source(PEER, &Options::default()).unwrap();
    let file = parse_go(&rewrite.output).unwrap();
    assert!(file.declares_type("Storable"));
    assert!(file.has_method("URL", "Validate"));
    assert!(file.has_method("IP", "TableName"));
    assert!(file.imports.iter().any(|i| i.path == "regexp"));
}

#[test]
fn test_malformed_quoted_patterns_still_parse() {
    for pattern in [r#""a\""#, r#""x"y""#, r#""\q""#, "`a`b`"] {
        let source = format!(
            "package pb\n\ntype A struct {{\n\t// @validation: {pattern}\n\tF string `json:\"f\"`\n}}\n"
        );
        let rewrite = rewrite_source(&source, &Options::default()).unwrap();
        assert!(rewrite.output.contains("func (m *A) Validate() bool {"), "{}", rewrite.output);
        assert!(parse_go(&rewrite.output).is_ok(), "{}", rewrite.output);
    }
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn arbitrary_tag_payloads_keep_the_file_valid(payload in "[ -~]{0,40}") {
            let source = format!(
                "package pb\n\ntype A struct {{\n\t// @inject_tag: {payload}\n\tF string `json:\"f\"`\n}}\n"
            );
            let rewrite = rewrite_source(&source, &Options::default()).unwrap();
            prop_assert!(parse_go(&rewrite.output).is_ok());
            prop_assert!(rewrite.output.contains("\tF string `"));
        }

        #[test]
        fn arbitrary_directives_never_fail(
            kind in prop::sample::select(vec!["inject_tag", "validation", "inject_orm_table", "inject_interface"]),
            payload in "[ -~]{0,40}",
        ) {
            let source = format!(
                "package pb\n\n// @{kind}: {payload}\ntype A struct {{\n\t// @{kind}: {payload}\n\tF string `json:\"f\"`\n}}\n"
            );
            let rewrite = rewrite_source(&source, &Options::default()).unwrap();
            prop_assert!(parse_go(&rewrite.output).is_ok(), "{}", rewrite.output);
        }
    }
}
