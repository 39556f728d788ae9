//! Export tests for Markdown format (tree → Markdown)
//!
//! Most cases parse a Markdown string and serialize it back: for the
//! constructs the serializer writes natively, the text must come back unchanged.

use insta::assert_snapshot;
use prose_babel::format::Format;
use prose_babel::formats::markdown::MarkdownFormat;
use prose_babel::schema::vocabulary::*;
use prose_babel::schema::{ContentRule, DomSpec, NodeSpec, ParseRule};
use prose_babel::{
    parse_markdown, serialize_markdown, ConversionOptions, FormatError, Mark, Node, ParseOptions,
    Schema, SchemaBuilder, SerializeOptions,
};
use std::sync::Arc;

fn md_round_trip(md: &str) -> String {
    let schema = Schema::core().unwrap();
    let doc = parse_markdown(&schema, md, &ParseOptions::default());
    serialize_markdown(&schema, &doc, &SerializeOptions::default()).unwrap()
}

#[test]
fn test_inline_constructs_round_trip() {
    let cases = [
        "**example**",
        "*example*",
        "~~example~~",
        "`example`",
        "<u>example</u>",
        "[example](https://example.com)",
        "[example](https://example.com \"Title\")",
        "<https://example.com>",
        "plain **bold *both*** end",
        "a\\\nb",
    ];
    for md in cases {
        assert_eq!(md_round_trip(md), md, "round trip of {md:?}");
    }
}

#[test]
fn test_block_constructs_round_trip() {
    let cases = [
        "# Heading",
        "###### Six",
        "---",
        "> quoted\n>\n> twice",
        "```rust\nfn main() {}\n```",
        "* a\n\n* b",
        "1. one\n\n2. two",
        "![alt](image.png \"Title\")",
        "first\n\nsecond",
    ];
    for md in cases {
        assert_eq!(md_round_trip(md), md, "round trip of {md:?}");
    }
}

#[test]
fn test_escaping_survives_round_trip() {
    assert_snapshot!(md_round_trip(r"1\. not a list, \*not emphasis\*"), @r"1\. not a list, \*not emphasis\*");
    assert_snapshot!(md_round_trip(r"\# not a heading"), @r"\# not a heading");
    assert_snapshot!(md_round_trip("snake_case_name"), @"snake_case_name");
}

#[test]
fn test_whitespace_moves_outside_emphasis() {
    let schema = Schema::core().unwrap();
    let doc = Node::new(DOC).with_content(vec![Node::new(PARAGRAPH).with_content(vec![
        Node::text("say"),
        Node::text(" loud ").with_marks(vec![Mark::new(BOLD)]),
        Node::text("words"),
    ])]);
    let md = serialize_markdown(&schema, &doc, &SerializeOptions::default()).unwrap();
    assert_snapshot!(md, @"say **loud** words");
}

#[test]
fn test_list_markers_and_tightness() {
    let schema = Schema::core().unwrap();
    let doc = parse_markdown(&schema, "- a\n- b\n  - c", &ParseOptions::default());

    let loose = serialize_markdown(&schema, &doc, &SerializeOptions::default()).unwrap();
    assert_snapshot!(loose, @r"
    * a

    * b

      * c
    ");

    let options = SerializeOptions {
        tight_lists: true,
        bullet_list_marker: '-',
        ..SerializeOptions::default()
    };
    let tight = serialize_markdown(&schema, &doc, &options).unwrap();
    assert_snapshot!(tight, @r"
    - a
    - b
      - c
    ");
}

#[test]
fn test_ordered_list_numbering_from_start() {
    let md = md_round_trip("8. a\n9. b\n10. c");
    assert_eq!(md, " 8. a\n\n 9. b\n\n10. c");
}

#[test]
fn test_code_block_fence_grows() {
    let md = md_round_trip("````\n```\ninner\n```\n````");
    assert_snapshot!(md, @r"
    ````
    ```
    inner
    ```
    ````
    ");
}

fn schema_with_callout() -> Schema {
    SchemaBuilder::core()
        .node(
            NodeSpec::block("callout", ContentRule::Inline)
                .parse_rule(ParseRule::tag("aside"))
                .dom(DomSpec::new("aside").with_static("class", "callout")),
        )
        .build()
        .unwrap()
}

#[test]
fn test_unmapped_node_with_html_fallback() {
    let schema = schema_with_callout();
    let doc = parse_markdown(
        &schema,
        "<aside>Careful <b>now</b></aside>\n\nafter",
        &ParseOptions::default(),
    );
    assert_eq!(doc.content[0].node_type, "callout");

    let md = serialize_markdown(&schema, &doc, &SerializeOptions::default()).unwrap();
    assert_snapshot!(md, @r#"
    <aside class="callout">Careful <strong>now</strong></aside>

    after
    "#);

    // The HTML goes back through the aside parse rule.
    let again = parse_markdown(&schema, &md, &ParseOptions::default());
    assert_eq!(again, doc);
}

#[test]
fn test_unmapped_node_without_html_fallback() {
    let schema = schema_with_callout();
    let doc = Node::new(DOC).with_content(vec![
        Node::new("callout").with_content(vec![Node::text("Careful")]),
        Node::new(PARAGRAPH).with_content(vec![Node::text("after")]),
    ]);
    let options = SerializeOptions {
        html_fallback: false,
        ..SerializeOptions::default()
    };
    let md = serialize_markdown(&schema, &doc, &options).unwrap();
    assert_snapshot!(md, @r"
    [callout]

    after
    ");
}

#[test]
fn test_node_without_dom_spec_falls_back_to_placeholder() {
    let schema = SchemaBuilder::core()
        .node(NodeSpec::block("embed", ContentRule::Empty).attr("url", "x"))
        .build()
        .unwrap();
    let doc = Node::new(DOC).with_content(vec![Node::new("embed")]);
    let md = serialize_markdown(&schema, &doc, &SerializeOptions::default()).unwrap();
    assert_eq!(md, "[embed]");
}

#[test]
fn test_invalid_trees_are_rejected() {
    let schema = Schema::core().unwrap();
    let invalid = [
        Node::new(DOC).with_content(vec![Node::text("inline directly in doc")]),
        Node::new(DOC).with_content(vec![Node::new("sparkle")]),
        Node::new(DOC).with_content(vec![Node::new(CODE_BLOCK).with_content(vec![
            Node::text("x").with_marks(vec![Mark::new(BOLD)]),
        ])]),
        Node::new(DOC).with_content(vec![Node::new(BULLET_LIST)]),
    ];
    for doc in invalid {
        let result = serialize_markdown(&schema, &doc, &SerializeOptions::default());
        assert!(
            matches!(result, Err(FormatError::InvalidTree(_))),
            "{doc:?} gave {result:?}"
        );
    }
}

#[test]
fn test_markdown_format_uses_its_options() {
    let schema = Arc::new(Schema::core().unwrap());
    let mut options = ConversionOptions::default();
    options.serialize.tight_lists = true;
    options.parse.linkify = true;
    let format = MarkdownFormat::new(schema, options);

    let doc = format.parse("- see https://example.com\n- two").unwrap();
    let md = format.serialize(&doc).unwrap();
    assert_snapshot!(md, @r"
    * see <https://example.com>
    * two
    ");
}

#[test]
fn test_literal_markup_text_stays_text() {
    let schema = Schema::core().unwrap();
    let literal = ParseOptions {
        allow_html: false,
        ..ParseOptions::default()
    };
    let doc = parse_markdown(&schema, "a <b>bold</b> &amp;copy; x", &literal);
    assert_eq!(doc.content[0].text_content(), "a <b>bold</b> &copy; x");

    let md = serialize_markdown(&schema, &doc, &SerializeOptions::default()).unwrap();
    assert_eq!(md, "a \\<b>bold\\</b> \\&copy; x");
    assert_eq!(parse_markdown(&schema, &md, &ParseOptions::default()), doc);
}
