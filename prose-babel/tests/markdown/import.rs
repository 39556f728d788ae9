//! Import tests for Markdown format (Markdown → tree)
//!
//! Markdown and the equivalent raw HTML must produce the same tree, since
//! both reach the schema through the same DOM walk.

use prose_babel::formats::markdown::parser::parse_markdown_with_report;
use prose_babel::schema::vocabulary::*;
use prose_babel::{parse_markdown, Node, ParseOptions, Schema, SchemaBuilder};

fn parse(md: &str) -> Node {
    let schema = Schema::core().unwrap();
    parse_markdown(&schema, md, &ParseOptions::default())
}

fn types(node: &Node) -> Vec<&str> {
    node.content.iter().map(|n| n.node_type.as_str()).collect()
}

#[test]
fn test_html_and_markdown_give_identical_trees() {
    let pairs = [
        ("<b>x</b>", "**x**"),
        ("<strong>x</strong>", "__x__"),
        ("<i>x</i>", "*x*"),
        ("<em>x</em>", "_x_"),
        ("<s>x</s>", "~~x~~"),
        ("<code>x</code>", "`x`"),
        (r#"<a href="https://example.com">x</a>"#, "[x](https://example.com)"),
        (r#"<a href="/a" title="T">x</a>"#, r#"[x](/a "T")"#),
        ("<h2>x</h2>", "## x"),
        ("<ul><li>a</li><li>b</li></ul>", "- a\n- b"),
        ("<ol start=\"4\"><li>a</li></ol>", "4. a"),
        ("<blockquote><p>q</p></blockquote>", "> q"),
        ("<pre><code>x</code></pre>", "```\nx\n```"),
        ("<hr>", "***"),
        ("<p>a<br>b</p>", "a\\\nb"),
        (
            "<table><tr><th>h</th></tr><tr><td>c</td></tr></table>",
            "| h |\n| --- |\n| c |",
        ),
    ];
    for (html, md) in pairs {
        assert_eq!(parse(html), parse(md), "{html} vs {md}");
    }
}

#[test]
fn test_paragraph_simple() {
    let doc = parse("This is a simple paragraph.\n");
    assert_eq!(types(&doc), vec![PARAGRAPH]);
    assert_eq!(doc.content[0].text_content(), "This is a simple paragraph.");
}

#[test]
fn test_all_heading_levels() {
    let doc = parse("# 1\n## 2\n### 3\n#### 4\n##### 5\n###### 6\n####### 7");
    let levels: Vec<Option<i64>> = doc.content.iter().map(|n| n.attr_int("level")).collect();
    assert_eq!(
        levels,
        vec![Some(1), Some(2), Some(3), Some(4), Some(5), Some(6), None]
    );
    assert_eq!(doc.content[6].node_type, PARAGRAPH);
}

#[test]
fn test_nested_block_structure() {
    let doc = parse("> - one\n>   - two\n");
    let quote = &doc.content[0];
    assert_eq!(quote.node_type, BLOCKQUOTE);
    let outer = &quote.content[0];
    assert_eq!(outer.node_type, BULLET_LIST);
    let item = &outer.content[0];
    assert_eq!(types(item), vec![PARAGRAPH, BULLET_LIST]);
    assert_eq!(item.content[1].text_content(), "two");
}

#[test]
fn test_code_block_keeps_whitespace_and_markup() {
    let doc = parse("```\n  *not* <b>bold</b>\n\n  indented\n```\n");
    let code = &doc.content[0];
    assert_eq!(code.node_type, CODE_BLOCK);
    assert_eq!(code.text_content(), "  *not* <b>bold</b>\n\n  indented");
    assert!(code.content.iter().all(|n| n.marks.is_empty()));
}

#[test]
fn test_mixed_marks() {
    let doc = parse("***both*** and [**bold link**](https://a.b)");
    let para = &doc.content[0];
    let first: Vec<&str> = para.content[0]
        .marks
        .iter()
        .map(|m| m.mark_type.as_str())
        .collect();
    assert_eq!(first, vec![BOLD, ITALIC]);

    let link_text = para.content.last().unwrap();
    let last: Vec<&str> = link_text.marks.iter().map(|m| m.mark_type.as_str()).collect();
    assert_eq!(last, vec![LINK, BOLD]);
}

#[test]
fn test_image_mode_changes_tree_shape() {
    let md = "See ![logo](logo.png \"Logo\") here";

    let block = parse(md);
    assert_eq!(types(&block), vec![PARAGRAPH, IMAGE, PARAGRAPH]);
    assert_eq!(block.content[1].attr_str("title"), Some("Logo"));

    let schema = SchemaBuilder::core().image_inline(true).build().unwrap();
    let inline = parse_markdown(&schema, md, &ParseOptions::default());
    assert_eq!(types(&inline), vec![PARAGRAPH]);
    assert_eq!(types(&inline.content[0]), vec!["text", IMAGE, "text"]);
}

#[test]
fn test_unknown_html_is_dropped_and_reported() {
    let schema = Schema::core().unwrap();
    let md = "<div>\n\nkept <sup>2</sup>\n\n</div>\n\n<script>alert(1)</script>\n";
    let (doc, report) = parse_markdown_with_report(&schema, md, &ParseOptions::default());

    assert_eq!(doc.text_content(), "kept 2");
    assert_eq!(report.dropped.get("div"), Some(&1));
    assert_eq!(report.dropped.get("sup"), Some(&1));
    assert_eq!(report.dropped.get("script"), Some(&1));
}

#[test]
fn test_parse_never_fails_on_malformed_input() {
    let inputs = [
        "<p><b>unclosed",
        "</li></ul> stray closers",
        "| a | b |\n| --- |\n| c | d |",
        "<table><td>x",
        "[broken](",
        "\u{0}\u{feff}",
    ];
    let schema = Schema::core().unwrap();
    for input in inputs {
        let doc = parse_markdown(&schema, input, &ParseOptions::default());
        assert_eq!(doc.node_type, DOC);
        assert!(schema.check(&doc).is_ok(), "{input:?} gave {doc:?}");
    }
}

#[test]
fn test_mismatched_delimiter_row_is_not_a_table() {
    let doc = parse("| a | b |\n| --- |\n| c | d |");
    assert!(doc.content.iter().all(|n| n.node_type != TABLE));
}
