//! Import tests for HTML format (HTML → tree)

use prose_babel::formats::html::parser::parse_html as parse_html_with_report;
use prose_babel::schema::vocabulary::*;
use prose_babel::{parse_html, FormatRegistry, Node, Schema};
use std::sync::Arc;

fn parse(html: &str) -> Node {
    let schema = Schema::core().unwrap();
    parse_html(&schema, html)
}

fn types(node: &Node) -> Vec<&str> {
    node.content.iter().map(|n| n.node_type.as_str()).collect()
}

fn mark_names(node: &Node) -> Vec<&str> {
    node.marks.iter().map(|m| m.mark_type.as_str()).collect()
}

#[test]
fn test_nested_marks_accumulate() {
    let doc = parse("<p><b>a <i>b</i></b> c</p>");
    let para = &doc.content[0];
    assert_eq!(para.child_count(), 3);
    assert_eq!(mark_names(&para.content[0]), vec![BOLD]);
    assert_eq!(mark_names(&para.content[1]), vec![BOLD, ITALIC]);
    assert!(para.content[2].marks.is_empty());
    assert_eq!(para.text_content(), "a b c");
}

#[test]
fn test_whitespace_collapses() {
    let doc = parse("<p>  a \n\t b  </p>\n\n<p>c</p>");
    assert_eq!(types(&doc), vec![PARAGRAPH, PARAGRAPH]);
    assert_eq!(doc.content[0].text_content(), "a b");
}

#[test]
fn test_stray_content_gets_wrapped() {
    let doc = parse("loose <b>text</b><li>item</li>");
    assert_eq!(types(&doc), vec![PARAGRAPH, BULLET_LIST]);
    assert_eq!(doc.content[0].text_content(), "loose text");

    let item = &doc.content[1].content[0];
    assert_eq!(item.node_type, LIST_ITEM);
    assert_eq!(types(item), vec![PARAGRAPH]);
    assert_eq!(item.text_content(), "item");
}

#[test]
fn test_block_image_splits_paragraph() {
    let doc = parse(r#"<p>a <img src="i.png" alt="I"> b</p>"#);
    assert_eq!(types(&doc), vec![PARAGRAPH, IMAGE, PARAGRAPH]);
    assert_eq!(doc.content[0].text_content(), "a");
    assert_eq!(doc.content[1].attr_str("src"), Some("i.png"));
    assert_eq!(doc.content[1].attr_str("alt"), Some("I"));
    assert_eq!(doc.content[2].text_content(), "b");

    let alone = parse(r#"<p><img src="i.png"></p>"#);
    assert_eq!(types(&alone), vec![IMAGE]);
}

#[test]
fn test_code_block_language_sources() {
    let doc = parse(
        "<pre data-language=\"toml\">a = 1</pre><pre><code class=\"x language-rust\">fn f() {}</code></pre>",
    );
    assert_eq!(types(&doc), vec![CODE_BLOCK, CODE_BLOCK]);
    assert_eq!(doc.content[0].attr_str("language"), Some("toml"));
    assert_eq!(doc.content[1].attr_str("language"), Some("rust"));
    assert_eq!(doc.content[1].text_content(), "fn f() {}");
}

#[test]
fn test_dropped_elements_are_reported() {
    let schema = Schema::core().unwrap();
    let (doc, report) =
        parse_html_with_report(&schema, "<div><span>x</span></div><sup>1</sup>");
    assert_eq!(doc.text_content(), "x1");
    assert_eq!(report.dropped.get("div"), Some(&1));
    assert_eq!(report.dropped.get("span"), Some(&1));
    assert_eq!(report.dropped.get("sup"), Some(&1));
    assert_eq!(report.dropped_count(), 3);
}

#[test]
fn test_malformed_html_still_validates() {
    let schema = Schema::core().unwrap();
    let inputs = [
        "<ul><p>para in list</p><li>ok</li></ul>",
        "<h1><h2>nested headings</h2></h1>",
        "<blockquote><li>a</li><table><tr><td>b</td></tr></table></blockquote>",
        "<pre><b>bold</b> code</pre>",
        "<a>no href</a><img>",
        "<b><p>mark around block</p></b>",
    ];
    for input in inputs {
        let doc = parse_html(&schema, input);
        assert!(schema.check(&doc).is_ok(), "{input:?} gave {doc:?}");
    }
}

#[test]
fn test_registry_parses_html() {
    let schema = Arc::new(Schema::core().unwrap());
    let registry = FormatRegistry::with_defaults(schema, &Default::default());
    let doc = registry.parse("<h3>Title</h3>", "html").unwrap();
    assert_eq!(doc.content[0].node_type, HEADING);
    assert_eq!(doc.content[0].attr_int("level"), Some(3));
}
