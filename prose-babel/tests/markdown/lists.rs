//! List structure tests for Markdown format

use proptest::prelude::*;
use prose_babel::schema::vocabulary::*;
use prose_babel::{parse_markdown, serialize_markdown, Node, ParseOptions, Schema, SerializeOptions};

fn parse(md: &str) -> Node {
    let schema = Schema::core().unwrap();
    parse_markdown(&schema, md, &ParseOptions::default())
}

fn reparse(doc: &Node, options: &SerializeOptions) -> Node {
    let schema = Schema::core().unwrap();
    let md = serialize_markdown(&schema, doc, options).unwrap();
    parse_markdown(&schema, &md, &ParseOptions::default())
}

fn word() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

/// Items with an optional nested list under each.
fn outline() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    prop::collection::vec(
        (word(), prop::collection::vec(word(), 0..4)),
        1..6,
    )
}

fn outline_markdown(items: &[(String, Vec<String>)], marker: &str) -> String {
    let mut lines = Vec::new();
    for (item, children) in items {
        lines.push(format!("{marker} {item}"));
        for child in children {
            lines.push(format!("  {marker} {child}"));
        }
    }
    lines.join("\n")
}

proptest! {
    #[test]
    fn test_item_count_and_order_preserved(words in prop::collection::vec(word(), 1..10)) {
        let md = words.iter().map(|w| format!("- {w}")).collect::<Vec<_>>().join("\n");
        let doc = parse(&md);

        prop_assert_eq!(doc.content.len(), 1);
        let list = &doc.content[0];
        prop_assert_eq!(list.node_type.as_str(), BULLET_LIST);
        let texts: Vec<String> = list.content.iter().map(Node::text_content).collect();
        prop_assert_eq!(texts, words);
    }

    #[test]
    fn test_bullet_markers_give_identical_trees(items in outline()) {
        let dashes = parse(&outline_markdown(&items, "-"));
        prop_assert_eq!(&parse(&outline_markdown(&items, "*")), &dashes);
        prop_assert_eq!(&parse(&outline_markdown(&items, "+")), &dashes);
    }

    #[test]
    fn test_lists_are_stable_through_markdown(items in outline(), tight in any::<bool>()) {
        let doc = parse(&outline_markdown(&items, "-"));
        let options = SerializeOptions {
            tight_lists: tight,
            ..SerializeOptions::default()
        };
        prop_assert_eq!(reparse(&doc, &options), doc);
    }
}

#[test]
fn test_ordered_list_start_survives() {
    let doc = parse("3. x\n4. y");
    let list = &doc.content[0];
    assert_eq!(list.node_type, ORDERED_LIST);
    assert_eq!(list.attr_int("start"), Some(3));
    assert_eq!(list.child_count(), 2);
    assert_eq!(reparse(&doc, &SerializeOptions::default()), doc);
}

#[test]
fn test_list_item_with_several_blocks() {
    let doc = parse("- first\n\n  second\n\n  > quoted\n- next");
    let item = &doc.content[0].content[0];
    let types: Vec<&str> = item.content.iter().map(|n| n.node_type.as_str()).collect();
    assert_eq!(types, vec![PARAGRAPH, PARAGRAPH, BLOCKQUOTE]);
    assert_eq!(reparse(&doc, &SerializeOptions::default()), doc);
}

#[test]
fn test_adjacent_lists_of_different_kinds() {
    let doc = parse("- a\n\n1. b");
    let types: Vec<&str> = doc.content.iter().map(|n| n.node_type.as_str()).collect();
    assert_eq!(types, vec![BULLET_LIST, ORDERED_LIST]);
    assert_eq!(reparse(&doc, &SerializeOptions::default()), doc);
}

#[test]
fn test_ordered_list_numbers_saturate_at_the_largest_start() {
    let schema = Schema::core().unwrap();
    let item = |text: &str| {
        Node::new(LIST_ITEM).with_content(vec![
            Node::new(PARAGRAPH).with_content(vec![Node::text(text)])
        ])
    };
    let doc = Node::new(DOC).with_content(vec![Node::new(ORDERED_LIST)
        .with_attr("start", i64::MAX)
        .with_content(vec![item("a"), item("b")])]);

    assert_eq!(schema.check(&doc), Ok(()));
    let md = serialize_markdown(&schema, &doc, &SerializeOptions::default()).unwrap();
    assert_eq!(md, "9223372036854775807. a\n\n9223372036854775807. b");
}

#[test]
fn test_ordered_list_with_negative_start_aligns() {
    let schema = Schema::core().unwrap();
    let item = |text: &str| {
        Node::new(LIST_ITEM).with_content(vec![
            Node::new(PARAGRAPH).with_content(vec![Node::text(text)])
        ])
    };
    let doc = Node::new(DOC).with_content(vec![Node::new(ORDERED_LIST)
        .with_attr("start", -1i64)
        .with_content(vec![item("a"), item("b"), item("c")])]);

    let md = serialize_markdown(&schema, &doc, &SerializeOptions::default()).unwrap();
    assert_eq!(md, "-1. a\n\n 0. b\n\n 1. c");
}
