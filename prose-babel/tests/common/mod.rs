//! Tests for building trees from parse events and for checking them against the schema.

use prose_babel::common::flat_to_nested::events_to_tree;
use prose_babel::ir::events::Event;
use prose_babel::ir::nodes::{Attrs, Mark, Node};
use prose_babel::schema::vocabulary::*;
use prose_babel::schema::Schema;

fn start(node_type: &str) -> Event {
    Event::StartNode {
        node_type: node_type.to_string(),
        attrs: Attrs::new(),
    }
}

fn end(node_type: &str) -> Event {
    Event::EndNode {
        node_type: node_type.to_string(),
    }
}

fn text(s: &str) -> Event {
    Event::Text(s.to_string())
}

#[test]
fn test_built_trees_always_pass_the_check() {
    let schema = Schema::core().unwrap();
    let event_lists = vec![
        vec![],
        vec![text("loose")],
        vec![start(LIST_ITEM), text("orphan item"), end(LIST_ITEM)],
        vec![start(TABLE), start(TABLE_CELL), text("x"), end(TABLE_CELL), end(TABLE)],
        vec![start(BULLET_LIST), end(BULLET_LIST)],
        vec![
            start(PARAGRAPH),
            Event::StartMark(Mark::new(BOLD)),
            text("a"),
            start(BLOCKQUOTE),
            text("b"),
            end(BLOCKQUOTE),
            Event::EndMark {
                mark_type: BOLD.to_string(),
            },
            end(PARAGRAPH),
        ],
        vec![start(CODE_BLOCK), Event::StartMark(Mark::new(BOLD)), text("x")],
    ];

    for events in event_lists {
        let (doc, _) = events_to_tree(&schema, &events);
        assert!(
            schema.check(&doc).is_ok(),
            "built tree failed the check: {doc:?}"
        );
    }
}

#[test]
fn test_orphan_cell_gets_table_structure() {
    let schema = Schema::core().unwrap();
    let events = vec![start(TABLE_CELL), text("x"), end(TABLE_CELL)];
    let (doc, report) = events_to_tree(&schema, &events);

    let table = &doc.content[0];
    assert_eq!(table.node_type, TABLE);
    assert_eq!(table.content[0].node_type, TABLE_ROW);
    assert_eq!(table.content[0].content[0].node_type, TABLE_CELL);
    assert_eq!(table.text_content(), "x");
    assert!(report.wrapped > 0);
}

#[test]
fn test_block_inside_paragraph_splits_it() {
    let schema = Schema::core().unwrap();
    let events = vec![
        start(PARAGRAPH),
        text("before"),
        start(BLOCKQUOTE),
        text("inside"),
        end(BLOCKQUOTE),
        text("after"),
        end(PARAGRAPH),
    ];
    let (doc, _) = events_to_tree(&schema, &events);
    let types: Vec<&str> = doc.content.iter().map(|n| n.node_type.as_str()).collect();
    assert_eq!(types, vec![PARAGRAPH, BLOCKQUOTE, PARAGRAPH]);
    assert_eq!(doc.content[1].text_content(), "inside");
    assert_eq!(doc.content[2].text_content(), "after");
}

#[test]
fn test_check_reports_path_of_violation() {
    let schema = Schema::core().unwrap();
    let doc = Node::new(DOC).with_content(vec![
        Node::new(PARAGRAPH),
        Node::new(BULLET_LIST).with_content(vec![Node::new(PARAGRAPH)]),
    ]);
    let err = schema.check(&doc).unwrap_err();
    assert!(err.path.starts_with("doc/bulletList[1]"), "{}", err.path);
}
