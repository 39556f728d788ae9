//! GFM table tests for Markdown format

use proptest::prelude::*;
use prose_babel::schema::vocabulary::*;
use prose_babel::{
    parse_html, parse_markdown, serialize_markdown, Node, ParseOptions, Schema, SerializeOptions,
};

fn parse(md: &str) -> Node {
    let schema = Schema::core().unwrap();
    parse_markdown(&schema, md, &ParseOptions::default())
}

fn serialize(doc: &Node) -> String {
    let schema = Schema::core().unwrap();
    serialize_markdown(&schema, doc, &SerializeOptions::default()).unwrap()
}

fn pipe_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

fn table_markdown(header: &[String], rows: &[Vec<String>]) -> String {
    let mut lines = vec![
        pipe_row(header),
        pipe_row(&vec!["---".to_string(); header.len()]),
    ];
    lines.extend(rows.iter().map(|row| pipe_row(row)));
    lines.join("\n")
}

fn cells(min: usize, max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,5}", min..max)
}

proptest! {
    #[test]
    fn test_column_count_follows_header(
        header in cells(1, 5),
        rows in prop::collection::vec(cells(1, 8), 1..4),
    ) {
        let doc = parse(&table_markdown(&header, &rows));
        prop_assert_eq!(doc.content.len(), 1);
        let table = &doc.content[0];
        prop_assert_eq!(table.node_type.as_str(), TABLE);
        prop_assert_eq!(table.child_count(), rows.len() + 1);

        let width = header.len();
        for row in &table.content {
            prop_assert_eq!(row.child_count(), width);
        }

        let header_texts: Vec<String> = table.content[0].content.iter().map(Node::text_content).collect();
        prop_assert_eq!(&header_texts, &header);
        prop_assert!(table.content[0].content.iter().all(|c| c.node_type == TABLE_HEADER));

        for (source, row) in rows.iter().zip(&table.content[1..]) {
            for (j, cell) in row.content.iter().enumerate() {
                prop_assert_eq!(cell.node_type.as_str(), TABLE_CELL);
                let expected = source.get(j).map(String::as_str).unwrap_or("");
                prop_assert_eq!(cell.text_content(), expected);
            }
        }
    }

    #[test]
    fn test_table_markdown_is_stable(
        header in cells(2, 5),
        rows in prop::collection::vec(cells(1, 8), 1..4),
    ) {
        let doc = parse(&table_markdown(&header, &rows));
        let md = serialize(&doc);
        let again = parse(&md);

        prop_assert_eq!(again.content.len(), 1);
        let table = &again.content[0];
        prop_assert_eq!(table.node_type.as_str(), TABLE);
        prop_assert_eq!(table.child_count(), rows.len() + 1);
        prop_assert!(table.content.iter().all(|row| row.child_count() == header.len()));
        prop_assert_eq!(serialize(&again), md);
    }
}

#[test]
fn test_empty_cells_serialize_as_nbsp() {
    let doc = parse("| a | b |\n| --- | --- |\n| 1 |");
    assert_eq!(serialize(&doc), "a | b\n--- | ---\n1 | &nbsp;\n");
}

#[test]
fn test_cells_keep_inline_marks() {
    let doc = parse("| **a** | `b` |\n| --- | --- |\n| [c](u) | d |");
    assert_eq!(serialize(&doc), "**a** | `b`\n--- | ---\n[c](u) | d\n");
}

#[test]
fn test_table_between_paragraphs() {
    let doc = parse("before\n\n| a | b |\n| --- | --- |\n| 1 | 2 |\n\nafter");
    let types: Vec<&str> = doc.content.iter().map(|n| n.node_type.as_str()).collect();
    assert_eq!(types, vec![PARAGRAPH, TABLE, PARAGRAPH]);

    let md = serialize(&doc);
    assert_eq!(md, "before\n\na | b\n--- | ---\n1 | 2\n\nafter");
    assert_eq!(parse(&md), doc);
}

#[test]
fn test_escaped_pipe_stays_in_its_cell() {
    let doc = parse("| a \\| b | c |\n| --- | --- |\n| 1 | 2 |");
    let header = &doc.content[0].content[0];
    assert_eq!(header.child_count(), 2);
    assert_eq!(header.content[0].text_content(), "a | b");

    let md = serialize(&doc);
    assert_eq!(md, "a \\| b | c\n--- | ---\n1 | 2\n");
    assert_eq!(parse(&md), doc);
}

#[test]
fn test_pipe_in_code_span_is_escaped() {
    let doc = parse("| `x\\|y` | c |\n| --- | --- |\n| 1 | 2 |");
    assert_eq!(doc.content[0].content[0].content[0].text_content(), "x|y");

    let md = serialize(&doc);
    assert_eq!(md, "`x\\|y` | c\n--- | ---\n1 | 2\n");
    assert_eq!(parse(&md), doc);
}

#[test]
fn test_hard_break_in_cell_keeps_the_row() {
    let schema = Schema::core().unwrap();
    let doc = parse_html(
        &schema,
        "<table><tr><th><p>a<br>b</p></th><th><p>c</p></th></tr>\
         <tr><td><p>1</p></td><td><p>2</p></td></tr></table>",
    );
    let md = serialize(&doc);
    assert_eq!(md, "a<br>b | c\n--- | ---\n1 | 2\n");

    let back = parse(&md);
    assert_eq!(back, doc);
    let cell = &back.content[0].content[0].content[0].content[0];
    let types: Vec<&str> = cell.content.iter().map(|n| n.node_type.as_str()).collect();
    assert_eq!(types, vec!["text", HARD_BREAK, "text"]);
}
