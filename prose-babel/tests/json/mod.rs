//! ProseMirror JSON format tests

use prose_babel::format::Format;
use prose_babel::formats::json::JsonFormat;
use prose_babel::schema::vocabulary::*;
use prose_babel::{FormatError, FormatRegistry, Schema};
use serde_json::json;
use std::sync::Arc;

fn format() -> JsonFormat {
    JsonFormat::new(Arc::new(Schema::core().unwrap()))
}

#[test]
fn test_editor_document_shape() {
    let source = json!({
        "type": "doc",
        "content": [
            {
                "type": "heading",
                "attrs": { "level": 2 },
                "content": [{ "type": "text", "text": "Hello" }]
            },
            {
                "type": "paragraph",
                "content": [
                    {
                        "type": "text",
                        "text": "world",
                        "marks": [{ "type": "link", "attrs": { "href": "https://example.com", "title": null } }]
                    }
                ]
            }
        ]
    });

    let doc = format().parse(&source.to_string()).unwrap();
    assert_eq!(doc.content[0].node_type, HEADING);
    assert_eq!(doc.content[0].attr_int("level"), Some(2));
    let link = &doc.content[1].content[0].marks[0];
    assert_eq!(link.attr_str("href"), Some("https://example.com"));
    assert_eq!(link.attr_str("title"), None);

    let written: serde_json::Value = serde_json::from_str(&format().serialize(&doc).unwrap()).unwrap();
    assert_eq!(written, source);
}

#[test]
fn test_empty_fields_are_omitted() {
    let doc = format()
        .parse(r#"{"type":"doc","content":[{"type":"horizontalRule"}]}"#)
        .unwrap();
    let written: serde_json::Value = serde_json::from_str(&format().serialize(&doc).unwrap()).unwrap();
    assert_eq!(
        written,
        json!({ "type": "doc", "content": [{ "type": "horizontalRule" }] })
    );
}

#[test]
fn test_json_input_is_checked_not_repaired() {
    let result = format().parse(r#"{"type":"doc","content":[{"type":"text","text":"loose"}]}"#);
    assert!(matches!(result, Err(FormatError::InvalidTree(_))));

    let result = format().parse(r#"{"type":"doc","content":[{"type":"gadget"}]}"#);
    assert!(matches!(result, Err(FormatError::InvalidTree(_))));
}

#[test]
fn test_malformed_json_is_a_parse_error() {
    let result = format().parse("{\"type\": ");
    assert!(matches!(result, Err(FormatError::ParseError(_))));
}

#[test]
fn test_markdown_to_json_through_registry() {
    let schema = Arc::new(Schema::core().unwrap());
    let registry = FormatRegistry::with_defaults(schema, &Default::default());
    let doc = registry.parse("# Title\n\nBody *text*", "markdown").unwrap();
    let json = registry.serialize(&doc, "json").unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["content"][0]["type"], "heading");
    assert_eq!(value["content"][0]["attrs"]["level"], 1);
    assert_eq!(value["content"][1]["content"][1]["marks"][0]["type"], "italic");

    let back = registry.parse(&json, "json").unwrap();
    assert_eq!(back, doc);
}

#[test]
fn test_attribute_kinds_are_checked() {
    let source = json!({
        "type": "doc",
        "content": [{
            "type": "heading",
            "attrs": { "level": "2" },
            "content": [{ "type": "text", "text": "t" }]
        }]
    })
    .to_string();
    let err = format().parse(&source).unwrap_err();
    assert!(matches!(err, FormatError::InvalidTree(_)));
}
