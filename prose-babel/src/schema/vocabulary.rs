//! The core vocabulary: the tiptap starter-kit nodes and marks plus images and tables.

use super::rules::{MarkSyntax, MarkdownRule};
use super::{AttrSource, ContentRule, DomSpec, MarkSpec, NodeSpec, ParseRule, TableRole};
use crate::ir::nodes::AttrValue;

pub const DOC: &str = "doc";
pub const PARAGRAPH: &str = "paragraph";
pub const HEADING: &str = "heading";
pub const BULLET_LIST: &str = "bulletList";
pub const ORDERED_LIST: &str = "orderedList";
pub const LIST_ITEM: &str = "listItem";
pub const BLOCKQUOTE: &str = "blockquote";
pub const CODE_BLOCK: &str = "codeBlock";
pub const HORIZONTAL_RULE: &str = "horizontalRule";
pub const HARD_BREAK: &str = "hardBreak";
pub const IMAGE: &str = "image";
pub const TABLE: &str = "table";
pub const TABLE_ROW: &str = "tableRow";
pub const TABLE_CELL: &str = "tableCell";
pub const TABLE_HEADER: &str = "tableHeader";

pub const LINK: &str = "link";
pub const BOLD: &str = "bold";
pub const ITALIC: &str = "italic";
pub const STRIKE: &str = "strike";
pub const UNDERLINE: &str = "underline";
pub const CODE: &str = "code";

pub(crate) fn core_nodes() -> Vec<NodeSpec> {
    let heading_tags = (1..=6).map(|level| {
        ParseRule::tag(format!("h{level}")).attr("level", AttrSource::Constant(AttrValue::Int(level)))
    });
    let mut heading = NodeSpec::block(HEADING, ContentRule::Inline)
        .attr("level", 1i64)
        .dom(DomSpec::new("h{level}"))
        .markdown(MarkdownRule::Heading);
    for rule in heading_tags {
        heading = heading.parse_rule(rule);
    }

    vec![
        NodeSpec::structural(DOC, ContentRule::Blocks),
        NodeSpec::block(PARAGRAPH, ContentRule::Inline)
            .parse_tags(&["p"])
            .dom(DomSpec::new("p"))
            .markdown(MarkdownRule::Paragraph),
        NodeSpec::text_node().markdown(MarkdownRule::Text),
        heading,
        NodeSpec::block(BULLET_LIST, ContentRule::Only(vec![LIST_ITEM.to_string()]))
            .parse_tags(&["ul"])
            .dom(DomSpec::new("ul"))
            .markdown(MarkdownRule::BulletList),
        NodeSpec::block(ORDERED_LIST, ContentRule::Only(vec![LIST_ITEM.to_string()]))
            .attr("start", 1i64)
            .parse_rule(ParseRule::tag("ol").attr("start", AttrSource::Attribute("start".into())))
            .dom(DomSpec::new("ol").map_attr("start", "start"))
            .markdown(MarkdownRule::OrderedList),
        NodeSpec::structural(
            LIST_ITEM,
            ContentRule::BlocksStartingWith(PARAGRAPH.to_string()),
        )
        .parse_tags(&["li"])
        .dom(DomSpec::new("li"))
        .markdown(MarkdownRule::ListItem),
        NodeSpec::block(BLOCKQUOTE, ContentRule::Blocks)
            .parse_tags(&["blockquote"])
            .dom(DomSpec::new("blockquote"))
            .markdown(MarkdownRule::Blockquote),
        NodeSpec::block(CODE_BLOCK, ContentRule::Text)
            .attr("language", AttrValue::Null)
            .parse_rule(
                ParseRule::tag("pre")
                    .attr("language", AttrSource::ClassPrefix("language-".into()))
                    .attr("language", AttrSource::Attribute("data-language".into())),
            )
            .dom(
                DomSpec::new("pre")
                    .wrapping(DomSpec::new("code").map_attr_prefixed("language", "class", "language-")),
            )
            .markdown(MarkdownRule::CodeBlock),
        NodeSpec::block(HORIZONTAL_RULE, ContentRule::Empty)
            .parse_tags(&["hr"])
            .dom(DomSpec::new("hr"))
            .markdown(MarkdownRule::HorizontalRule),
        NodeSpec::inline(HARD_BREAK, ContentRule::Empty)
            .parse_tags(&["br"])
            .dom(DomSpec::new("br"))
            .markdown(MarkdownRule::HardBreak)
            .breaks_line(),
        NodeSpec::block(IMAGE, ContentRule::Empty)
            .attr("src", AttrValue::Null)
            .attr("alt", AttrValue::Null)
            .attr("title", AttrValue::Null)
            .parse_rule(
                ParseRule::tag("img")
                    .attr("src", AttrSource::Attribute("src".into()))
                    .attr("alt", AttrSource::Attribute("alt".into()))
                    .attr("title", AttrSource::Attribute("title".into())),
            )
            .dom(
                DomSpec::new("img")
                    .map_attr("src", "src")
                    .map_attr("alt", "alt")
                    .map_attr("title", "title"),
            )
            .markdown(MarkdownRule::Image),
        NodeSpec::block(TABLE, ContentRule::Only(vec![TABLE_ROW.to_string()]))
            .parse_tags(&["table"])
            .dom(DomSpec::new("table"))
            .markdown(MarkdownRule::Table)
            .table_role(TableRole::Table),
        NodeSpec::structural(
            TABLE_ROW,
            ContentRule::Only(vec![TABLE_CELL.to_string(), TABLE_HEADER.to_string()]),
        )
        .parse_tags(&["tr"])
        .dom(DomSpec::new("tr"))
        .table_role(TableRole::Row),
        NodeSpec::structural(TABLE_CELL, ContentRule::Blocks)
            .parse_tags(&["td"])
            .dom(DomSpec::new("td"))
            .table_role(TableRole::Cell),
        NodeSpec::structural(TABLE_HEADER, ContentRule::Blocks)
            .parse_tags(&["th"])
            .dom(DomSpec::new("th"))
            .table_role(TableRole::Cell),
    ]
}

pub(crate) fn core_marks() -> Vec<MarkSpec> {
    vec![
        MarkSpec::new(LINK)
            .attr("href", AttrValue::Null)
            .attr("title", AttrValue::Null)
            .parse_rule(
                ParseRule::tag("a")
                    .requires("href")
                    .attr("href", AttrSource::Attribute("href".into()))
                    .attr("title", AttrSource::Attribute("title".into())),
            )
            .dom(DomSpec::new("a").map_attr("href", "href").map_attr("title", "title"))
            .markdown(MarkSyntax::Link),
        MarkSpec::new(BOLD)
            .parse_tags(&["strong", "b"])
            .dom(DomSpec::new("strong"))
            .markdown(MarkSyntax::delimited("**", "**").mixable().expel_whitespace()),
        MarkSpec::new(ITALIC)
            .parse_tags(&["em", "i"])
            .dom(DomSpec::new("em"))
            .markdown(MarkSyntax::delimited("*", "*").mixable().expel_whitespace()),
        MarkSpec::new(STRIKE)
            .parse_tags(&["s", "del", "strike"])
            .dom(DomSpec::new("s"))
            .markdown(MarkSyntax::delimited("~~", "~~")),
        MarkSpec::new(UNDERLINE)
            .parse_tags(&["u"])
            .dom(DomSpec::new("u"))
            .markdown(MarkSyntax::delimited("<u>", "</u>")),
        MarkSpec::new(CODE)
            .parse_tags(&["code"])
            .dom(DomSpec::new("code"))
            .excludes_all()
            .markdown(MarkSyntax::Code),
    ]
}
