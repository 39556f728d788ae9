//! Markdown parsing (Markdown → document tree)
//!
//! Pipeline: Markdown string → HTML (comrak) → rcdom → events → tree.
//!
//! Going through HTML means there is exactly one mapping from markup to the
//! schema: `**x**` and `<b>x</b>` both reach the rule table as a `strong` or
//! `b` element, and raw HTML embedded in Markdown is handled by the same rules.

use crate::common::flat_to_nested::{events_to_tree, ParseReport};
use crate::dom;
use crate::formats::html::parser::dom_to_events;
use crate::ir::nodes::Node;
use crate::options::ParseOptions;
use crate::schema::Schema;
use comrak::{markdown_to_html, ComrakOptions};
use tracing::debug;

/// Parses Markdown into a document fitted to `schema`.
pub fn parse_markdown(schema: &Schema, source: &str, options: &ParseOptions) -> Node {
    parse_markdown_with_report(schema, source, options).0
}

/// Like [`parse_markdown`], also returning what had to be dropped or repaired.
pub fn parse_markdown_with_report(
    schema: &Schema,
    source: &str,
    options: &ParseOptions,
) -> (Node, ParseReport) {
    let html = markdown_to_html(source, &comrak_options(options));
    let body = dom::parse_markup(&html);
    let events = dom_to_events(schema, &body);
    let (doc, report) = events_to_tree(schema, &events);
    if !report.is_clean() {
        debug!(
            dropped = report.dropped_count(),
            padded = report.padded_cells,
            truncated = report.truncated_cells,
            wrapped = report.wrapped,
            "markdown input needed repairs"
        );
    }
    (doc, report)
}

/// Comrak configuration for the given parse options.
///
/// Tables and strikethrough are always on. Raw HTML either passes through to
/// the DOM or is escaped to literal text.
pub fn comrak_options(options: &ParseOptions) -> ComrakOptions<'static> {
    let mut comrak = ComrakOptions::default();
    comrak.extension.table = true;
    comrak.extension.strikethrough = true;
    comrak.extension.autolink = options.linkify;
    comrak.render.hardbreaks = options.breaks;
    comrak.render.unsafe_ = options.allow_html;
    comrak.render.escape = !options.allow_html;
    comrak
}
