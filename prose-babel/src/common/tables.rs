//! Table row normalization.
//!
//! Every row is made exactly as wide as the first row: short rows are padded
//! with empty cells of the row's own cell type, long rows lose their extra
//! cells. Markdown cannot express ragged tables, and editors expect
//! rectangular ones.

use super::flat_to_nested::ParseReport;
use crate::ir::nodes::{Attrs, Node};
use crate::schema::{Schema, TableRole};
use tracing::debug;

pub(crate) fn normalize_rows(schema: &Schema, rows: &mut [Node], report: &mut ParseReport) {
    let Some(width) = rows.first().map(Node::child_count) else {
        return;
    };

    for (index, row) in rows.iter_mut().enumerate() {
        let count = row.child_count();
        if count > width {
            row.content.truncate(width);
            report.truncated_cells += count - width;
            debug!(row = index, removed = count - width, "truncated table row");
        } else if count < width {
            let cell_type = row
                .content
                .first()
                .map(|cell| cell.node_type.clone())
                .unwrap_or_else(|| default_cell_type(schema));
            for _ in count..width {
                row.content.push(empty_cell(schema, &cell_type));
            }
            report.padded_cells += width - count;
            debug!(row = index, added = width - count, "padded table row");
        }
    }
}

fn default_cell_type(schema: &Schema) -> String {
    schema
        .nodes()
        .iter()
        .find(|spec| spec.table_role == Some(TableRole::Cell))
        .map(|spec| spec.name.clone())
        .unwrap_or_else(|| "tableCell".to_string())
}

fn empty_cell(schema: &Schema, cell_type: &str) -> Node {
    let textblock = schema.default_textblock();
    Node {
        attrs: schema.node_attrs(cell_type, Attrs::new()),
        content: vec![Node::new(textblock)],
        ..Node::new(cell_type)
    }
}
