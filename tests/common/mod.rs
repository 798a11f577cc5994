#![allow(dead_code)]

use docxide_expand::model::{Block, Document, Paragraph, Table, TableCell, TableRow, VMerge};
use serde_json::{Map, Value};

pub const COL_WIDTH: f32 = 72.0;

pub fn row(texts: &[&str]) -> TableRow {
    TableRow {
        cells: texts.iter().map(|t| TableCell::with_text(COL_WIDTH, *t)).collect(),
        height: Some(18.0),
        height_exact: false,
    }
}

pub fn blank_rows(count: usize, columns: usize) -> Vec<TableRow> {
    (0..count).map(|_| row(&vec![""; columns])).collect()
}

pub fn table(rows: Vec<TableRow>) -> Table {
    let columns = rows.first().map_or(0, |r| r.cells.len());
    Table {
        col_widths: vec![COL_WIDTH; columns],
        rows,
        table_indent: 12.0,
        cell_margins: Default::default(),
    }
}

/// Header, `{{tag}}` row, one item row, then blank rows reserving a page of
/// `capacity` rows (item row included).
pub fn goods_table(tag: &str, capacity: usize) -> Table {
    let mut rows = vec![
        row(&["No", "Name"]),
        row(&[&format!("{{{{{tag}}}}}"), ""]),
        row(&["[index]", "[name]"]),
    ];
    rows.extend(blank_rows(capacity - 1, 2));
    table(rows)
}

pub fn doc_with(table: Table) -> Document {
    Document {
        blocks: vec![
            Block::Paragraph(Paragraph::plain("Delivery note")),
            Block::Table(table),
            Block::Paragraph(Paragraph::plain("Signature")),
        ],
    }
}

pub fn bindings(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("environment must be an object, got {other}"),
    }
}

pub fn named_items(count: usize) -> Value {
    Value::Array(
        (1..=count)
            .map(|i| serde_json::json!({ "name": format!("item {i}") }))
            .collect(),
    )
}

pub fn tables(doc: &Document) -> Vec<&Table> {
    doc.tables().collect()
}

pub fn page_breaks(doc: &Document) -> usize {
    doc.blocks
        .iter()
        .filter(|b| matches!(b, Block::PageBreak))
        .count()
}

pub fn is_blank(row: &TableRow) -> bool {
    row.cells.iter().all(|c| c.text().is_empty())
}

pub fn merge_states(row: &TableRow) -> Vec<VMerge> {
    row.cells.iter().map(|c| c.v_merge).collect()
}
