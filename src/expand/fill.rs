use crate::config::FillMode;
use crate::model::{Alignment, CellBorder, CellVAlign, TableRow, VMerge};

/// Rows padding a page by `count` rows in the given mode. Patterned on the
/// template group so borders and heights match the content rows.
pub(crate) fn fill_rows(
    group: &[TableRow],
    count: usize,
    mode: FillMode,
    blank_text: &str,
    grid_columns: usize,
) -> Vec<TableRow> {
    if count == 0 || group.is_empty() || mode == FillMode::None {
        return Vec::new();
    }
    let mut rows: Vec<TableRow> = (0..count).map(|i| group[i % group.len()].blank()).collect();
    if mode == FillMode::Blank {
        return rows;
    }

    merge_rows(&mut rows, grid_columns);
    if let Some(cell) = rows.first_mut().and_then(|r| r.cells.first_mut()) {
        match mode {
            FillMode::Diagonal => {
                let edge = cell.borders.top;
                cell.borders.diagonal_down = CellBorder::visible(edge.color, edge.width);
            }
            FillMode::Marker => {
                cell.set_text(blank_text, Alignment::Center);
                cell.v_align = CellVAlign::Center;
            }
            FillMode::None | FillMode::Blank => {}
        }
    }
    rows
}

/// Collapse each row into one cell spanning the full grid, then join the rows
/// into a single vertical merge.
fn merge_rows(rows: &mut [TableRow], grid_columns: usize) {
    let count = rows.len();
    for (ri, row) in rows.iter_mut().enumerate() {
        let Some(mut merged) = row.cells.first().cloned() else {
            continue;
        };
        merged.width = row.cells.iter().map(|c| c.width).sum();
        merged.grid_span = grid_columns.max(1) as u16;
        if let Some(last) = row.cells.last() {
            merged.borders.right = last.borders.right;
        }
        merged.v_merge = match (count, ri) {
            (1, _) => VMerge::None,
            (_, 0) => VMerge::Restart,
            _ => VMerge::Continue,
        };
        row.cells = vec![merged];
    }
}
