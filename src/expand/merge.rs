use crate::model::{TableRow, VMerge};

/// Grid columns in which any row of the template group takes part in a vertical merge.
pub(crate) fn merge_columns(group: &[TableRow]) -> Vec<usize> {
    let mut columns: Vec<usize> = group
        .iter()
        .flat_map(|row| {
            row.grid_cells()
                .filter(|(_, cell)| cell.v_merge != VMerge::None)
                .map(|(col, _)| col)
        })
        .collect();
    columns.sort_unstable();
    columns.dedup();
    columns
}

/// Rewrite merge states of a freshly cloned group: its first row starts a
/// merge and the rest continue it. With `continue_previous` the first row
/// continues the group above instead, joining consecutive items into one
/// merged cell. Never set across a page: merges cannot span table blocks.
pub(crate) fn apply_group_merge(rows: &mut [TableRow], columns: &[usize], continue_previous: bool) {
    if columns.is_empty() {
        return;
    }
    for (ri, row) in rows.iter_mut().enumerate() {
        let state = if ri > 0 || continue_previous {
            VMerge::Continue
        } else {
            VMerge::Restart
        };
        let mut grid_col = 0usize;
        for cell in &mut row.cells {
            if columns.contains(&grid_col) {
                cell.v_merge = state;
            }
            grid_col += cell.grid_span.max(1) as usize;
        }
    }
}
