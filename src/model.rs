#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Run {
    pub text: String,
    pub font_size: Option<f32>, // points; None = inherit from style
    pub bold: bool,
    pub italic: bool,
    pub color: Option<[u8; 3]>, // None = automatic (black)
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: None,
            bold: false,
            italic: false,
            color: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub alignment: Alignment,
}

impl Paragraph {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            runs: vec![Run::plain(text)],
            alignment: Alignment::Left,
        }
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Drop all text but keep the first run so the paragraph retains its formatting.
    pub fn clear_text(&mut self) {
        self.runs.truncate(1);
        if let Some(run) = self.runs.first_mut() {
            run.text.clear();
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VMerge {
    None,
    Restart,
    Continue,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellVAlign {
    Top,
    Center,
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellBorder {
    pub present: bool,
    pub color: Option<[u8; 3]>,
    pub width: f32,
}

impl Default for CellBorder {
    fn default() -> Self {
        Self {
            present: false,
            color: None,
            width: 0.5,
        }
    }
}

impl CellBorder {
    pub fn visible(color: Option<[u8; 3]>, width: f32) -> Self {
        Self {
            present: true,
            color,
            width,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellBorders {
    pub top: CellBorder,
    pub bottom: CellBorder,
    pub left: CellBorder,
    pub right: CellBorder,
    pub diagonal_down: CellBorder, // w:tl2br
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellMargins {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl Default for CellMargins {
    fn default() -> Self {
        Self {
            top: 0.0,
            left: 5.4,
            bottom: 0.0,
            right: 5.4,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub col_widths: Vec<f32>, // points
    pub rows: Vec<TableRow>,
    pub table_indent: f32,
    pub cell_margins: CellMargins,
}

impl Table {
    /// A table with the same grid and table-level properties but no rows.
    /// Widths are copied, never recomputed, so every block lines up.
    pub fn empty_like(&self) -> Table {
        Table {
            col_widths: self.col_widths.clone(),
            rows: Vec::new(),
            table_indent: self.table_indent,
            cell_margins: self.cell_margins,
        }
    }

    /// Number of grid columns: the declared grid, or the widest row when the grid is missing.
    pub fn grid_columns(&self) -> usize {
        let widest = self
            .rows
            .iter()
            .map(|r| r.cells.iter().map(|c| c.grid_span.max(1) as usize).sum::<usize>())
            .max()
            .unwrap_or(0);
        self.col_widths.len().max(widest)
    }

    /// First (row, cell) whose vertical merge state contradicts the cell above it:
    /// a `Continue` with nothing in the same grid column of the previous row to continue.
    pub fn merge_violation(&self) -> Option<(usize, usize)> {
        for (ri, row) in self.rows.iter().enumerate() {
            for (ci, (grid_col, cell)) in row.grid_cells().enumerate() {
                if cell.v_merge != VMerge::Continue {
                    continue;
                }
                let above = ri
                    .checked_sub(1)
                    .and_then(|prev| self.rows[prev].cell_at_grid(grid_col));
                match above {
                    Some(c) if c.v_merge != VMerge::None => {}
                    _ => return Some((ri, ci)),
                }
            }
        }
        None
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    pub height: Option<f32>,
    pub height_exact: bool,
}

impl TableRow {
    /// Cells paired with the grid column they start in.
    pub fn grid_cells(&self) -> impl Iterator<Item = (usize, &TableCell)> {
        let mut grid_col = 0usize;
        self.cells.iter().map(move |cell| {
            let start = grid_col;
            grid_col += cell.grid_span.max(1) as usize;
            (start, cell)
        })
    }

    pub fn cell_at_grid(&self, grid_col: usize) -> Option<&TableCell> {
        self.grid_cells()
            .find(|(start, _)| *start == grid_col)
            .map(|(_, cell)| cell)
    }

    /// Copy of this row with the text of every cell cleared and merges dropped.
    pub fn blank(&self) -> TableRow {
        let mut row = self.clone();
        for cell in &mut row.cells {
            cell.clear_text();
            cell.v_merge = VMerge::None;
        }
        row
    }

    pub fn set_bottom_border(&mut self, border: CellBorder) {
        for cell in &mut self.cells {
            cell.borders.bottom = border;
        }
    }

    pub fn text(&self) -> Vec<String> {
        self.cells.iter().map(TableCell::text).collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableCell {
    pub width: f32, // points
    pub paragraphs: Vec<Paragraph>,
    pub borders: CellBorders,
    pub shading: Option<[u8; 3]>,
    pub grid_span: u16,
    pub v_merge: VMerge,
    pub v_align: CellVAlign,
}

impl TableCell {
    pub fn with_text(width: f32, text: impl Into<String>) -> Self {
        Self {
            width,
            paragraphs: vec![Paragraph::plain(text)],
            borders: CellBorders::default(),
            shading: None,
            grid_span: 1,
            v_merge: VMerge::None,
            v_align: CellVAlign::Top,
        }
    }

    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn clear_text(&mut self) {
        self.paragraphs.truncate(1);
        match self.paragraphs.first_mut() {
            Some(p) => p.clear_text(),
            None => self.paragraphs.push(Paragraph::plain("")),
        }
    }

    /// Replace the content with a single paragraph, keeping the first run's formatting.
    pub fn set_text(&mut self, text: &str, alignment: Alignment) {
        self.clear_text();
        if let Some(p) = self.paragraphs.first_mut() {
            p.alignment = alignment;
            match p.runs.first_mut() {
                Some(run) => run.text.push_str(text),
                None => p.runs.push(Run::plain(text)),
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    PageBreak,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }
}
