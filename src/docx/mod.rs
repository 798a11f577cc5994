use std::io::{Read, Seek};
use std::path::Path;

use crate::error::Error;
use crate::model::{
    Alignment, Block, CellBorder, CellBorders, CellMargins, CellVAlign, Document, Paragraph, Run,
    Table, TableCell, TableRow, VMerge,
};

pub(crate) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn twips_to_pts(twips: f32) -> f32 {
    twips / 20.0
}

fn parse_hex_color(val: &str) -> Option<[u8; 3]> {
    if val == "auto" || val.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&val[0..2], 16).ok()?;
    let g = u8::from_str_radix(&val[2..4], 16).ok()?;
    let b = u8::from_str_radix(&val[4..6], 16).ok()?;
    Some([r, g, b])
}

/// Parse a WML boolean toggle element (e.g., w:b, w:i).
/// Present with no val or val != "0"/"false" means true.
fn wml_bool(parent: roxmltree::Node, name: &str) -> Option<bool> {
    wml(parent, name).map(|n| {
        n.attribute((WML_NS, "val"))
            .is_none_or(|v| v != "0" && v != "false")
    })
}

fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(WML_NS))
}

fn wml_attr<'a>(node: roxmltree::Node<'a, 'a>, child: &str) -> Option<&'a str> {
    wml(node, child).and_then(|n| n.attribute((WML_NS, "val")))
}

fn twips_attr(node: roxmltree::Node, attr: &str) -> Option<f32> {
    node.attribute((WML_NS, attr))
        .and_then(|v| v.parse::<f32>().ok())
        .map(twips_to_pts)
}

fn is_wml(node: roxmltree::Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

/// Flatten SDT wrappers: descend into w:sdtContent and collect effective children.
fn collect_block_nodes<'a>(parent: roxmltree::Node<'a, 'a>) -> Vec<roxmltree::Node<'a, 'a>> {
    let mut nodes = Vec::new();
    for child in parent.children() {
        if is_wml(child, "sdt") {
            if let Some(content) = wml(child, "sdtContent") {
                nodes.extend(collect_block_nodes(content));
            }
        } else {
            nodes.push(child);
        }
    }
    nodes
}

pub fn parse(path: &Path) -> Result<Document, Error> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
        ),
        _ => Error::Io(e),
    })?;
    parse_archive(file)
}

pub fn parse_bytes(bytes: &[u8]) -> Result<Document, Error> {
    parse_archive(std::io::Cursor::new(bytes))
}

fn parse_archive<R: Read + Seek>(reader: R) -> Result<Document, Error> {
    let mut zip = zip::ZipArchive::new(reader)
        .map_err(|_| Error::InvalidDocx("file is not a ZIP archive".into()))?;

    let mut xml_content = String::new();
    zip.by_name("word/document.xml")
        .map_err(|_| Error::InvalidDocx("missing word/document.xml (is this a DOCX file?)".into()))?
        .read_to_string(&mut xml_content)?;

    parse_document_xml(&xml_content)
}

pub(crate) fn parse_document_xml(xml_content: &str) -> Result<Document, Error> {
    let xml = roxmltree::Document::parse(xml_content)?;
    let root = xml.root_element();
    let body = wml(root, "body").ok_or_else(|| Error::InvalidDocx("missing w:body".into()))?;

    let mut blocks = Vec::new();
    for node in collect_block_nodes(body) {
        if node.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match node.tag_name().name() {
            "tbl" => blocks.push(Block::Table(parse_table(node))),
            "p" => {
                let (para, page_break) = parse_paragraph(node);
                if !para.text().is_empty() || !page_break {
                    blocks.push(Block::Paragraph(para));
                }
                if page_break {
                    blocks.push(Block::PageBreak);
                }
            }
            _ => {}
        }
    }

    log::debug!("Parsed document body: {} blocks", blocks.len());
    Ok(Document { blocks })
}

fn parse_cell_border(bdr_node: roxmltree::Node, name: &str) -> CellBorder {
    let Some(n) = wml(bdr_node, name) else {
        return CellBorder::default();
    };
    let val = n.attribute((WML_NS, "val")).unwrap_or("none");
    if val == "nil" || val == "none" {
        return CellBorder::default();
    }
    let width = n
        .attribute((WML_NS, "sz"))
        .and_then(|v| v.parse::<f32>().ok())
        .map(|v| v / 8.0)
        .unwrap_or(0.5);
    let color = n.attribute((WML_NS, "color")).and_then(parse_hex_color);
    CellBorder::visible(color, width)
}

fn parse_table(node: roxmltree::Node) -> Table {
    let col_widths: Vec<f32> = wml(node, "tblGrid")
        .into_iter()
        .flat_map(|grid| grid.children())
        .filter(|n| is_wml(*n, "gridCol"))
        .filter_map(|n| twips_attr(n, "w"))
        .collect();

    let tbl_pr = wml(node, "tblPr");
    let table_indent = tbl_pr
        .and_then(|pr| wml(pr, "tblInd"))
        .and_then(|ind| twips_attr(ind, "w"))
        .unwrap_or(0.0);

    let cell_margins = tbl_pr
        .and_then(|pr| wml(pr, "tblCellMar"))
        .map(|mar| CellMargins {
            top: wml(mar, "top")
                .and_then(|n| twips_attr(n, "w"))
                .unwrap_or(0.0),
            left: wml(mar, "left")
                .or_else(|| wml(mar, "start"))
                .and_then(|n| twips_attr(n, "w"))
                .unwrap_or(5.4),
            bottom: wml(mar, "bottom")
                .and_then(|n| twips_attr(n, "w"))
                .unwrap_or(0.0),
            right: wml(mar, "right")
                .or_else(|| wml(mar, "end"))
                .and_then(|n| twips_attr(n, "w"))
                .unwrap_or(5.4),
        })
        .unwrap_or_default();

    let rows = collect_block_nodes(node)
        .into_iter()
        .filter(|n| is_wml(*n, "tr"))
        .map(|tr| parse_row(tr, &col_widths))
        .collect();

    Table {
        col_widths,
        rows,
        table_indent,
        cell_margins,
    }
}

fn parse_row(tr: roxmltree::Node, col_widths: &[f32]) -> TableRow {
    let (height, height_exact) = wml(tr, "trPr")
        .and_then(|pr| wml(pr, "trHeight"))
        .map(|h| {
            let val = h
                .attribute((WML_NS, "val"))
                .and_then(|v| v.parse::<f32>().ok())
                .map(twips_to_pts);
            let exact = h.attribute((WML_NS, "hRule")) == Some("exact");
            (val, exact)
        })
        .unwrap_or((None, false));

    let mut cells = Vec::new();
    let mut grid_col = 0usize;
    for tc in collect_block_nodes(tr).into_iter().filter(|n| is_wml(*n, "tc")) {
        let cell = parse_cell(tc, col_widths.get(grid_col).copied());
        grid_col += cell.grid_span.max(1) as usize;
        cells.push(cell);
    }

    TableRow {
        cells,
        height,
        height_exact,
    }
}

fn parse_cell(tc: roxmltree::Node, grid_width: Option<f32>) -> TableCell {
    let tc_pr = wml(tc, "tcPr");
    let width = tc_pr
        .and_then(|pr| wml(pr, "tcW"))
        .and_then(|w| twips_attr(w, "w"))
        .or(grid_width)
        .unwrap_or(72.0);

    let grid_span = tc_pr
        .and_then(|pr| wml(pr, "gridSpan"))
        .and_then(|n| n.attribute((WML_NS, "val")))
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(1);

    // A bare <w:vMerge/> continues the merge above
    let v_merge = tc_pr
        .and_then(|pr| wml(pr, "vMerge"))
        .map(|n| match n.attribute((WML_NS, "val")) {
            Some("restart") => VMerge::Restart,
            _ => VMerge::Continue,
        })
        .unwrap_or(VMerge::None);

    let v_align = tc_pr
        .and_then(|pr| wml_attr(pr, "vAlign"))
        .map(|v| match v {
            "center" => CellVAlign::Center,
            "bottom" => CellVAlign::Bottom,
            _ => CellVAlign::Top,
        })
        .unwrap_or(CellVAlign::Top);

    let borders = tc_pr
        .and_then(|pr| wml(pr, "tcBorders"))
        .map(|bdr| {
            let left = parse_cell_border(bdr, "left");
            let right = parse_cell_border(bdr, "right");
            CellBorders {
                top: parse_cell_border(bdr, "top"),
                bottom: parse_cell_border(bdr, "bottom"),
                left: if left.present { left } else { parse_cell_border(bdr, "start") },
                right: if right.present { right } else { parse_cell_border(bdr, "end") },
                diagonal_down: parse_cell_border(bdr, "tl2br"),
            }
        })
        .unwrap_or_default();

    let shading = tc_pr
        .and_then(|pr| wml(pr, "shd"))
        .and_then(|shd| shd.attribute((WML_NS, "fill")))
        .and_then(parse_hex_color);

    let mut paragraphs: Vec<Paragraph> = tc
        .children()
        .filter(|n| is_wml(*n, "p"))
        .map(|p| parse_paragraph(p).0)
        .collect();
    if paragraphs.is_empty() {
        paragraphs.push(Paragraph::plain(""));
    }

    TableCell {
        width,
        paragraphs,
        borders,
        shading,
        grid_span,
        v_merge,
        v_align,
    }
}

/// Paragraph runs plus whether the paragraph carries an explicit page break.
fn parse_paragraph(p: roxmltree::Node) -> (Paragraph, bool) {
    let alignment = wml(p, "pPr")
        .and_then(|ppr| wml_attr(ppr, "jc"))
        .map(|v| match v {
            "center" => Alignment::Center,
            "right" | "end" => Alignment::Right,
            "both" => Alignment::Justify,
            _ => Alignment::Left,
        })
        .unwrap_or(Alignment::Left);

    fn collect_run_nodes<'a>(parent: roxmltree::Node<'a, 'a>, out: &mut Vec<roxmltree::Node<'a, 'a>>) {
        for child in parent.children() {
            if is_wml(child, "r") {
                out.push(child);
            } else if is_wml(child, "hyperlink") || is_wml(child, "smartTag") {
                collect_run_nodes(child, out);
            } else if is_wml(child, "sdt") {
                if let Some(content) = wml(child, "sdtContent") {
                    collect_run_nodes(content, out);
                }
            }
        }
    }
    let mut run_nodes = Vec::new();
    collect_run_nodes(p, &mut run_nodes);

    let mut runs = Vec::new();
    let mut page_break = false;
    for run_node in run_nodes {
        let rpr = wml(run_node, "rPr");
        let font_size = rpr
            .and_then(|n| wml_attr(n, "sz"))
            .and_then(|v| v.parse::<f32>().ok())
            .map(|hp| hp / 2.0);
        let bold = rpr.and_then(|n| wml_bool(n, "b")).unwrap_or(false);
        let italic = rpr.and_then(|n| wml_bool(n, "i")).unwrap_or(false);
        let color = rpr
            .and_then(|n| wml_attr(n, "color"))
            .and_then(parse_hex_color);

        let mut text = String::new();
        for child in run_node.children() {
            if child.tag_name().namespace() != Some(WML_NS) {
                continue;
            }
            match child.tag_name().name() {
                // Word treats newlines in w:t as whitespace; only w:br creates line breaks
                "t" => {
                    if let Some(t) = child.text() {
                        text.push_str(&t.replace('\n', " "));
                    }
                }
                "tab" => text.push('\t'),
                "br" => match child.attribute((WML_NS, "type")) {
                    Some("page") => page_break = true,
                    Some("column") => {}
                    _ => text.push('\n'),
                },
                _ => {}
            }
        }

        // Word splits runs arbitrarily; join neighbours with identical formatting
        // so markers like {{tag}} survive as one piece of text.
        match runs.last_mut() {
            Some(Run {
                text: prev,
                font_size: fs,
                bold: b,
                italic: i,
                color: c,
            }) if *fs == font_size && *b == bold && *i == italic && *c == color => {
                prev.push_str(&text)
            }
            _ => runs.push(Run {
                text,
                font_size,
                bold,
                italic,
                color,
            }),
        }
    }

    if runs.is_empty() {
        runs.push(Run::plain(""));
    }

    (Paragraph { runs, alignment }, page_break)
}
