pub mod config;
pub mod docx;
mod error;
pub mod expand;
pub mod model;
pub mod render;
pub mod scope;

pub use error::{Error, ExpandErrorKind};
pub use expand::{ExpansionReport, render_document, select_reports};
pub use render::{CellRenderer, PlaceholderRenderer};

use std::path::Path;
use std::time::Instant;

use model::Document;
use serde_json::{Map, Value};

/// Load a DOCX template, expand its loop tables against `env` and return the
/// expanded document with one report per loop tag.
pub fn expand_docx(
    input: &Path,
    env: &Map<String, Value>,
) -> Result<(Document, Vec<ExpansionReport>), Error> {
    let t0 = Instant::now();

    let mut doc = docx::parse(input)?;
    let t_parse = t0.elapsed();

    let mut renderer = PlaceholderRenderer::default();
    let reports = render_document(&mut doc, env, &mut renderer)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, expand={:.1}ms, total={:.1}ms ({} loops, {} unresolved placeholders)",
        t_parse.as_secs_f64() * 1000.0,
        (t_total - t_parse).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        reports.len(),
        renderer.unresolved,
    );

    Ok((doc, reports))
}

/// Same as [`expand_docx`] for a template already in memory; `env_json` must be a JSON object.
pub fn expand_docx_bytes(
    input: &[u8],
    env_json: &str,
) -> Result<(Document, Vec<ExpansionReport>), Error> {
    let env: Map<String, Value> = serde_json::from_str(env_json)?;
    let mut doc = docx::parse_bytes(input)?;
    let mut renderer = PlaceholderRenderer::default();
    let reports = render_document(&mut doc, &env, &mut renderer)?;
    Ok((doc, reports))
}
