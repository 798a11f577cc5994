use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use docxide_expand::model::{Block, Document};
use serde_json::{Map, Value};

/// Expand the repeating rows of a DOCX table template against JSON data.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Template .docx file
    input: PathBuf,
    /// JSON object with the data and the `<tag>_*` loop settings
    #[arg(short, long)]
    data: PathBuf,
    /// Print the expansion reports as JSON instead of the document outline
    #[arg(long)]
    json: bool,
    /// Only report these loop tags (repeatable); all tags when absent
    #[arg(short, long)]
    tag: Vec<String>,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), docxide_expand::Error> {
    let env_text = std::fs::read_to_string(&cli.data)?;
    let env: Map<String, Value> = serde_json::from_str(&env_text)?;
    let (doc, reports) = docxide_expand::expand_docx(&cli.input, &env)?;
    let reports = docxide_expand::select_reports(reports, &cli.tag);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print!("{}", outline(&doc));
        for r in &reports {
            println!(
                "{}: {} items ({} nested), {} pages, {} fill rows",
                r.tag, r.items, r.nested_items, r.pages, r.fill_rows
            );
        }
    }
    Ok(())
}

fn outline(doc: &Document) -> String {
    let mut out = String::new();
    for block in &doc.blocks {
        match block {
            Block::Paragraph(p) => out.push_str(&format!("¶ {}\n", p.text())),
            Block::PageBreak => out.push_str("--- page break ---\n"),
            Block::Table(t) => {
                out.push_str(&format!("table ({} rows)\n", t.rows.len()));
                for row in &t.rows {
                    out.push_str(&format!("  | {} |\n", row.text().join(" | ")));
                }
            }
        }
    }
    out
}
