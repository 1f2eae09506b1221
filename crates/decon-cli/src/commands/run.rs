use decon_core::catalog::schema::CatalogDef;
use decon_core::error::DeconError;
use decon_core::extraction::csv_input::CsvRows;
use decon_core::extraction::{self, csv_output, xlsx_output, InputFormat};
use decon_core::pricing::{PricingInput, PricingRuleTable};
use decon_core::{Deconstruction, DeconstructionReport};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::output;

pub fn run(
    input_file: PathBuf,
    rules: Option<PathBuf>,
    set: Vec<String>,
    catalog: Option<PathBuf>,
    output_format: &str,
    out: Option<PathBuf>,
    verbose: bool,
) -> Result<(), DeconError> {
    let catalog = super::load_catalog(catalog.as_deref())?;

    let rule_text = match rules {
        Some(path) => Some(std::fs::read_to_string(&path)?),
        None => None,
    };
    let overrides = set
        .iter()
        .map(|pair| parse_set(pair))
        .collect::<Result<Vec<_>, _>>()?;
    let input = PricingInput {
        rule_text,
        overrides,
    };

    // Rules are checked before the export is even opened.
    let table = PricingRuleTable::from_input(&input, &catalog)?;
    let report = deconstruct_file(&input_file, &table, &catalog)?;

    match output_format {
        "json" => output::json::print(&report)?,
        "csv" => output::csv::print(&report)?,
        "table" => output::table::print(&report, verbose),
        other => {
            return Err(DeconError::ParseError(format!(
                "unknown output format '{other}'. Expected table, json or csv"
            )))
        }
    }

    if let Some(out_path) = out {
        write_results(&out_path, &report)?;
        eprintln!("Results written to {}", out_path.display());
    }

    Ok(())
}

/// Split a `KEY=VALUE` manual entry at the first '='.
fn parse_set(pair: &str) -> Result<(String, String), DeconError> {
    pair.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| {
            DeconError::ParseError(format!("--set expects KEY=VALUE, got '{pair}'"))
        })
}

fn deconstruct_file(
    path: &Path,
    table: &PricingRuleTable,
    catalog: &CatalogDef,
) -> Result<DeconstructionReport, DeconError> {
    let format = InputFormat::from_path(path)?;
    info!(input = %path.display(), ?format, "reading export");
    match format {
        // CSV exports are streamed row by row.
        InputFormat::Csv => {
            let rows = CsvRows::new(std::fs::File::open(path)?)?;
            let headers = rows.headers().to_vec();
            let mut run = Deconstruction::start(&headers, table, catalog)?;
            for row in rows {
                run.push_row(&row?);
            }
            run.finish()
        }
        InputFormat::Xlsx | InputFormat::Json => {
            let data = extraction::read_table(path, &catalog.sheet_name)?;
            let mut run = Deconstruction::start(&data.headers, table, catalog)?;
            for row in &data.rows {
                run.push_row(row);
            }
            run.finish()
        }
    }
}

fn write_results(path: &Path, report: &DeconstructionReport) -> Result<(), DeconError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => csv_output::write_records(std::fs::File::create(path)?, &report.records),
        "json" => {
            let json = serde_json::to_string_pretty(report)?;
            std::fs::write(path, json)?;
            Ok(())
        }
        "xlsx" => {
            std::fs::write(path, xlsx_output::write_records_xlsx(&report.records)?)?;
            Ok(())
        }
        other => Err(DeconError::ParseError(format!(
            "cannot write results as '{other}'. Use a .csv, .json or .xlsx file"
        ))),
    }
}
