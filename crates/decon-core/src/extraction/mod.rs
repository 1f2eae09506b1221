pub mod csv_input;
pub mod csv_output;
pub mod xlsx;
pub mod xlsx_output;

use std::path::Path;

use crate::error::DeconError;
use crate::model::Table;

/// Tabular input formats understood by the adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Xlsx,
    Csv,
    /// Pre-parsed `{ "headers": [...], "rows": [{...}] }`.
    Json,
}

impl InputFormat {
    /// Pick a format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, DeconError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" => Ok(InputFormat::Xlsx),
            "csv" => Ok(InputFormat::Csv),
            "json" => Ok(InputFormat::Json),
            other => Err(DeconError::ParseError(format!(
                "unsupported input type '{other}'. Expected .xlsx, .csv or .json"
            ))),
        }
    }
}

/// Read a whole input file into a table.
pub fn read_table(path: &Path, sheet_name: &str) -> Result<Table, DeconError> {
    match InputFormat::from_path(path)? {
        InputFormat::Xlsx => {
            let bytes = std::fs::read(path)?;
            xlsx::read_workbook(&bytes, sheet_name)
        }
        InputFormat::Csv => csv_input::read_csv(std::fs::File::open(path)?),
        InputFormat::Json => {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
    }
}
