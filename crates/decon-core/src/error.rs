use std::path::PathBuf;

use crate::deconstruct::outcome::SkippedRow;

#[derive(Debug, thiserror::Error)]
pub enum DeconError {
    #[error("no non-zero pricing rules were supplied. Provide at least one process or coating cost")]
    NoPricingRules,

    #[error("no usable rows after deconstruction ({} row(s) skipped)", skipped.len())]
    EmptyResult { skipped: Vec<SkippedRow> },

    #[error("missing required columns: {}. Found: {}", missing.join(", "), found.join(", "))]
    MissingRequiredColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("sheet '{sheet}' not found. Available sheets: {}", available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("failed to parse input: {0}")]
    ParseError(String),

    #[error("failed to load catalog from {path}: {reason}")]
    CatalogLoad { path: PathBuf, reason: String },

    #[error("invalid catalog: {0}")]
    CatalogInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
