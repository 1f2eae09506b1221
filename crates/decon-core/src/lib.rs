pub mod catalog;
pub mod deconstruct;
pub mod diagnostics;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod pricing;

use serde::Serialize;
use tracing::{info, warn};

use catalog::schema::CatalogDef;
use deconstruct::outcome::{CustomerSummary, DeconstructedRecord, RowOutcome, RunStats, SkippedRow};
use deconstruct::{deconstruct_row, summarize, ResultAggregator};
use diagnostics::{Diagnostic, DiagnosticKind};
use error::DeconError;
use model::{RawRow, Table};
use parsing::header::{validate_columns, ColumnCheck};
use pricing::table::{PricingInput, PricingRuleTable};

/// Everything a finished run hands back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct DeconstructionReport {
    /// One record per configuration, cheapest base cost first seen.
    pub records: Vec<DeconstructedRecord>,
    pub summary: Vec<CustomerSummary>,
    pub skipped_rows: Vec<SkippedRow>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: RunStats,
}

/// A deconstruction run in progress.
///
/// Rows are pushed one at a time; only the per-configuration minimum is
/// kept between pushes.
pub struct Deconstruction<'a> {
    table: &'a PricingRuleTable,
    catalog: &'a CatalogDef,
    columns: ColumnCheck,
    aggregator: ResultAggregator,
    skipped: Vec<SkippedRow>,
    diagnostics: Vec<Diagnostic>,
    stats: RunStats,
}

impl<'a> Deconstruction<'a> {
    /// Check the headers against the column contract and open a run.
    pub fn start<S: AsRef<str>>(
        headers: &[S],
        table: &'a PricingRuleTable,
        catalog: &'a CatalogDef,
    ) -> Result<Self, DeconError> {
        let columns = validate_columns(headers, catalog);
        if !columns.is_valid() {
            return Err(DeconError::MissingRequiredColumns {
                missing: columns.missing_required.clone(),
                found: headers.iter().map(|h| h.as_ref().to_string()).collect(),
            });
        }

        let mut diagnostics = table.diagnostics().to_vec();
        for missing in &columns.missing_optional {
            warn!(column = %missing, "optional column missing");
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MissingOptionalColumn,
                format!("optional column '{missing}' not found, using 'Unknown'"),
            ));
        }

        Ok(Self {
            table,
            catalog,
            columns,
            aggregator: ResultAggregator::new(),
            skipped: Vec::new(),
            diagnostics,
            stats: RunStats::default(),
        })
    }

    /// Deconstruct the next data row.
    pub fn push_row(&mut self, row: &RawRow) {
        let row_index = self.stats.rows_read;
        self.stats.rows_read += 1;

        match deconstruct_row(row_index, row, &self.columns, self.table, self.catalog) {
            RowOutcome::Deconstructed {
                record,
                diagnostics,
            } => {
                self.stats.records_deconstructed += 1;
                self.diagnostics.extend(diagnostics);
                self.aggregator.push(record);
            }
            RowOutcome::Skipped(skipped) => {
                self.stats.rows_skipped += 1;
                self.skipped.push(skipped);
            }
        }
    }

    /// Close the run. Fails with `EmptyResult` when no row survived.
    pub fn finish(self) -> Result<DeconstructionReport, DeconError> {
        let mut stats = self.stats;
        if self.aggregator.is_empty() {
            warn!(
                rows = stats.rows_read,
                skipped = stats.rows_skipped,
                "no usable rows"
            );
            return Err(DeconError::EmptyResult {
                skipped: self.skipped,
            });
        }

        let records = self.aggregator.finish();
        stats.configurations = records.len();
        let summary = summarize(&records);

        info!(
            rows = stats.rows_read,
            skipped = stats.rows_skipped,
            configurations = stats.configurations,
            diagnostics = self.diagnostics.len(),
            "deconstruction finished"
        );

        Ok(DeconstructionReport {
            records,
            summary,
            skipped_rows: self.skipped,
            diagnostics: self.diagnostics,
            stats,
        })
    }
}

/// Main API entry point: build the pricing table for a submission and run
/// every row through it.
///
/// `NoPricingRules` is returned before any row is looked at.
pub fn deconstruct_rows<'r, S, I>(
    headers: &[S],
    rows: I,
    input: &PricingInput,
    catalog: &CatalogDef,
) -> Result<DeconstructionReport, DeconError>
where
    S: AsRef<str>,
    I: IntoIterator<Item = &'r RawRow>,
{
    let table = PricingRuleTable::from_input(input, catalog)?;
    let mut run = Deconstruction::start(headers, &table, catalog)?;
    for row in rows {
        run.push_row(row);
    }
    run.finish()
}

pub fn deconstruct_table(
    data: &Table,
    input: &PricingInput,
    catalog: &CatalogDef,
) -> Result<DeconstructionReport, DeconError> {
    deconstruct_rows(&data.headers, &data.rows, input, catalog)
}

/// Run a spreadsheet export, reading the catalog's configured sheet.
pub fn deconstruct_xlsx(
    bytes: &[u8],
    input: &PricingInput,
    catalog: &CatalogDef,
) -> Result<DeconstructionReport, DeconError> {
    let table = PricingRuleTable::from_input(input, catalog)?;
    let data = extraction::xlsx::read_workbook(bytes, &catalog.sheet_name)?;
    let mut run = Deconstruction::start(&data.headers, &table, catalog)?;
    for row in &data.rows {
        run.push_row(row);
    }
    run.finish()
}
