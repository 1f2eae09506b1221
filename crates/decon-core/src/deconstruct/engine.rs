use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::catalog::schema::CatalogDef;
use crate::deconstruct::outcome::{DeconstructedRecord, RowOutcome, SkipReason, SkippedRow};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::model::{CellValue, Field, RawRow};
use crate::parsing::header::ColumnCheck;
use crate::parsing::normalize::collapse_hyphen_spacing;
use crate::pricing::table::PricingRuleTable;

/// Placeholder for absent process, foil, colour and identifier fields.
pub const UNKNOWN: &str = "Unknown";
/// Placeholder for absent step and coating fields.
///
/// A "None" coating means the row has no coating: it is priced at zero and
/// no coating lookup is attempted, so it never raises an unresolved-coating
/// diagnostic. Stock exports carry "None" on most rows and would otherwise
/// flood the report.
pub const NONE: &str = "None";

/// A row that passed the required-field checks, with every field trimmed
/// and defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidInputRow {
    pub sale_price: Decimal,
    pub frame: String,
    pub customer_name: String,
    pub process: String,
    pub step_process: String,
    pub coating: String,
    pub foil_material: String,
    pub foil_thickness: String,
    pub colour: String,
    pub customer_internal_id: String,
    pub item_internal_id: String,
}

/// Read and normalize one raw row, or say why it cannot be used.
pub fn extract_row(
    row: &RawRow,
    columns: &ColumnCheck,
    catalog: &CatalogDef,
) -> Result<ValidInputRow, SkipReason> {
    let cell = |field: Field| {
        columns
            .header_for(field)
            .and_then(|h| row.get(h))
            .unwrap_or(&CellValue::Empty)
    };
    let text = |field: Field, default: &str| -> String {
        cell(field).as_text().unwrap_or_else(|| default.to_string())
    };

    let missing: Vec<String> = [Field::SalePrice, Field::Frame, Field::CustomerName]
        .into_iter()
        .filter(|f| cell(*f).is_absent())
        .map(|f| catalog.canonical_column(f))
        .collect();
    if !missing.is_empty() {
        return Err(SkipReason::MissingFields { fields: missing });
    }

    let sale_price = match cell(Field::SalePrice).as_decimal() {
        Ok(Some(price)) => price,
        Ok(None) => {
            return Err(SkipReason::MissingFields {
                fields: vec![catalog.canonical_column(Field::SalePrice)],
            })
        }
        Err(value) => return Err(SkipReason::InvalidSalePrice { value }),
    };

    let process = text(Field::Process, UNKNOWN);
    let mut step_process = text(Field::StepProcess, NONE);
    if catalog.has_range_steps(&process) {
        step_process = collapse_hyphen_spacing(&step_process);
    }

    Ok(ValidInputRow {
        sale_price,
        frame: text(Field::Frame, UNKNOWN),
        customer_name: text(Field::CustomerName, UNKNOWN),
        process,
        step_process,
        coating: text(Field::Coating, NONE),
        foil_material: text(Field::FoilMaterial, UNKNOWN),
        foil_thickness: text(Field::FoilThickness, UNKNOWN),
        colour: text(Field::Colour, UNKNOWN),
        customer_internal_id: text(Field::CustomerInternalId, UNKNOWN),
        item_internal_id: text(Field::ItemInternalId, UNKNOWN),
    })
}

/// Resolve the attribute cost of a valid row.
///
/// Zero-cost processes carry no surcharge at all. Otherwise the process
/// step cost and the coating cost are summed; a lookup miss counts as zero
/// and yields one diagnostic. The "None" coating is no coating.
///
/// Fails with `CostOverflow` when the sum does not fit a decimal.
pub fn attribute_cost(
    row: &ValidInputRow,
    row_index: usize,
    table: &PricingRuleTable,
    catalog: &CatalogDef,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Decimal, SkipReason> {
    if catalog.is_zero_cost(&row.process) {
        return Ok(Decimal::ZERO);
    }

    let mut cost = Decimal::ZERO;

    match table.process_cost(&row.process, &row.step_process) {
        Some(c) => cost = add_cost(cost, c)?,
        None => {
            warn!(
                row = row_index,
                process = %row.process,
                step = %row.step_process,
                "no rule for process step"
            );
            diagnostics.push(Diagnostic::at(
                DiagnosticKind::UnresolvedProcessStep,
                row_index,
                format!(
                    "no rule for process '{}' step '{}', priced at 0",
                    row.process, row.step_process
                ),
            ));
        }
    }

    if row.coating != NONE {
        match table.coating_cost(&row.coating) {
            Some(c) => cost = add_cost(cost, c)?,
            None => {
                warn!(row = row_index, coating = %row.coating, "no rule for coating");
                diagnostics.push(Diagnostic::at(
                    DiagnosticKind::UnresolvedCoating,
                    row_index,
                    format!("no rule for coating '{}', priced at 0", row.coating),
                ));
            }
        }
    }

    Ok(cost)
}

fn add_cost(total: Decimal, cost: Decimal) -> Result<Decimal, SkipReason> {
    total.checked_add(cost).ok_or_else(|| SkipReason::CostOverflow {
        detail: format!("attribute cost {total} + {cost} is out of range"),
    })
}

/// Deconstruct one raw row against a pricing rule table.
pub fn deconstruct_row(
    row_index: usize,
    row: &RawRow,
    columns: &ColumnCheck,
    table: &PricingRuleTable,
    catalog: &CatalogDef,
) -> RowOutcome {
    let valid = match extract_row(row, columns, catalog) {
        Ok(valid) => valid,
        Err(reason) => {
            debug!(row = row_index, %reason, "row skipped");
            return RowOutcome::Skipped(SkippedRow { row_index, reason });
        }
    };

    let mut diagnostics = Vec::new();
    let costs = attribute_cost(&valid, row_index, table, catalog, &mut diagnostics).and_then(
        |attribute_cost| {
            valid
                .sale_price
                .checked_sub(attribute_cost)
                .map(|base_cost| (attribute_cost, base_cost))
                .ok_or_else(|| SkipReason::CostOverflow {
                    detail: format!(
                        "base cost {} - {attribute_cost} is out of range",
                        valid.sale_price
                    ),
                })
        },
    );
    let (attribute_cost, base_cost) = match costs {
        Ok(costs) => costs,
        Err(reason) => {
            warn!(row = row_index, %reason, "row skipped");
            return RowOutcome::Skipped(SkippedRow { row_index, reason });
        }
    };
    if base_cost.is_sign_negative() && !base_cost.is_zero() {
        warn!(row = row_index, %base_cost, "negative base cost");
    }
    debug!(
        row = row_index,
        sale_price = %valid.sale_price,
        %attribute_cost,
        %base_cost,
        "row deconstructed"
    );

    RowOutcome::Deconstructed {
        record: DeconstructedRecord {
            row_index,
            customer: valid.customer_name,
            customer_internal_id: valid.customer_internal_id,
            frame: valid.frame,
            item_internal_id: valid.item_internal_id,
            sale_price: valid.sale_price,
            process: valid.process,
            step_process: valid.step_process,
            coating: valid.coating,
            foil_material: valid.foil_material,
            foil_thickness: valid.foil_thickness,
            colour: valid.colour,
            attribute_cost,
            base_cost,
        },
        diagnostics,
    }
}
