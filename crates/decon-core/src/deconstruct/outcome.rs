use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::diagnostics::Diagnostic;

/// One sales line with its surcharges stripped out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeconstructedRecord {
    /// 0-based position of the source row among the data rows. Fully blank
    /// rows are dropped by the tabular adapters and not counted.
    pub row_index: usize,
    pub customer: String,
    pub customer_internal_id: String,
    pub frame: String,
    pub item_internal_id: String,
    pub sale_price: Decimal,
    pub process: String,
    pub step_process: String,
    pub coating: String,
    pub foil_material: String,
    pub foil_thickness: String,
    pub colour: String,
    /// Process step cost plus coating cost (zero for zero-cost processes).
    pub attribute_cost: Decimal,
    /// `sale_price - attribute_cost`. Negative values are kept as-is.
    pub base_cost: Decimal,
}

impl DeconstructedRecord {
    pub fn aggregation_key(&self) -> AggregationKey {
        AggregationKey {
            customer: self.customer.clone(),
            process: self.process.clone(),
            step_process: self.step_process.clone(),
            coating: self.coating.clone(),
            foil_material: self.foil_material.clone(),
            foil_thickness: self.foil_thickness.clone(),
            colour: self.colour.clone(),
        }
    }
}

/// A product configuration for one customer. Sale price is deliberately not
/// part of the key: repeated configurations collapse to their cheapest base.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AggregationKey {
    pub customer: String,
    pub process: String,
    pub step_process: String,
    pub coating: String,
    pub foil_material: String,
    pub foil_thickness: String,
    pub colour: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Canonical names of the required fields that were empty.
    MissingFields { fields: Vec<String> },
    InvalidSalePrice { value: String },
    /// Attribute or base cost does not fit a decimal.
    CostOverflow { detail: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingFields { fields } => {
                write!(f, "missing required fields: {}", fields.join(", "))
            }
            SkipReason::InvalidSalePrice { value } => write!(f, "invalid sales price: '{value}'"),
            SkipReason::CostOverflow { detail } => write!(f, "cost overflow: {detail}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub row_index: usize,
    #[serde(flatten)]
    pub reason: SkipReason,
}

impl fmt::Display for SkippedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row_index, self.reason)
    }
}

/// What happened to a single input row.
#[derive(Debug, Clone)]
pub enum RowOutcome {
    Deconstructed {
        record: DeconstructedRecord,
        /// Unresolved rule lookups, reported once each for this row.
        diagnostics: Vec<Diagnostic>,
    },
    Skipped(SkippedRow),
}

/// Lowest base cost found for a customer across its configurations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub customer: String,
    pub lowest_base_cost: Decimal,
    /// Number of distinct configurations kept for this customer.
    pub configurations: usize,
    pub process: String,
    pub step_process: String,
    pub coating: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub records_deconstructed: usize,
    pub configurations: usize,
}
