use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::Field;

/// Vocabularies and column contract a pricing submission is checked against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Worksheet holding the sales export in spreadsheet input.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    /// Ordered process vocabulary with the steps each process accepts.
    pub processes: Vec<ProcessDef>,
    pub coatings: Vec<String>,
    #[serde(default)]
    pub laserstep_fallback: Option<FallbackDef>,
    /// Field -> accepted header names. The first name is the canonical one.
    pub columns: BTreeMap<Field, Vec<String>>,
}

/// A manufacturing process and its step labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessDef {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<String>,
    /// Rows with this process never carry a surcharge.
    #[serde(default)]
    pub zero_cost: bool,
    /// Steps are hyphenated ranges ("1-20"); spacing around the hyphen in
    /// a row's step is collapsed before lookup.
    #[serde(default)]
    pub range_steps: bool,
}

/// Price implication for a step family that a short rule file leaves out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackDef {
    pub process: String,
    /// Step whose price the extension steps inherit.
    pub source_step: String,
    /// Used when the source step itself resolves to zero.
    pub default_cost: Decimal,
    pub extension_steps: Vec<String>,
}

fn default_sheet_name() -> String {
    "SalesbyItemBASEPRICEDECON".to_string()
}

impl CatalogDef {
    pub fn process(&self, name: &str) -> Option<&ProcessDef> {
        self.processes.iter().find(|p| p.name == name)
    }

    pub fn has_step(&self, process: &str, step: &str) -> bool {
        self.process(process)
            .map(|p| p.steps.iter().any(|s| s == step))
            .unwrap_or(false)
    }

    pub fn has_coating(&self, name: &str) -> bool {
        self.coatings.iter().any(|c| c == name)
    }

    pub fn is_zero_cost(&self, process: &str) -> bool {
        self.process(process).map(|p| p.zero_cost).unwrap_or(false)
    }

    pub fn has_range_steps(&self, process: &str) -> bool {
        self.process(process).map(|p| p.range_steps).unwrap_or(false)
    }

    /// Header names accepted for a field.
    pub fn column_names(&self, field: Field) -> &[String] {
        self.columns.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Display name of a field's column.
    pub fn canonical_column(&self, field: Field) -> String {
        self.column_names(field)
            .first()
            .cloned()
            .unwrap_or_else(|| field.to_string())
    }

    /// Fallback rule applying to an extension step of a process, if any.
    pub fn fallback_for(&self, process: &str, step: &str) -> Option<&FallbackDef> {
        self.laserstep_fallback
            .as_ref()
            .filter(|fb| fb.process == process && fb.extension_steps.iter().any(|s| s == step))
    }
}
