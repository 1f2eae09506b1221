use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::parsing::values::parse_decimal;

/// A logical column of the sales export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    SalePrice,
    Frame,
    CustomerName,
    Process,
    StepProcess,
    Coating,
    FoilMaterial,
    FoilThickness,
    Colour,
    CustomerInternalId,
    ItemInternalId,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::SalePrice,
        Field::Frame,
        Field::CustomerName,
        Field::Process,
        Field::StepProcess,
        Field::Coating,
        Field::FoilMaterial,
        Field::FoilThickness,
        Field::Colour,
        Field::CustomerInternalId,
        Field::ItemInternalId,
    ];

    /// Required columns reject the whole dataset when missing; optional
    /// ones degrade to a sentinel value.
    pub fn is_required(self) -> bool {
        !matches!(self, Field::CustomerInternalId | Field::ItemInternalId)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::SalePrice => "sale_price",
            Field::Frame => "frame",
            Field::CustomerName => "customer_name",
            Field::Process => "process",
            Field::StepProcess => "step_process",
            Field::Coating => "coating",
            Field::FoilMaterial => "foil_material",
            Field::FoilThickness => "foil_thickness",
            Field::Colour => "colour",
            Field::CustomerInternalId => "customer_internal_id",
            Field::ItemInternalId => "item_internal_id",
        };
        write!(f, "{name}")
    }
}

/// A single scalar as handed over by a tabular reader.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(Decimal),
    Text(String),
}

impl CellValue {
    /// Trimmed text form, or None for empty and blank cells.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Number(d) => Some(d.normalize().to_string()),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }

    pub fn is_absent(&self) -> bool {
        self.as_text().is_none()
    }

    /// Numeric value of the cell. `Ok(None)` for absent cells, `Err` with
    /// the raw text when the cell holds something that is not a number.
    pub fn as_decimal(&self) -> Result<Option<Decimal>, String> {
        match self {
            CellValue::Number(d) => Ok(Some(*d)),
            CellValue::Bool(b) => Err(b.to_string()),
            _ => match self.as_text() {
                None => Ok(None),
                Some(text) => parse_decimal(&text).map(Some).map_err(|_| text),
            },
        }
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Empty,
            serde_json::Value::Bool(b) => CellValue::Bool(b),
            serde_json::Value::Number(n) => {
                let text = n.to_string();
                match parse_decimal(&text) {
                    Ok(d) => CellValue::Number(d),
                    Err(_) => CellValue::Text(text),
                }
            }
            serde_json::Value::String(s) => CellValue::Text(s),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<Decimal> for CellValue {
    fn from(value: Decimal) -> Self {
        CellValue::Number(value)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Number(d) => write!(f, "{}", d.normalize()),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One input row, keyed by the header exactly as it appears in the source.
pub type RawRow = BTreeMap<String, CellValue>;

/// Headers plus rows, as produced by the tabular adapters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<RawRow>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn blank_text_is_absent() {
        assert!(CellValue::Text("   ".into()).is_absent());
        assert!(CellValue::Empty.is_absent());
        assert!(!CellValue::Text(" F1 ".into()).is_absent());
    }

    #[test]
    fn numbers_render_without_trailing_zeros() {
        assert_eq!(
            CellValue::Number(dec!(1001.0)).as_text().as_deref(),
            Some("1001")
        );
    }

    #[test]
    fn decimal_from_text_cell() {
        assert_eq!(
            CellValue::Text(" 199.50 ".into()).as_decimal(),
            Ok(Some(dec!(199.50)))
        );
        assert_eq!(
            CellValue::Text("n/a".into()).as_decimal(),
            Err("n/a".to_string())
        );
        assert_eq!(CellValue::Empty.as_decimal(), Ok(None));
    }

    #[test]
    fn json_values_convert() {
        let row: RawRow = serde_json::from_str(
            r#"{"Sales Price": 120.5, "Frame": "F1", "Coating": null, "Flag": true}"#,
        )
        .unwrap();
        assert_eq!(row["Sales Price"], CellValue::Number(dec!(120.5)));
        assert_eq!(row["Frame"], CellValue::Text("F1".into()));
        assert_eq!(row["Coating"], CellValue::Empty);
        assert_eq!(row["Flag"], CellValue::Bool(true));
    }
}
