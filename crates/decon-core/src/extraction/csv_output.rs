use std::io::Write;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::deconstruct::outcome::DeconstructedRecord;
use crate::error::DeconError;

/// Column headers of the results export, in order.
pub const EXPORT_COLUMNS: [&str; 13] = [
    "Customer",
    "Customer_Internal_ID",
    "Frame",
    "Item_Internal_ID",
    "Sales_Price",
    "Process",
    "Step_Process",
    "Coating",
    "Foil_Material",
    "Foil_Thickness",
    "Colour",
    "Attribute_Cost",
    "Base_Cost",
];

/// Results export layout.
#[derive(Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Customer")]
    customer: &'a str,
    #[serde(rename = "Customer_Internal_ID")]
    customer_internal_id: &'a str,
    #[serde(rename = "Frame")]
    frame: &'a str,
    #[serde(rename = "Item_Internal_ID")]
    item_internal_id: &'a str,
    #[serde(rename = "Sales_Price")]
    sale_price: Decimal,
    #[serde(rename = "Process")]
    process: &'a str,
    #[serde(rename = "Step_Process")]
    step_process: &'a str,
    #[serde(rename = "Coating")]
    coating: &'a str,
    #[serde(rename = "Foil_Material")]
    foil_material: &'a str,
    #[serde(rename = "Foil_Thickness")]
    foil_thickness: &'a str,
    #[serde(rename = "Colour")]
    colour: &'a str,
    #[serde(rename = "Attribute_Cost")]
    attribute_cost: Decimal,
    #[serde(rename = "Base_Cost")]
    base_cost: Decimal,
}

impl<'a> From<&'a DeconstructedRecord> for ExportRow<'a> {
    fn from(r: &'a DeconstructedRecord) -> Self {
        Self {
            customer: &r.customer,
            customer_internal_id: &r.customer_internal_id,
            frame: &r.frame,
            item_internal_id: &r.item_internal_id,
            sale_price: r.sale_price,
            process: &r.process,
            step_process: &r.step_process,
            coating: &r.coating,
            foil_material: &r.foil_material,
            foil_thickness: &r.foil_thickness,
            colour: &r.colour,
            attribute_cost: r.attribute_cost,
            base_cost: r.base_cost,
        }
    }
}

/// Write deconstructed records as CSV with a header row.
pub fn write_records<W: Write>(writer: W, records: &[DeconstructedRecord]) -> Result<(), DeconError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(ExportRow::from(record))?;
    }
    if records.is_empty() {
        wtr.write_record(EXPORT_COLUMNS)?;
    }
    wtr.flush()?;
    Ok(())
}
