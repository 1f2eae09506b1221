use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::deconstruct::outcome::DeconstructedRecord;
use crate::error::DeconError;
use crate::extraction::csv_output::EXPORT_COLUMNS;

/// Worksheet name used for the results export.
pub const RESULTS_SHEET: &str = "Results";

/// Write deconstructed records as an xlsx workbook and return its bytes.
///
/// Same column layout as the CSV export. Money columns are written as
/// numbers.
pub fn write_records_xlsx(records: &[DeconstructedRecord]) -> Result<Vec<u8>, DeconError> {
    build_workbook(records).map_err(|e| DeconError::Spreadsheet(format!("failed to write xlsx: {e}")))
}

fn build_workbook(records: &[DeconstructedRecord]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet().set_name(RESULTS_SHEET)?;
    for (col, header) in EXPORT_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }

    for (i, r) in records.iter().enumerate() {
        let row = i as u32 + 1;
        let text = [
            &r.customer,
            &r.customer_internal_id,
            &r.frame,
            &r.item_internal_id,
        ];
        for (col, value) in text.iter().enumerate() {
            sheet.write_string(row, col as u16, value.as_str())?;
        }
        write_money(sheet, row, 4, r.sale_price)?;
        let classification = [
            &r.process,
            &r.step_process,
            &r.coating,
            &r.foil_material,
            &r.foil_thickness,
            &r.colour,
        ];
        for (offset, value) in classification.iter().enumerate() {
            sheet.write_string(row, 5 + offset as u16, value.as_str())?;
        }
        write_money(sheet, row, 11, r.attribute_cost)?;
        write_money(sheet, row, 12, r.base_cost)?;
    }

    workbook.save_to_buffer()
}

fn write_money(sheet: &mut Worksheet, row: u32, col: u16, value: Decimal) -> Result<(), XlsxError> {
    match value.to_f64() {
        Some(n) => sheet.write_number(row, col, n)?,
        None => sheet.write_string(row, col, value.to_string())?,
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::xlsx::read_workbook;
    use crate::model::CellValue;
    use rust_decimal_macros::dec;

    fn record(customer: &str, base: Decimal) -> DeconstructedRecord {
        DeconstructedRecord {
            row_index: 0,
            customer: customer.into(),
            customer_internal_id: "C-1".into(),
            frame: "F1".into(),
            item_internal_id: "Unknown".into(),
            sale_price: dec!(200.5),
            process: "Chemetch".into(),
            step_process: "Single".into(),
            coating: "None".into(),
            foil_material: "M".into(),
            foil_thickness: "T".into(),
            colour: "Red".into(),
            attribute_cost: dec!(50),
            base_cost: base,
        }
    }

    #[test]
    fn export_reads_back_with_layout() {
        let bytes = write_records_xlsx(&[record("Acme", dec!(150.5)), record("Beta", dec!(-3))]).unwrap();
        let table = read_workbook(&bytes, RESULTS_SHEET).unwrap();

        assert_eq!(table.headers, EXPORT_COLUMNS.to_vec());
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["Customer"], CellValue::Text("Acme".into()));
        assert_eq!(table.rows[0]["Sales_Price"], CellValue::Number(dec!(200.5)));
        assert_eq!(table.rows[1]["Base_Cost"], CellValue::Number(dec!(-3)));
        assert_eq!(table.rows[1]["Step_Process"], CellValue::Text("Single".into()));
    }

    #[test]
    fn empty_export_has_header_row() {
        let bytes = write_records_xlsx(&[]).unwrap();
        let table = read_workbook(&bytes, RESULTS_SHEET).unwrap();
        assert_eq!(table.headers.len(), EXPORT_COLUMNS.len());
        assert!(table.rows.is_empty());
    }
}
