use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::DeconError;
use crate::model::{CellValue, RawRow, Table};
use crate::parsing::values::f64_to_decimal;

/// Read one worksheet of an xlsx workbook into a table.
///
/// The first row of the sheet is the header row. Fully blank data rows are
/// dropped and do not count towards row indices, so a row index is the
/// position among the non-blank data rows. Columns with a blank header are
/// ignored.
pub fn read_workbook(bytes: &[u8], sheet_name: &str) -> Result<Table, DeconError> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
        .map_err(|e| DeconError::Spreadsheet(format!("failed to open xlsx: {e}")))?;

    let available = workbook.sheet_names();
    if !available.iter().any(|s| s == sheet_name) {
        return Err(DeconError::SheetNotFound {
            sheet: sheet_name.to_string(),
            available,
        });
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| DeconError::Spreadsheet(format!("failed to read sheet '{sheet_name}': {e}")))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell_as_string(cell).unwrap_or_default())
            .collect(),
        None => return Ok(Table::default()),
    };

    let mut table = Table {
        headers,
        rows: Vec::new(),
    };

    for data_row in rows {
        let row: RawRow = table
            .headers
            .iter()
            .zip(data_row.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, cell)| (header.clone(), cell_value(cell)))
            .collect();

        if row.values().all(CellValue::is_absent) {
            continue;
        }
        table.rows.push(row);
    }

    debug!(
        sheet = sheet_name,
        columns = table.headers.len(),
        rows = table.rows.len(),
        "read worksheet"
    );
    Ok(table)
}

fn cell_as_string(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Empty => None,
        _ => Some(format!("{cell}")),
    }
}

/// Convert a calamine cell into a scalar the pipeline understands.
pub(crate) fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Number(Decimal::from(*i)),
        Data::Float(f) => match f64_to_decimal(*f) {
            Some(d) => CellValue::Number(d),
            None => CellValue::Text(f.to_string()),
        },
        Data::String(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(format!("{other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use rust_xlsxwriter::Workbook;

    const SALES_SHEET: &str = "SalesbyItemBASEPRICEDECON";

    /// Two-sheet workbook: a notes sheet, then the sales sheet with a fully
    /// blank row and a whitespace-only row between two data rows.
    fn sales_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        workbook
            .add_worksheet()
            .set_name("Notes")
            .unwrap()
            .write_string(0, 0, "exported by finance")
            .unwrap();

        let sheet = workbook.add_worksheet().set_name(SALES_SHEET).unwrap();
        for (col, header) in [" Sales Price ", "Frame", "Customer/Project: Company Name"]
            .iter()
            .enumerate()
        {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        sheet.write_number(1, 0, 200.0).unwrap();
        sheet.write_string(1, 1, "F1").unwrap();
        sheet.write_string(1, 2, "Acme").unwrap();
        // Row 2 left empty.
        sheet.write_string(3, 1, "   ").unwrap();
        sheet.write_number(4, 0, 95.5).unwrap();
        sheet.write_string(4, 1, "F2").unwrap();
        sheet.write_string(4, 2, "Beta").unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn missing_sheet_lists_available() {
        match read_workbook(&sales_workbook(), "Sheet1") {
            Err(DeconError::SheetNotFound { sheet, available }) => {
                assert_eq!(sheet, "Sheet1");
                assert_eq!(available, vec!["Notes".to_string(), SALES_SHEET.to_string()]);
            }
            other => panic!("expected SheetNotFound, got {other:?}"),
        }
    }

    #[test]
    fn first_row_is_header_and_blank_rows_dropped() {
        let table = read_workbook(&sales_workbook(), SALES_SHEET).unwrap();
        assert_eq!(
            table.headers,
            vec!["Sales Price", "Frame", "Customer/Project: Company Name"]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["Sales Price"], CellValue::Number(dec!(200)));
        assert_eq!(table.rows[1]["Frame"], CellValue::Text("F2".into()));
        assert_eq!(table.rows[1]["Sales Price"], CellValue::Number(dec!(95.5)));
    }

    #[test]
    fn numeric_cells_become_decimals() {
        assert_eq!(cell_value(&Data::Float(199.99)), CellValue::Number(dec!(199.99)));
        assert_eq!(cell_value(&Data::Int(200)), CellValue::Number(dec!(200)));
        assert_eq!(cell_value(&Data::Empty), CellValue::Empty);
        assert_eq!(
            cell_value(&Data::String(" Acme ".into())),
            CellValue::Text(" Acme ".into())
        );
    }

    #[test]
    fn header_cells_trimmed() {
        assert_eq!(cell_as_string(&Data::String("  Frame ".into())), Some("Frame".into()));
        assert_eq!(cell_as_string(&Data::String("   ".into())), None);
        assert_eq!(cell_as_string(&Data::Empty), None);
    }

    #[test]
    fn garbage_bytes_rejected() {
        let err = read_workbook(b"not a workbook", "Sheet1").unwrap_err();
        assert!(matches!(err, DeconError::Spreadsheet(_)));
    }
}
