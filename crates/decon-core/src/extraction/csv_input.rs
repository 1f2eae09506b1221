use std::io::Read;

use csv::{ReaderBuilder, StringRecordsIntoIter, Trim};

use crate::error::DeconError;
use crate::model::{CellValue, RawRow, Table};

/// Streaming reader over a delimited export.
///
/// Rows are decoded one at a time so a caller can push them straight into
/// the pipeline without holding the whole file. Fully blank lines are never
/// yielded, so they take no row index downstream.
pub struct CsvRows<R: Read> {
    headers: Vec<String>,
    records: StringRecordsIntoIter<R>,
}

impl<R: Read> CsvRows<R> {
    pub fn new(reader: R) -> Result<Self, DeconError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.iter().map(str::to_string).collect();
        Ok(Self {
            headers,
            records: reader.into_records(),
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = Result<RawRow, DeconError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e.into())),
            };

            let row: RawRow = self
                .headers
                .iter()
                .zip(record.iter())
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, value)| {
                    let cell = if value.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(value.to_string())
                    };
                    (header.clone(), cell)
                })
                .collect();

            // Skip fully blank lines.
            if row.values().all(CellValue::is_absent) {
                continue;
            }
            return Some(Ok(row));
        }
    }
}

/// Read a whole delimited export into a table.
pub fn read_csv<R: Read>(reader: R) -> Result<Table, DeconError> {
    let rows = CsvRows::new(reader)?;
    let headers = rows.headers().to_vec();
    let rows = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(Table { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Sales Price, Frame ,Customer/Project: Company Name,Process
200,F1, Acme ,Chemetch
,,,
95.5,F2,Beta
";

    #[test]
    fn reads_headers_and_rows() {
        let table = read_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(
            table.headers,
            vec!["Sales Price", "Frame", "Customer/Project: Company Name", "Process"]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["Customer/Project: Company Name"], CellValue::Text("Acme".into()));
    }

    #[test]
    fn short_rows_leave_columns_out() {
        let table = read_csv(SAMPLE.as_bytes()).unwrap();
        assert!(!table.rows[1].contains_key("Process"));
        assert_eq!(table.rows[1]["Sales Price"], CellValue::Text("95.5".into()));
    }

    #[test]
    fn streaming_matches_collected() {
        let streamed: Vec<RawRow> = CsvRows::new(SAMPLE.as_bytes())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(streamed, read_csv(SAMPLE.as_bytes()).unwrap().rows);
    }
}
