//! Spreadsheet decoding (xlsx, xlsm, xls, xlsb, ods) via calamine.
//!
//! Only the first sheet is read. Its first row supplies the headers.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Reader};
use chrono::NaiveTime;

use crate::error::{DataspanError, Result};
use super::parser::unique_headers;
use super::source::{is_blank, CellValue, Dataset, Row};

/// Decode the first sheet of a workbook held in memory.
pub(crate) fn decode_first_sheet(bytes: &[u8], max_rows: Option<usize>) -> Result<Dataset> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| DataspanError::Spreadsheet(format!("Failed to open workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DataspanError::EmptyData("Workbook contains no sheets".to_string()))?
        .map_err(|e| DataspanError::Spreadsheet(format!("Failed to read first sheet: {}", e)))?;

    let mut sheet_rows = range.rows();

    let header_cells = sheet_rows
        .next()
        .ok_or_else(|| DataspanError::EmptyData("First sheet is empty".to_string()))?;
    let header_names: Vec<String> = header_cells.iter().map(header_text).collect();
    let headers = unique_headers(header_names.iter().map(String::as_str));

    let mut rows = Vec::new();
    for cells in sheet_rows {
        if let Some(max) = max_rows {
            if rows.len() >= max {
                break;
            }
        }

        let row: Row = headers
            .iter()
            .zip(cells.iter())
            .filter_map(|(header, cell)| cell_value(cell).map(|value| (header.clone(), value)))
            .filter(|(_, value)| !is_blank(value))
            .collect();

        // Fully blank sheet rows carry no record
        if !row.is_empty() {
            rows.push(row);
        }
    }

    if rows.is_empty() {
        return Err(DataspanError::EmptyData("No data rows found".to_string()));
    }

    Ok(Dataset::new(headers, rows))
}

/// Convert a spreadsheet cell into a raw cell value. Empty, error and duration cells yield `None`.
fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty | Data::Error(_) | Data::DurationIso(_) => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Float(n) => Some(CellValue::Number(*n)),
        Data::Int(n) => Some(CellValue::Number(*n as f64)),
        Data::Bool(b) => Some(CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string())),
        Data::DateTime(dt) => datetime_text(dt).map(CellValue::Text),
        Data::DateTimeIso(s) => Some(CellValue::Text(s.clone())),
    }
}

fn header_text(cell: &Data) -> String {
    match cell_value(cell) {
        Some(value) => value.as_text().into_owned(),
        None => String::new(),
    }
}

/// Render a date cell as ISO 8601 text, honoring the workbook's date system.
///
/// Duration cells are not moments and yield `None`.
fn datetime_text(dt: &ExcelDateTime) -> Option<String> {
    if dt.is_duration() {
        return None;
    }

    let moment = dt.as_datetime()?;
    if moment.time() == NaiveTime::MIN {
        Some(moment.format("%Y-%m-%d").to_string())
    } else {
        Some(moment.format("%Y-%m-%dT%H:%M:%S").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use calamine::ExcelDateTimeType;

    fn date_cell(serial: f64, is_1904: bool) -> ExcelDateTime {
        ExcelDateTime::new(serial, ExcelDateTimeType::DateTime, is_1904)
    }

    #[test]
    fn test_datetime_text() {
        assert_eq!(datetime_text(&date_cell(36526.0, false)).as_deref(), Some("2000-01-01"));
        assert_eq!(
            datetime_text(&date_cell(36526.5, false)).as_deref(),
            Some("2000-01-01T12:00:00")
        );
    }

    #[test]
    fn test_1904_date_system() {
        // 1462 days separate the two epochs
        assert_eq!(datetime_text(&date_cell(35064.0, true)).as_deref(), Some("2000-01-01"));
        assert_eq!(
            cell_value(&Data::DateTime(date_cell(35064.0, true))),
            Some(CellValue::Text("2000-01-01".to_string()))
        );
    }

    #[test]
    fn test_duration_cells_are_skipped() {
        let duration = ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false);
        assert_eq!(datetime_text(&duration), None);
        assert_eq!(cell_value(&Data::DateTime(duration)), None);
        assert_eq!(cell_value(&Data::DurationIso("PT36H".to_string())), None);
    }

    #[test]
    fn test_cell_value_mapping() {
        assert_eq!(cell_value(&Data::Int(45)), Some(CellValue::Number(45.0)));
        assert_eq!(cell_value(&Data::Empty), None);
        assert_eq!(
            cell_value(&Data::Bool(true)),
            Some(CellValue::Text("TRUE".to_string()))
        );
        assert_eq!(header_text(&Data::Float(2001.0)), "2001");
    }

    #[test]
    fn test_garbage_bytes_are_a_spreadsheet_error() {
        let err = decode_first_sheet(b"definitely not a workbook", None).unwrap_err();
        assert!(matches!(err, DataspanError::Spreadsheet(_)));
    }
}
