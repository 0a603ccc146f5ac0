//! Spreadsheet decoding for bulk import
//!
//! Workbooks (`.xlsx`, `.xls`, `.ods`) are read with calamine from memory,
//! first sheet only. Anything that is not a workbook is read as UTF-8 CSV.
//! The first row is the header; later rows become header-keyed cells.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::collections::HashMap;
use std::io::Cursor;

use crate::types::AdminError;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Workbook,
    Csv,
}

impl SheetFormat {
    /// Detect by content, not by file name
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
            Self::Workbook
        } else {
            Self::Csv
        }
    }
}

/// One non-empty data row
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    /// 1-based row number as shown by a spreadsheet app (header is row 1)
    pub number: usize,
    pub cells: HashMap<String, String>,
}

/// Decode an uploaded file into data rows
pub fn read_rows(bytes: &[u8]) -> Result<Vec<SheetRow>, AdminError> {
    match SheetFormat::detect(bytes) {
        SheetFormat::Workbook => read_workbook(bytes),
        SheetFormat::Csv => read_csv(bytes),
    }
}

fn data_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{:.0}", f)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#ERR:{:?}", e),
    }
}

/// Pair header names with cell values, dropping rows with no content
fn build_row(headers: &[String], values: Vec<String>, number: usize) -> Option<SheetRow> {
    if values.iter().all(|v| v.trim().is_empty()) {
        return None;
    }

    let cells = headers
        .iter()
        .zip(values)
        .filter(|(header, _)| !header.is_empty())
        .map(|(header, value)| (header.clone(), value))
        .collect();

    Some(SheetRow { number, cells })
}

fn read_workbook(bytes: &[u8]) -> Result<Vec<SheetRow>, AdminError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| AdminError::Parse(format!("Unreadable workbook: {}", e)))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| AdminError::Parse(format!("Unreadable sheet: {}", e)))?,
        None => return Ok(Vec::new()),
    };

    // Ranges start at the first used cell, not at A1
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

    let mut rows = range.rows().enumerate();
    let headers: Vec<String> = match rows.next() {
        Some((_, header)) => header.iter().map(|c| data_to_string(c).trim().to_string()).collect(),
        None => return Ok(Vec::new()),
    };

    Ok(rows
        .filter_map(|(offset, row)| {
            let values = row.iter().map(data_to_string).collect();
            build_row(&headers, values, first_row + offset + 1)
        })
        .collect())
}

fn read_csv(bytes: &[u8]) -> Result<Vec<SheetRow>, AdminError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AdminError::Parse(format!("Unreadable CSV header: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| AdminError::Parse(format!("Unreadable CSV row: {}", e)))?;
        let values = record.iter().map(str::to_string).collect();
        let number = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        if let Some(row) = build_row(&headers, values, number) {
            rows.push(row);
        }
    }

    Ok(rows)
}
