//! Table loading from uploaded bytes.
//!
//! Turns a raw upload (delimited text or spreadsheet) into a [`Table`]:
//! separator sniffing for delimited sources, best-effort text decoding,
//! header parsing, duplicate column-name suffixing, and dtype
//! normalization. Malformed payloads surface as [`ExploreError::Load`];
//! invalid byte sequences never fail the load (lossy decode).

mod separator;

pub use separator::Separator;

use crate::error::{ExploreError, Result};
use crate::table::Table;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions};
use polars::prelude::*;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Number of leading bytes inspected for separator sniffing.
pub const SNIFF_WINDOW: usize = 1024;

/// Rows sampled for CSV schema inference.
const SCHEMA_INFERENCE_ROWS: usize = 100;

/// Parse an uploaded file into a table.
///
/// Dispatches on the filename extension: `.xlsx`/`.xls` are read as
/// spreadsheets (separator absent), anything else as delimited text with
/// an inferred separator.
pub fn load(raw: &[u8], filename: &str) -> Result<(Table, Option<Separator>)> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("xlsx") | Some("xls") => {
            let table = load_spreadsheet(raw, filename)?;
            info!(
                "Loaded spreadsheet '{}': {} rows x {} columns",
                filename,
                table.height(),
                table.width()
            );
            Ok((table, None))
        }
        _ => {
            let (table, separator) = load_delimited(raw, filename)?;
            info!(
                "Loaded '{}' with {}: {} rows x {} columns",
                filename,
                separator,
                table.height(),
                table.width()
            );
            Ok((table, Some(separator)))
        }
    }
}

/// Make column names unique by suffixing repeats with their occurrence
/// index: the second `"x"` becomes `"x_1"`, the third `"x_2"`.
pub fn unique_column_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    names
        .iter()
        .map(|name| {
            let name = name.as_ref().to_string();
            let count = seen.entry(name.clone()).or_insert(0);
            let unique = if *count == 0 {
                name.clone()
            } else {
                format!("{}_{}", name, count)
            };
            *count += 1;
            unique
        })
        .collect()
}

fn load_error(filename: &str, reason: impl ToString) -> ExploreError {
    ExploreError::Load {
        filename: filename.to_string(),
        reason: reason.to_string(),
    }
}

fn load_delimited(raw: &[u8], filename: &str) -> Result<(Table, Separator)> {
    let window = &raw[..raw.len().min(SNIFF_WINDOW)];
    let separator = Separator::sniff(&String::from_utf8_lossy(window));
    debug!("Sniffed separator for '{}': {}", filename, separator);

    // Best-effort decode: invalid sequences are replaced, never fatal.
    let text = String::from_utf8_lossy(raw).into_owned();
    let header_line = text
        .lines()
        .next()
        .filter(|line| !line.trim().is_empty())
        .ok_or_else(|| load_error(filename, "file is empty"))?;
    let header = parse_header(header_line, separator);

    // A header with no data rows is still a valid table; polars has no
    // body to infer a schema from, so build the empty frame directly.
    let has_data = text.lines().skip(1).any(|line| !line.trim().is_empty());
    if !has_data {
        let columns: Vec<Column> = unique_column_names(&header)
            .iter()
            .map(|name| {
                Series::new_empty(name.as_str().into(), &DataType::String).into_column()
            })
            .collect();
        let df = DataFrame::new(columns).map_err(|e| load_error(filename, e))?;
        return Ok((Table::from_dataframe(df)?, separator));
    }

    // The header row is parsed by hand so duplicate names get the
    // deterministic `_1`, `_2` suffixes instead of polars' own renaming.
    let df = CsvReadOptions::default()
        .with_has_header(false)
        .with_skip_rows(1)
        .with_infer_schema_length(Some(SCHEMA_INFERENCE_ROWS))
        .with_parse_options(CsvParseOptions::default().with_separator(separator.as_byte()))
        .into_reader_with_file_handle(Cursor::new(text))
        .finish()
        .map_err(|e| load_error(filename, e))?;

    let df = apply_header(df, &header, filename)?;
    Ok((Table::from_dataframe(df)?, separator))
}

fn parse_header(line: &str, separator: Separator) -> Vec<String> {
    line.trim_end_matches(['\r', '\n'])
        .split(separator.as_char())
        .map(|field| field.trim().trim_matches('"').to_string())
        .collect()
}

fn apply_header(mut df: DataFrame, header: &[String], filename: &str) -> Result<DataFrame> {
    if df.width() != header.len() {
        return Err(load_error(
            filename,
            format!(
                "header has {} fields but rows have {} fields",
                header.len(),
                df.width()
            ),
        ));
    }
    let names = unique_column_names(header);
    df.set_column_names(names)
        .map_err(|e| load_error(filename, e))?;
    Ok(df)
}

fn load_spreadsheet(raw: &[u8], filename: &str) -> Result<Table> {
    // Format detection by magic bytes, so both .xlsx and legacy .xls work.
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(raw)).map_err(|e| load_error(filename, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| load_error(filename, "workbook has no sheets"))?
        .map_err(|e| load_error(filename, e))?;

    let mut rows = range.rows();
    let header_cells = rows
        .next()
        .ok_or_else(|| load_error(filename, "first sheet is empty"))?;
    let header: Vec<String> = header_cells.iter().map(|cell| cell.to_string()).collect();
    let names = unique_column_names(&header);

    // Cells come in as text; Table normalization promotes all-numeric
    // columns back to Float64.
    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (j, column) in columns.iter_mut().enumerate() {
            column.push(row.get(j).and_then(cell_to_string));
        }
    }

    let series: Vec<Column> = names
        .iter()
        .zip(columns)
        .map(|(name, values)| Series::new(name.as_str().into(), values).into_column())
        .collect();
    let df = DataFrame::new(series).map_err(|e| load_error(filename, e))?;
    Ok(Table::from_dataframe(df)?)
}

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                Some(format!("{}", *f as i64))
            } else {
                Some(f.to_string())
            }
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
