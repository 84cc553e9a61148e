//! Tabular interchange format between the pipeline stages.
//!
//! One row per (time, lat, lon) with the columns `time`, `lat`, `lon`, `sst`.
//! The file extension selects the encoding: `.xlsx` or `.csv`. Missing
//! temperatures (land cells) are written as empty cells and read back as `NaN`.

use chrono::{Datelike, NaiveDateTime};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

mod delimited;
mod xlsx;

pub const COLUMNS: [&str; 4] = ["time", "lat", "lon", "sst"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SstRecord {
    pub time: NaiveDateTime,
    pub lat: f64,
    pub lon: f64,
    /// Degrees Celsius, `NaN` when missing.
    pub sst: f64,
}

impl SstRecord {
    pub fn year(&self) -> i32 {
        self.time.year()
    }
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write workbook: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),
    #[error("failed to read workbook: {0}")]
    XlsxRead(#[from] calamine::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{} contains no worksheet or no header row", .0.display())]
    Empty(PathBuf),
    #[error("missing column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: invalid {column} value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("unsupported table format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Xlsx,
    Csv,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "xlsx" => Ok(TableFormat::Xlsx),
            "csv" => Ok(TableFormat::Csv),
            _ => Err(TableError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Positions of the required columns in a header row. Other columns are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    time: usize,
    lat: usize,
    lon: usize,
    sst: usize,
}

impl ColumnIndex {
    fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<Self, TableError> {
        let headers: Vec<&str> = headers.into_iter().map(str::trim).collect();
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| *h == name)
                .ok_or(TableError::MissingColumn(name))
        };

        Ok(ColumnIndex {
            time: find("time")?,
            lat: find("lat")?,
            lon: find("lon")?,
            sst: find("sst")?,
        })
    }
}

fn invalid(row: usize, column: &'static str, value: impl ToString) -> TableError {
    TableError::InvalidValue {
        row,
        column,
        value: value.to_string(),
    }
}

/// Writes `records` to `path`, replacing any existing file.
pub fn write_records(path: &Path, records: &[SstRecord]) -> Result<(), TableError> {
    match TableFormat::from_path(path)? {
        TableFormat::Xlsx => xlsx::write(path, records),
        TableFormat::Csv => delimited::write(path, records),
    }
}

/// Reads and validates a table written by [`write_records`] (or any table with
/// the same four columns).
pub fn read_records(path: &Path) -> Result<Vec<SstRecord>, TableError> {
    let records = match TableFormat::from_path(path)? {
        TableFormat::Xlsx => xlsx::read(path)?,
        TableFormat::Csv => delimited::read(path)?,
    };
    log::debug!("Read {} rows from {}", records.len(), path.display());
    Ok(records)
}

/// Sorted distinct years present in `records`.
pub fn unique_years(records: &[SstRecord]) -> Vec<i32> {
    records
        .iter()
        .map(SstRecord::year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
