use calamine::{Data, DataType, Reader, open_workbook_auto};
use chrono::NaiveDateTime;
use rust_xlsxwriter::Workbook;
use std::path::Path;

use super::{COLUMNS, ColumnIndex, SstRecord, TableError, invalid};
use crate::time::{format_timestamp, parse_timestamp};

const SHEET_NAME: &str = "sst";

static EMPTY_CELL: Data = Data::Empty;

pub(super) fn write(path: &Path, records: &[SstRecord]) -> Result<(), TableError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write_string(row, 0, format_timestamp(&record.time))?;
        worksheet.write_number(row, 1, record.lat)?;
        worksheet.write_number(row, 2, record.lon)?;
        if record.sst.is_finite() {
            worksheet.write_number(row, 3, record.sst)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

pub(super) fn read(path: &Path) -> Result<Vec<SstRecord>, TableError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TableError::Empty(path.to_path_buf()))??;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| TableError::Empty(path.to_path_buf()))?
        .iter()
        .map(|cell| cell.to_string())
        .collect();
    let columns = ColumnIndex::from_headers(header.iter().map(String::as_str))?;

    let mut records = Vec::with_capacity(range.height().saturating_sub(1));
    for (index, row) in rows.enumerate() {
        // 1-based spreadsheet row, after the header
        let row_no = index + 2;
        let cell = |col: usize| row.get(col).unwrap_or(&EMPTY_CELL);

        let time = cell_time(cell(columns.time))
            .ok_or_else(|| invalid(row_no, "time", cell(columns.time)))?;
        let lat = cell_number(cell(columns.lat))
            .ok_or_else(|| invalid(row_no, "lat", cell(columns.lat)))?;
        let lon = cell_number(cell(columns.lon))
            .ok_or_else(|| invalid(row_no, "lon", cell(columns.lon)))?;
        let sst = match cell(columns.sst) {
            Data::Empty => f64::NAN,
            other => cell_number(other).ok_or_else(|| invalid(row_no, "sst", other))?,
        };

        records.push(SstRecord { time, lat, lon, sst });
    }

    Ok(records)
}

fn cell_time(cell: &Data) -> Option<NaiveDateTime> {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) => parse_timestamp(s),
        Data::DateTime(_) => cell.as_datetime(),
        _ => None,
    }
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(v) => Some(*v),
        Data::Int(v) => Some(*v as f64),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
