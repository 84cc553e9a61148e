use std::path::Path;

use super::{COLUMNS, ColumnIndex, SstRecord, TableError, invalid};
use crate::time::{format_timestamp, parse_timestamp};

pub(super) fn write(path: &Path, records: &[SstRecord]) -> Result<(), TableError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(COLUMNS)?;

    for record in records {
        let sst = if record.sst.is_finite() {
            record.sst.to_string()
        } else {
            String::new()
        };
        writer.write_record([
            format_timestamp(&record.time),
            record.lat.to_string(),
            record.lon.to_string(),
            sst,
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub(super) fn read(path: &Path) -> Result<Vec<SstRecord>, TableError> {
    let mut reader = csv::Reader::from_path(path)?;
    let columns = ColumnIndex::from_headers(reader.headers()?.iter())?;

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let row_no = index + 2;
        let field = |col: usize| row.get(col).unwrap_or("").trim();

        let time = parse_timestamp(field(columns.time))
            .ok_or_else(|| invalid(row_no, "time", field(columns.time)))?;
        let lat = field(columns.lat)
            .parse::<f64>()
            .map_err(|_| invalid(row_no, "lat", field(columns.lat)))?;
        let lon = field(columns.lon)
            .parse::<f64>()
            .map_err(|_| invalid(row_no, "lon", field(columns.lon)))?;
        let sst = match field(columns.sst) {
            "" => f64::NAN,
            raw => raw.parse::<f64>().map_err(|_| invalid(row_no, "sst", raw))?,
        };

        records.push(SstRecord { time, lat, lon, sst });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_with_residual_axis_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subset.csv");
        fs::write(
            &path,
            "time,zlev,lat,lon,sst\n1982-01-01 00:00:00,0,5.5,95.5,28.5\n1982-02-01,0,5.5,95.5,\n",
        )
        .unwrap();

        let records = read(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].lat, 5.5);
        assert_eq!(records[0].sst, 28.5);
        assert_eq!(records[1].year(), 1982);
        assert!(records[1].sst.is_nan());
    }

    #[test]
    fn test_read_reports_bad_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subset.csv");
        fs::write(&path, "time,lat,lon,sst\n1982-01-01,north,95.5,28.5\n").unwrap();

        match read(&path) {
            Err(TableError::InvalidValue { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "lat");
                assert_eq!(value, "north");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_read_missing_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subset.csv");
        fs::write(&path, "time,lat,lon\n1982-01-01,5.5,95.5\n").unwrap();

        assert!(matches!(read(&path), Err(TableError::MissingColumn("sst"))));
    }
}
