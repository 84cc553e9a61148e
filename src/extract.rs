//! Regional extraction: gridded NetCDF → tabular records.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::Config;
use crate::readers::{self, GridSubset, ReadError};
use crate::table::{self, SstRecord, TableError};
use crate::utils::{ValueStats, value_statistics};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug)]
pub struct ExtractSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub time_steps: usize,
    pub stats: Option<ValueStats>,
}

/// Flattens a subset into one record per (time, lat, lon), iterating time first,
/// then latitude in source order, then longitude.
pub fn flatten(subset: &GridSubset) -> Vec<SstRecord> {
    let mut records = Vec::with_capacity(subset.values.len());

    for (t, time) in subset.times.iter().enumerate() {
        for (i, &lat) in subset.lats.iter().enumerate() {
            for (j, &lon) in subset.lons.iter().enumerate() {
                records.push(SstRecord {
                    time: *time,
                    lat,
                    lon,
                    sst: subset.value(t, i, j),
                });
            }
        }
    }

    records
}

pub fn run(config: &Config) -> Result<ExtractSummary, ExtractError> {
    let reader = readers::create_reader(config.source(), config.variable())?;
    let subset = reader.read_subset(config.bbox())?;
    log::info!("Subset of {}:\n{}", config.source().display(), subset);

    let stats = value_statistics(&subset.values);
    if let Some(stats) = &stats {
        log::debug!("{}", stats);
    } else {
        log::warn!("Subset contains no valid {} values", config.variable());
    }

    let records = flatten(&subset);
    table::write_records(config.table(), &records)?;
    println!("File berhasil disimpan: {}", config.table().display());

    Ok(ExtractSummary {
        path: config.table().to_path_buf(),
        rows: records.len(),
        time_steps: subset.times.len(),
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::Bbox;
    use crate::table::tests::assert_same_records;
    use crate::time::parse_timestamp;
    use tempfile::tempdir;

    fn subset() -> GridSubset {
        GridSubset {
            times: vec![
                parse_timestamp("1982-01-01").unwrap(),
                parse_timestamp("1982-02-01").unwrap(),
            ],
            lats: vec![5.5, 4.5],
            lons: vec![95.5, 96.5, 97.5],
            values: vec![
                28.0, 28.1, 28.2, //
                29.0, f64::NAN, 29.2, //
                27.0, 27.1, 27.2, //
                26.0, f64::NAN, 26.2,
            ],
        }
    }

    #[test]
    fn test_flatten_order_and_values() {
        let records = flatten(&subset());
        assert_eq!(records.len(), 12);

        assert_eq!(records[0].time, parse_timestamp("1982-01-01").unwrap());
        assert_eq!((records[0].lat, records[0].lon, records[0].sst), (5.5, 95.5, 28.0));
        assert_eq!((records[2].lat, records[2].lon, records[2].sst), (5.5, 97.5, 28.2));
        assert_eq!((records[3].lat, records[3].lon), (4.5, 95.5));
        assert!(records[4].sst.is_nan());

        let last = records.last().unwrap();
        assert_eq!(last.time, parse_timestamp("1982-02-01").unwrap());
        assert_eq!((last.lat, last.lon, last.sst), (4.5, 97.5, 26.2));
    }

    #[test]
    fn test_flatten_yields_complete_grid_per_time() {
        let records = flatten(&subset());
        for time in &subset().times {
            let cells: Vec<(f64, f64)> = records
                .iter()
                .filter(|r| r.time == *time)
                .map(|r| (r.lat, r.lon))
                .collect();
            assert_eq!(cells.len(), 6);
            for lat in [5.5, 4.5] {
                for lon in [95.5, 96.5, 97.5] {
                    assert!(cells.contains(&(lat, lon)));
                }
            }
        }
    }

    #[test]
    fn test_flattened_rows_stay_in_bbox() {
        let bbox = Bbox::default();
        assert!(
            flatten(&subset())
                .iter()
                .all(|r| bbox.contains(r.lon, r.lat))
        );
    }

    #[test]
    fn test_repeated_export_is_identical() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subset.xlsx");

        table::write_records(&path, &flatten(&subset())).unwrap();
        let first = table::read_records(&path).unwrap();
        table::write_records(&path, &flatten(&subset())).unwrap();
        let second = table::read_records(&path).unwrap();

        assert_same_records(&first, &second);
        assert_same_records(&first, &flatten(&subset()));
    }

    #[test]
    fn test_run_with_missing_source() {
        let dir = tempdir().unwrap();
        let config: Config = serde_json::from_str(&format!(
            r#"{{ "source": "{}", "table": "{}" }}"#,
            dir.path().join("missing.nc").display(),
            dir.path().join("out.xlsx").display()
        ))
        .unwrap();

        match run(&config) {
            Err(ExtractError::Read(ReadError::Io { .. })) => {}
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!dir.path().join("out.xlsx").exists());
    }
}
