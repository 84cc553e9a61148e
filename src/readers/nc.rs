use chrono::NaiveDateTime;
use gdal::{Dataset, Metadata};
use std::io;
use std::path::PathBuf;

use super::utils::{axis_window, cell_centers};
use super::{GridReader, GridSubset, ReadError};
use crate::bbox::Bbox;
use crate::time::TimeUnits;

/// Axes every gridded source must declare.
pub const REQUIRED_AXES: [&str; 3] = ["lat", "lon", "time"];

/// Reads one variable of a CF NetCDF file through GDAL's netCDF driver. Each
/// time step is exposed as a raster band.
pub struct NcReader {
    pub file_name: PathBuf,
    pub variable: String,
}

impl NcReader {
    fn subdataset_path(&self) -> String {
        format!("NETCDF:\"{}\":{}", self.file_name.display(), self.variable)
    }

    fn open(&self) -> Result<Dataset, ReadError> {
        if !self.file_name.exists() {
            return Err(ReadError::Io {
                path: self.file_name.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "file not found"),
            });
        }

        // Opening the container first separates corrupt files from files that
        // simply lack the variable.
        Dataset::open(&self.file_name)?;

        Dataset::open(self.subdataset_path()).map_err(|_| ReadError::MissingVariable {
            path: self.file_name.clone(),
            variable: self.variable.clone(),
        })
    }

    fn time_units(dataset: &Dataset) -> Result<TimeUnits, ReadError> {
        let units = dataset
            .metadata_item("time#units", "")
            .ok_or_else(|| ReadError::MissingAxis("time".to_string()))?;
        Ok(TimeUnits::parse(&units)?)
    }
}

/// Fails with the first required axis that has no `<axis>#...` entry in the
/// dataset metadata.
pub fn validate_axes(entries: &[String]) -> Result<(), ReadError> {
    for axis in REQUIRED_AXES {
        let prefix = format!("{}#", axis);
        if !entries.iter().any(|entry| entry.starts_with(&prefix)) {
            return Err(ReadError::MissingAxis(axis.to_string()));
        }
    }

    Ok(())
}

/// Decodes a band's `NETCDF_DIM_time` offset.
pub fn band_time(raw: Option<&str>, units: &TimeUnits) -> Option<NaiveDateTime> {
    let offset = raw?.trim().parse::<f64>().ok()?;
    units.decode(offset)
}

/// Physical value of a raw cell; nodata and non-finite cells are `NaN`.
pub fn band_value(raw: f64, scale: f64, offset: f64, nodata: Option<f64>) -> f64 {
    if !raw.is_finite() || nodata.is_some_and(|mv| raw == mv) {
        f64::NAN
    } else {
        raw * scale + offset
    }
}

impl GridReader for NcReader {
    fn read_subset(&self, bbox: &Bbox) -> Result<GridSubset, ReadError> {
        let dataset = self.open()?;
        validate_axes(&dataset.metadata_domain("").unwrap_or_default())?;
        let units = Self::time_units(&dataset)?;
        log::debug!("{}: time axis in {}", self.file_name.display(), units);

        let (width, height) = dataset.raster_size();

        // geotransform: [top_left_x, pixel_width, 0, top_left_y, 0, -pixel_height]
        let geotransform = dataset.geo_transform()?;

        let cols = axis_window(geotransform[0], geotransform[1], width, bbox.xmin, bbox.xmax)
            .ok_or(ReadError::EmptySubset(*bbox))?;
        let rows = axis_window(geotransform[3], geotransform[5], height, bbox.ymin, bbox.ymax)
            .ok_or(ReadError::EmptySubset(*bbox))?;

        let lons = cell_centers(geotransform[0], geotransform[1], &cols);
        let lats = cell_centers(geotransform[3], geotransform[5], &rows);
        let window = (cols.start as isize, rows.start as isize);
        let window_size = (cols.len(), rows.len());

        let band_count = dataset.raster_count();
        let mut times = Vec::with_capacity(band_count);
        let mut values = Vec::with_capacity(band_count * cols.len() * rows.len());

        for index in 1..=band_count {
            let band = dataset.rasterband(index)?;

            let time = band_time(band.metadata_item("NETCDF_DIM_time", "").as_deref(), &units)
                .ok_or(ReadError::MissingTimeValue { band: index })?;

            let buffer = band.read_as::<f64>(window, window_size, window_size, None)?;
            let scale = band.scale().unwrap_or(1.0);
            let offset = band.offset().unwrap_or(0.0);
            let missing_value = band.no_data_value();

            values.extend(
                buffer
                    .data()
                    .iter()
                    .map(|&raw| band_value(raw, scale, offset, missing_value)),
            );
            times.push(time);
        }

        Ok(GridSubset {
            times,
            lats,
            lons,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_timestamp;
    use gdal::DriverManager;
    use std::path::Path;
    use tempfile::tempdir;

    /// Plain 2-D NetCDF raster written by GDAL: one `Band1` variable on x/y
    /// axes, no `sst` variable and no time axis.
    fn write_plain_netcdf(path: &Path) {
        let driver = DriverManager::get_driver_by_name("netCDF").unwrap();
        let mut dataset = driver
            .create_with_band_type::<f64, _>(path, 4, 3, 1)
            .unwrap();
        dataset
            .set_geo_transform(&[95.0, 1.0, 0.0, 6.0, 0.0, -1.0])
            .unwrap();
    }

    fn metadata(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_validate_axes_accepts_cf_metadata() {
        let entries = metadata(&[
            "lat#units=degrees_north",
            "lon#units=degrees_east",
            "time#units=days since 1800-1-1 00:00:00",
            "sst#long_name=Monthly Mean of Sea Surface Temperature",
        ]);
        assert!(validate_axes(&entries).is_ok());
    }

    #[test]
    fn test_validate_axes_reports_missing_axis() {
        let entries = metadata(&["lon#units=degrees_east", "time#units=days since 1800-1-1"]);
        assert!(matches!(
            validate_axes(&entries),
            Err(ReadError::MissingAxis(axis)) if axis == "lat"
        ));

        // "latitude#" does not declare "lat"
        let entries = metadata(&["latitude#units=degrees_north", "lon#units=x", "time#units=y"]);
        assert!(matches!(
            validate_axes(&entries),
            Err(ReadError::MissingAxis(axis)) if axis == "lat"
        ));

        let entries = metadata(&["lat#units=degrees_north", "lon#units=degrees_east"]);
        assert!(matches!(
            validate_axes(&entries),
            Err(ReadError::MissingAxis(axis)) if axis == "time"
        ));

        assert!(matches!(validate_axes(&[]), Err(ReadError::MissingAxis(axis)) if axis == "lat"));
    }

    #[test]
    fn test_band_value_scale_offset_and_nodata() {
        assert_eq!(band_value(28.5, 1.0, 0.0, None), 28.5);
        assert_eq!(band_value(2850.0, 0.01, 0.0, Some(32767.0)), 28.5);
        assert_eq!(band_value(100.0, 0.01, 27.0, None), 28.0);

        assert!(band_value(32767.0, 0.01, 0.0, Some(32767.0)).is_nan());
        assert!(band_value(-9.96921e36, 1.0, 0.0, Some(-9.96921e36)).is_nan());
        assert!(band_value(f64::NAN, 1.0, 0.0, None).is_nan());
        assert!(band_value(f64::INFINITY, 1.0, 0.0, None).is_nan());
    }

    #[test]
    fn test_band_time_decodes_offset() {
        let units = TimeUnits::parse("days since 1800-1-1 00:00:00").unwrap();

        assert_eq!(
            band_time(Some(" 66443 "), &units),
            parse_timestamp("1981-12-01")
        );
        assert_eq!(band_time(Some("not a number"), &units), None);
        assert_eq!(band_time(None, &units), None);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let reader = NcReader {
            file_name: dir.path().join("sst.mnmean.nc"),
            variable: "sst".to_string(),
        };

        let result = reader.read_subset(&Bbox::default());
        assert!(matches!(result, Err(ReadError::Io { .. })));
    }

    #[test]
    fn test_missing_variable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.nc");
        write_plain_netcdf(&path);

        let reader = NcReader {
            file_name: path,
            variable: "sst".to_string(),
        };
        let result = reader.read_subset(&Bbox::default());
        assert!(
            matches!(&result, Err(ReadError::MissingVariable { variable, .. }) if variable == "sst"),
            "unexpected result: {:?}",
            result.map(|subset| subset.times.len())
        );
    }

    #[test]
    fn test_variable_without_time_axis() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.nc");
        write_plain_netcdf(&path);

        let reader = NcReader {
            file_name: path,
            variable: "Band1".to_string(),
        };
        let result = reader.read_subset(&Bbox::default());
        assert!(
            matches!(result, Err(ReadError::MissingAxis(_))),
            "unexpected result: {:?}",
            result.map(|subset| subset.times.len())
        );
    }
}
