use chrono::NaiveDateTime;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::bbox::Bbox;
use crate::time::TimeError;

pub trait GridReader {
    /// Reads every time step of the gridded variable restricted to `bbox`.
    fn read_subset(&self, bbox: &Bbox) -> Result<GridSubset, ReadError>;
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("cannot open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
    #[error("variable '{variable}' not found in {}", path.display())]
    MissingVariable { path: PathBuf, variable: String },
    #[error("axis '{0}' not found in dataset")]
    MissingAxis(String),
    #[error("band {band} has no usable time value")]
    MissingTimeValue { band: usize },
    #[error("invalid time axis: {0}")]
    Time(#[from] TimeError),
    #[error("bounding box {0:?} does not intersect the dataset grid")]
    EmptySubset(Bbox),
    #[error("unsupported file type: {}", .0.display())]
    UnknownFileType(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    NetCDF,
}

/// Regional subset of a gridded time series.
///
/// `values` is laid out `[time][lat][lon]` with latitudes in source order.
/// Missing cells are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSubset {
    pub times: Vec<NaiveDateTime>,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    pub values: Vec<f64>,
}

impl GridSubset {
    pub fn cells_per_step(&self) -> usize {
        self.lats.len() * self.lons.len()
    }

    /// Value at (time, lat, lon) indices.
    pub fn value(&self, t: usize, i: usize, j: usize) -> f64 {
        self.values[t * self.cells_per_step() + i * self.lons.len() + j]
    }
}

impl fmt::Display for GridSubset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.times.first().map(|t| t.to_string());
        let last = self.times.last().map(|t| t.to_string());

        write!(
            f,
            "Time steps: {} ({} .. {})\nLatitudes: {}\nLongitudes: {}\nValues: {}",
            self.times.len(),
            first.as_deref().unwrap_or("-"),
            last.as_deref().unwrap_or("-"),
            self.lats.len(),
            self.lons.len(),
            self.values.len(),
        )
    }
}
