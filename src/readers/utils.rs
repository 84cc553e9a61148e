use super::types::{FileType, ReadError};
use std::ops::Range;
use std::path::Path;

const EDGE_TOLERANCE: f64 = 1e-9;

pub fn reader_from_filetype(path: &Path) -> Result<FileType, ReadError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("nc") | Some("nc4") => Ok(FileType::NetCDF),
        _ => Err(ReadError::UnknownFileType(path.to_path_buf())),
    }
}

/// Indices of the cells along one geotransform axis whose centre lies within
/// `[lo, hi]`. Works for both ascending (`step > 0`) and descending axes.
pub fn axis_window(origin: f64, step: f64, len: usize, lo: f64, hi: f64) -> Option<Range<usize>> {
    if step == 0.0 || len == 0 {
        return None;
    }

    // centre(k) = origin + (k + 0.5) * step
    let (first, last) = if step > 0.0 { (lo, hi) } else { (hi, lo) };
    let kmin = ((first - origin) / step - 0.5 - EDGE_TOLERANCE).ceil();
    let kmax = ((last - origin) / step - 0.5 + EDGE_TOLERANCE).floor();

    let kmin = kmin.max(0.0);
    let kmax = kmax.min(len as f64 - 1.0);
    if kmin > kmax {
        return None;
    }

    Some(kmin as usize..kmax as usize + 1)
}

pub fn cell_centers(origin: f64, step: f64, window: &Range<usize>) -> Vec<f64> {
    window
        .clone()
        .map(|k| origin + (k as f64 + 0.5) * step)
        .collect()
}
