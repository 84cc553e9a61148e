use crate::table::SstRecord;

/// One cell of a [`YearGrid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    pub lat: f64,
    pub lon: f64,
    pub sst: f64,
}

/// Records of one year pivoted onto a (lat, lon) grid.
///
/// Both axes are ascending. A cell holds the mean of the valid values recorded
/// for it during the year (a single monthly record is returned unchanged);
/// cells with no valid value are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct YearGrid {
    pub year: i32,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    values: Vec<f64>,
}

fn sorted_axis(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut axis: Vec<f64> = values.collect();
    axis.sort_by(f64::total_cmp);
    axis.dedup();
    axis
}

fn axis_index(axis: &[f64], value: f64) -> Option<usize> {
    axis.binary_search_by(|probe| probe.total_cmp(&value)).ok()
}

/// Distance between the first two coordinates, 1° for a single-cell axis.
fn spacing(axis: &[f64]) -> f64 {
    match axis {
        [a, b, ..] => (b - a).abs(),
        _ => 1.0,
    }
}

impl YearGrid {
    /// `None` when `records` is empty.
    pub fn pivot(year: i32, records: &[SstRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let lats = sorted_axis(records.iter().map(|r| r.lat));
        let lons = sorted_axis(records.iter().map(|r| r.lon));

        let mut sums = vec![0.0; lats.len() * lons.len()];
        let mut counts = vec![0usize; lats.len() * lons.len()];

        for record in records.iter().filter(|r| !r.sst.is_nan()) {
            // Both coordinates come from the axes built above
            let i = axis_index(&lats, record.lat);
            let j = axis_index(&lons, record.lon);
            if let (Some(i), Some(j)) = (i, j) {
                sums[i * lons.len() + j] += record.sst;
                counts[i * lons.len() + j] += 1;
            }
        }

        let values = sums
            .iter()
            .zip(&counts)
            .map(|(&sum, &count)| if count == 0 { f64::NAN } else { sum / count as f64 })
            .collect();

        Some(Self {
            year,
            lats,
            lons,
            values,
        })
    }

    pub fn rows(&self) -> usize {
        self.lats.len()
    }

    pub fn cols(&self) -> usize {
        self.lons.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.lons.len() + col]
    }

    pub fn value_at(&self, lat: f64, lon: f64) -> Option<f64> {
        Some(self.get(axis_index(&self.lats, lat)?, axis_index(&self.lons, lon)?))
    }

    pub fn lat_step(&self) -> f64 {
        spacing(&self.lats)
    }

    pub fn lon_step(&self) -> f64 {
        spacing(&self.lons)
    }

    pub fn is_missing(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_nan()
    }

    /// Cells in row-major order, south to north and west to east.
    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.lats.iter().enumerate().flat_map(move |(row, &lat)| {
            self.lons.iter().enumerate().map(move |(col, &lon)| GridCell {
                row,
                col,
                lat,
                lon,
                sst: self.get(row, col),
            })
        })
    }
}
