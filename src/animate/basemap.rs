//! Coastlines and borders drawn on the animation frames.
//!
//! The ocean grid itself provides a coastline: the boundary between valid and
//! missing (land) cells. Finer coast or border lines can be supplied as a
//! GeoJSON file.

use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::contour::{Point, Segment};
use crate::bbox::Bbox;
use super::grid::YearGrid;

#[derive(Debug, Error)]
pub enum BasemapError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("GeoJSON contains no line or polygon geometry")]
    Empty,
}

/// Polylines in (lon, lat).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Basemap {
    lines: Vec<Vec<Point>>,
}

impl Basemap {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BasemapError> {
        let text = fs::read_to_string(path)?;
        Self::from_geojson(&text)
    }

    pub fn from_geojson(text: &str) -> Result<Self, BasemapError> {
        let root: Value = serde_json::from_str(text)?;
        let mut lines = Vec::new();
        collect_lines(&root, &mut lines);

        if lines.is_empty() {
            return Err(BasemapError::Empty);
        }
        Ok(Self { lines })
    }

    /// Parts of every line that stay inside `bbox`, split where a line leaves it.
    pub fn visible_lines(&self, bbox: &Bbox) -> Vec<Vec<Point>> {
        let mut runs = Vec::new();

        for line in &self.lines {
            let mut run: Vec<Point> = Vec::new();
            for &(lon, lat) in line {
                if bbox.contains(lon, lat) {
                    run.push((lon, lat));
                } else if run.len() >= 2 {
                    runs.push(std::mem::take(&mut run));
                } else {
                    run.clear();
                }
            }
            if run.len() >= 2 {
                runs.push(run);
            }
        }

        runs
    }
}

fn collect_lines(value: &Value, out: &mut Vec<Vec<Point>>) {
    let kind = value.get("type").and_then(Value::as_str).unwrap_or("");
    let coordinates = value.get("coordinates");

    match kind {
        "FeatureCollection" => {
            for feature in value.get("features").and_then(Value::as_array).into_iter().flatten() {
                collect_lines(feature, out);
            }
        }
        "Feature" => {
            if let Some(geometry) = value.get("geometry") {
                collect_lines(geometry, out);
            }
        }
        "GeometryCollection" => {
            for geometry in value.get("geometries").and_then(Value::as_array).into_iter().flatten() {
                collect_lines(geometry, out);
            }
        }
        "LineString" => out.extend(coordinates.and_then(line)),
        "MultiLineString" | "Polygon" => out.extend(nested(coordinates, 1)),
        "MultiPolygon" => out.extend(nested(coordinates, 2)),
        _ => {}
    }
}

fn line(value: &Value) -> Option<Vec<Point>> {
    let points: Vec<Point> = value
        .as_array()?
        .iter()
        .filter_map(|p| {
            let p = p.as_array()?;
            Some((p.first()?.as_f64()?, p.get(1)?.as_f64()?))
        })
        .collect();
    (points.len() >= 2).then_some(points)
}

/// Lines found `depth` array levels below `value`.
fn nested(value: Option<&Value>, depth: usize) -> Vec<Vec<Point>> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    if depth == 0 {
        return value.and_then(line).into_iter().collect();
    }
    items
        .iter()
        .flat_map(|item| nested(Some(item), depth - 1))
        .collect()
}

/// Cell edges separating a valid cell from a missing one.
pub fn coastline(grid: &YearGrid) -> Vec<Segment> {
    let half_lat = grid.lat_step() / 2.0;
    let half_lon = grid.lon_step() / 2.0;
    let mut segments = Vec::new();

    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let missing = grid.is_missing(row, col);
            let lat = grid.lats[row];
            let lon = grid.lons[col];

            if col + 1 < grid.cols() && missing != grid.is_missing(row, col + 1) {
                let x = (lon + grid.lons[col + 1]) / 2.0;
                segments.push([(x, lat - half_lat), (x, lat + half_lat)]);
            }
            if row + 1 < grid.rows() && missing != grid.is_missing(row + 1, col) {
                let y = (lat + grid.lats[row + 1]) / 2.0;
                segments.push([(lon - half_lon, y), (lon + half_lon, y)]);
            }
        }
    }

    segments
}
