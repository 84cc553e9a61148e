//! Marching squares isolines over a [`YearGrid`].

use super::grid::YearGrid;

/// (lon, lat)
pub type Point = (f64, f64);
pub type Segment = [Point; 2];

/// `min, min + step, ...` up to and including `max`.
pub fn contour_levels(min: f64, max: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || max < min {
        return Vec::new();
    }
    let count = ((max - min) / step + 1e-9).floor() as usize + 1;
    (0..count).map(|k| min + k as f64 * step).collect()
}

// Square edges, each joining two corners
const BOTTOM: usize = 0;
const RIGHT: usize = 1;
const TOP: usize = 2;
const LEFT: usize = 3;

// Corner order: (row, col), (row, col + 1), (row + 1, col + 1), (row + 1, col)
const CORNER_EDGES: [[usize; 2]; 4] = [[BOTTOM, LEFT], [BOTTOM, RIGHT], [RIGHT, TOP], [TOP, LEFT]];
const EDGE_CORNERS: [[usize; 2]; 4] = [[0, 1], [1, 2], [2, 3], [3, 0]];

/// Line segments where the gridded surface crosses `level`. Squares with a
/// missing corner produce nothing.
pub fn isolines(grid: &YearGrid, level: f64) -> Vec<Segment> {
    let mut segments = Vec::new();
    if grid.rows() < 2 || grid.cols() < 2 {
        return segments;
    }

    for row in 0..grid.rows() - 1 {
        for col in 0..grid.cols() - 1 {
            let corners = [
                (grid.lons[col], grid.lats[row], grid.get(row, col)),
                (grid.lons[col + 1], grid.lats[row], grid.get(row, col + 1)),
                (grid.lons[col + 1], grid.lats[row + 1], grid.get(row + 1, col + 1)),
                (grid.lons[col], grid.lats[row + 1], grid.get(row + 1, col)),
            ];
            if corners.iter().any(|c| c.2.is_nan()) {
                continue;
            }
            square_segments(&corners, level, &mut segments);
        }
    }

    segments
}

fn square_segments(corners: &[(f64, f64, f64); 4], level: f64, out: &mut Vec<Segment>) {
    let above = corners.map(|c| c.2 >= level);

    let crossing = |edge: usize| -> Option<Point> {
        let [a, b] = EDGE_CORNERS[edge];
        if above[a] == above[b] {
            return None;
        }
        let (ax, ay, av) = corners[a];
        let (bx, by, bv) = corners[b];
        let t = (level - av) / (bv - av);
        Some((ax + t * (bx - ax), ay + t * (by - ay)))
    };

    let edges: Vec<(usize, Point)> = (0..4)
        .filter_map(|edge| crossing(edge).map(|p| (edge, p)))
        .collect();

    match edges.as_slice() {
        [] => {}
        [(_, a), (_, b)] => out.push([*a, *b]),
        _ => {
            // Saddle: cut off the corners that disagree with the square centre
            let centre_above = corners.iter().map(|c| c.2).sum::<f64>() / 4.0 >= level;
            let point = |edge: usize| edges.iter().find(|(e, _)| *e == edge).map(|(_, p)| *p);
            for (corner, &is_above) in above.iter().enumerate() {
                if is_above != centre_above {
                    let [e1, e2] = CORNER_EDGES[corner];
                    if let (Some(a), Some(b)) = (point(e1), point(e2)) {
                        out.push([a, b]);
                    }
                }
            }
        }
    }
}

/// Anchor points for inline labels: the midpoint of every `every`-th segment.
pub fn label_positions(segments: &[Segment], every: usize) -> Vec<Point> {
    segments
        .iter()
        .step_by(every.max(1))
        .map(|[a, b]| ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0))
        .collect()
}
