//! Yearly SST maps assembled into an animated GIF.

use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::Config;
use crate::table::{self, SstRecord, TableError};

pub mod basemap;
pub mod colormap;
pub mod contour;
pub mod grid;
pub mod render;

pub use basemap::{Basemap, BasemapError};
pub use grid::YearGrid;
pub use render::RenderContext;

#[derive(Debug, Error)]
pub enum AnimateError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("no records to animate")]
    NoRecords,
    #[error("basemap: {0}")]
    Basemap(#[from] BasemapError),
    #[error("failed to render animation: {0}")]
    Render(String),
}

/// What to draw for one frame slot.
#[derive(Debug, Clone, PartialEq)]
pub enum FramePlan {
    Draw(YearGrid),
    /// No rows for the year: the map is cleared and the frame kept.
    Skip { year: i32 },
}

impl FramePlan {
    pub fn year(&self) -> i32 {
        match self {
            FramePlan::Draw(grid) => grid.year,
            FramePlan::Skip { year } => *year,
        }
    }
}

/// Records grouped by calendar year.
#[derive(Debug, Clone, Default)]
pub struct Animator {
    by_year: BTreeMap<i32, Vec<SstRecord>>,
}

impl Animator {
    pub fn new(records: Vec<SstRecord>) -> Self {
        let mut by_year: BTreeMap<i32, Vec<SstRecord>> = BTreeMap::new();
        for record in records {
            by_year.entry(record.year()).or_default().push(record);
        }
        Self { by_year }
    }

    pub fn plan_frame(&self, year: i32) -> FramePlan {
        self.by_year
            .get(&year)
            .and_then(|records| YearGrid::pivot(year, records))
            .map_or(FramePlan::Skip { year }, FramePlan::Draw)
    }
}

#[derive(Debug)]
pub struct AnimationSummary {
    pub path: PathBuf,
    pub frames: usize,
    pub skipped: Vec<i32>,
}

pub fn run(config: &Config) -> Result<AnimationSummary, AnimateError> {
    let records = table::read_records(config.table())?;
    let years = table::unique_years(&records);
    println!("Tahun unik dalam data: {:?}", years);

    let (first, last) = match (years.first(), years.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Err(AnimateError::NoRecords),
    };
    let animator = Animator::new(records);

    let basemap = config.basemap().map(Basemap::from_file).transpose()?;
    let (color_min, color_max) = config.color_range();
    let levels = contour::contour_levels(color_min, color_max, config.contour_step());

    let mut context = RenderContext::new(
        config.animation(),
        config,
        levels,
        basemap,
        (first, last),
    )?;

    let mut skipped = Vec::new();
    for &year in &years {
        let plan = animator.plan_frame(year);
        context.draw_frame(&plan)?;

        match plan {
            FramePlan::Draw(_) => println!("Frame tahun {} selesai diproses.", year),
            FramePlan::Skip { year } => {
                log::warn!("No records for {}, frame left empty", year);
                skipped.push(year);
            }
        }
    }
    drop(context);

    println!("Animasi disimpan: {}", config.animation().display());

    Ok(AnimationSummary {
        path: config.animation().to_path_buf(),
        frames: years.len(),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::record;

    fn animator() -> Animator {
        Animator::new(vec![
            record("1982-01-01", -0.5, 95.5, 28.0),
            record("1982-01-01", -0.5, 96.5, 28.5),
            record("1982-01-01", 0.5, 95.5, 29.0),
            record("1982-01-01", 0.5, 96.5, f64::NAN),
            record("1984-01-01", -0.5, 95.5, 27.5),
        ])
    }

    #[test]
    fn test_grid_cell_equals_record_value() {
        let plan = animator().plan_frame(1982);
        let FramePlan::Draw(grid) = plan else {
            panic!("expected a drawable frame for 1982");
        };

        assert_eq!(grid.year, 1982);
        assert_eq!(grid.lats, vec![-0.5, 0.5]);
        assert_eq!(grid.lons, vec![95.5, 96.5]);
        assert_eq!(grid.value_at(-0.5, 95.5), Some(28.0));
        assert_eq!(grid.value_at(-0.5, 96.5), Some(28.5));
        assert_eq!(grid.value_at(0.5, 95.5), Some(29.0));
        assert!(grid.value_at(0.5, 96.5).unwrap().is_nan());
    }

    #[test]
    fn test_absent_year_is_skipped() {
        let plan = animator().plan_frame(1983);
        assert_eq!(plan, FramePlan::Skip { year: 1983 });
        assert_eq!(plan.year(), 1983);
    }

    #[test]
    fn test_run_without_table_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config: Config = serde_json::from_value(serde_json::json!({
            "table": dir.path().join("missing.xlsx"),
            "animation": dir.path().join("out.gif"),
        }))
        .unwrap();

        assert!(matches!(run(&config), Err(AnimateError::Table(_))));
        assert!(!dir.path().join("out.gif").exists());
    }
}
