use plotters::coord::Shift;
use plotters::coord::combinators::{BindKeyPoints, WithKeyPoints};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::FontStyle;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::error::Error;
use std::path::Path;

use super::basemap::{Basemap, coastline};
use super::colormap::ColorScale;
use super::contour::{Segment, isolines, label_positions};
use super::grid::YearGrid;
use super::{AnimateError, FramePlan};
use crate::bbox::Bbox;
use crate::config::Config;

// 10 x 6 in at 100 dpi
pub const WIDTH: u32 = 1000;
pub const HEIGHT: u32 = 600;
const DPI: f64 = 100.0;

const FONT: &str = "sans-serif";
const MAP_WIDTH: i32 = 880;
const COLORBAR_STEPS: usize = 128;
const LABEL_EVERY: usize = 40;
const LON_TICK_STEP: f64 = 5.0;
const LAT_TICK_STEP: f64 = 2.5;

type Area = DrawingArea<BitMapBackend<'static>, Shift>;
type Axis = WithKeyPoints<RangedCoordf64>;
type MapChart<'a> = ChartContext<'a, BitMapBackend<'static>, Cartesian2d<Axis, Axis>>;

fn pt(points: f64) -> f64 {
    points * DPI / 72.0
}

fn render_error(e: impl ToString) -> AnimateError {
    AnimateError::Render(e.to_string())
}

/// Multiples of `step` within `[min, max]`.
fn tick_values(min: f64, max: f64, step: f64) -> Vec<f64> {
    let first = (min / step - 1e-9).ceil() as i64;
    let last = (max / step + 1e-9).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

fn lon_label(lon: f64) -> String {
    let lon = if lon > 180.0 { lon - 360.0 } else { lon };
    match lon {
        v if v > 0.0 => format!("{}°E", v.abs()),
        v if v < 0.0 => format!("{}°W", v.abs()),
        _ => "0°".to_string(),
    }
}

fn lat_label(lat: f64) -> String {
    match lat {
        v if v > 0.0 => format!("{}°N", v.abs()),
        v if v < 0.0 => format!("{}°S", v.abs()),
        _ => "0°".to_string(),
    }
}

/// Owns the GIF canvas for the whole animation.
///
/// The title and the colorbar are drawn once; every frame only repaints the map
/// area before it is flushed to the file.
pub struct RenderContext {
    root: Area,
    map: Area,
    bbox: Bbox,
    scale: ColorScale,
    levels: Vec<f64>,
    basemap: Option<Basemap>,
    lon_ticks: Vec<f64>,
    lat_ticks: Vec<f64>,
}

impl RenderContext {
    pub fn new(
        path: &Path,
        config: &Config,
        levels: Vec<f64>,
        basemap: Option<Basemap>,
        years: (i32, i32),
    ) -> Result<Self, AnimateError> {
        let backend =
            BitMapBackend::gif(path, (WIDTH, HEIGHT), config.frame_delay_ms()).map_err(render_error)?;
        let root = backend.into_drawing_area();
        let (color_min, color_max) = config.color_range();
        let scale = ColorScale::new(color_min, color_max);

        let map = draw_layout(&root, scale, years).map_err(render_error)?;
        let bbox = *config.bbox();

        Ok(Self {
            root,
            map,
            bbox,
            scale,
            levels,
            basemap,
            lon_ticks: tick_values(bbox.xmin, bbox.xmax, LON_TICK_STEP),
            lat_ticks: tick_values(bbox.ymin, bbox.ymax, LAT_TICK_STEP),
        })
    }

    pub fn draw_frame(&mut self, plan: &FramePlan) -> Result<(), AnimateError> {
        self.draw_map(plan).map_err(render_error)?;
        self.root.present().map_err(render_error)
    }

    fn draw_map(&self, plan: &FramePlan) -> Result<(), Box<dyn Error>> {
        self.map.fill(&WHITE)?;

        let bbox = self.bbox;
        let mut chart = ChartBuilder::on(&self.map)
            .margin(pt(8.0) as u32)
            .x_label_area_size(pt(22.0) as u32)
            .y_label_area_size(pt(34.0) as u32)
            .build_cartesian_2d(
                (bbox.xmin..bbox.xmax).with_key_points(self.lon_ticks.clone()),
                (bbox.ymin..bbox.ymax).with_key_points(self.lat_ticks.clone()),
            )?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(self.lon_ticks.len())
            .y_labels(self.lat_ticks.len())
            .label_style((FONT, pt(9.0)))
            .x_label_formatter(&|v| lon_label(*v))
            .y_label_formatter(&|v| lat_label(*v))
            .draw()?;

        if let FramePlan::Draw(grid) = plan {
            self.draw_mesh(&mut chart, grid)?;
            draw_segments(&mut chart, &coastline(grid), BLACK.stroke_width(1))?;
        }

        if let Some(basemap) = &self.basemap {
            chart.draw_series(
                basemap
                    .visible_lines(&bbox)
                    .into_iter()
                    .map(|line| PathElement::new(line, BLACK.stroke_width(1))),
            )?;
        }

        // Equator
        chart.draw_series(DashedLineSeries::new(
            vec![(bbox.xmin, 0.0), (bbox.xmax, 0.0)],
            8,
            5,
            BLACK.stroke_width(1),
        ))?;

        if let FramePlan::Draw(grid) = plan {
            self.draw_contours(&mut chart, grid)?;
            draw_year_label(&chart, bbox, grid.year)?;
        }

        Ok(())
    }

    fn draw_mesh(&self, chart: &mut MapChart<'_>, grid: &YearGrid) -> Result<(), Box<dyn Error>> {
        let bbox = self.bbox;
        let half_lat = grid.lat_step() / 2.0;
        let half_lon = grid.lon_step() / 2.0;

        let cells = grid.cells().filter_map(|cell| {
            let color = self.scale.color(cell.sst)?;
            let x0 = (cell.lon - half_lon).max(bbox.xmin);
            let x1 = (cell.lon + half_lon).min(bbox.xmax);
            let y0 = (cell.lat - half_lat).max(bbox.ymin);
            let y1 = (cell.lat + half_lat).min(bbox.ymax);
            (x0 < x1 && y0 < y1).then(|| Rectangle::new([(x0, y0), (x1, y1)], color.filled()))
        });
        chart.draw_series(cells)?;

        Ok(())
    }

    fn draw_contours(&self, chart: &mut MapChart<'_>, grid: &YearGrid) -> Result<(), Box<dyn Error>> {
        let line_style = BLACK.mix(0.6).stroke_width(1);
        let label_style = TextStyle::from((FONT, pt(7.0)).into_font())
            .pos(Pos::new(HPos::Center, VPos::Center));

        for &level in &self.levels {
            let segments = isolines(grid, level);
            if segments.is_empty() {
                continue;
            }
            draw_segments(chart, &segments, line_style)?;

            let text = format!("{:.0}°C", level);
            let (w, h) = self.map.estimate_text_size(&text, &label_style)?;
            let (half_w, half_h) = (w as i32 / 2 + 1, h as i32 / 2);

            chart.draw_series(label_positions(&segments, LABEL_EVERY).into_iter().map(|at| {
                EmptyElement::at(at)
                    + Rectangle::new([(-half_w, -half_h), (half_w, half_h)], WHITE.filled())
                    + Text::new(text.clone(), (0, 0), label_style.clone())
            }))?;
        }

        Ok(())
    }
}

fn draw_segments(
    chart: &mut MapChart<'_>,
    segments: &[Segment],
    style: ShapeStyle,
) -> Result<(), Box<dyn Error>> {
    chart.draw_series(
        segments
            .iter()
            .map(|&[a, b]| PathElement::new(vec![a, b], style)),
    )?;
    Ok(())
}

fn draw_year_label(chart: &MapChart<'_>, bbox: Bbox, year: i32) -> Result<(), Box<dyn Error>> {
    let text = format!("Tahun {}", year);
    let style = TextStyle::from((FONT, pt(12.0)).into_font().style(FontStyle::Bold));
    let area = chart.plotting_area();
    let (w, h) = area.estimate_text_size(&text, &style)?;
    let padding = pt(4.0) as i32;
    let (w, h) = (w as i32, h as i32);

    let anchor = (
        bbox.xmin + 0.02 * bbox.width(),
        bbox.ymin + 0.05 * bbox.height(),
    );
    let top_left = (0, -h - 2 * padding);
    let bottom_right = (w + 2 * padding, 0);

    area.draw(
        &(EmptyElement::at(anchor)
            + Rectangle::new([top_left, bottom_right], WHITE.mix(0.8).filled())
            + Rectangle::new([top_left, bottom_right], BLACK.mix(0.3).stroke_width(1))
            + Text::new(text, (padding, -h - padding), style)),
    )?;

    Ok(())
}

/// Static parts of the figure. Returns the area left for the map.
fn draw_layout(root: &Area, scale: ColorScale, (first, last): (i32, i32)) -> Result<Area, Box<dyn Error>> {
    root.fill(&WHITE)?;

    let title_font = (FONT, pt(12.0)).into_font().style(FontStyle::Bold);
    let body = root.titled(
        &format!(
            "Rata-Rata Suhu Permukaan Laut (SST) Tahunan Indonesia Periode {} - {}",
            first, last
        ),
        title_font.clone(),
    )?;
    let body = body.titled("(Source: PSL NOAA OISST V2)", title_font)?;

    let (map, colorbar_area) = body.split_horizontally(MAP_WIDTH);
    let colorbar_area = colorbar_area.margin(pt(40.0) as u32, pt(50.0) as u32, pt(12.0) as u32, 0);
    draw_colorbar(&colorbar_area, scale)?;

    Ok(map)
}

fn draw_colorbar(area: &Area, scale: ColorScale) -> Result<(), Box<dyn Error>> {
    let mut bar = ChartBuilder::on(area)
        .right_y_label_area_size(pt(48.0) as u32)
        .build_cartesian_2d(0.0..1.0, scale.min..scale.max)?;

    let step = (scale.max - scale.min) / COLORBAR_STEPS as f64;
    bar.draw_series((0..COLORBAR_STEPS).map(|k| {
        let lo = scale.min + k as f64 * step;
        let hi = lo + step;
        Rectangle::new([(0.0, lo), (1.0, hi)], turbo_at(scale, (lo + hi) / 2.0).filled())
    }))?;

    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(5)
        .y_desc("Suhu Permukaan Laut (°C)")
        .axis_desc_style((FONT, pt(9.0)))
        .label_style((FONT, pt(9.0)))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .draw()?;

    bar.plotting_area()
        .draw(&Rectangle::new([(0.0, scale.min), (1.0, scale.max)], BLACK.stroke_width(1)))?;

    Ok(())
}

fn turbo_at(scale: ColorScale, value: f64) -> RGBColor {
    scale.color(value).unwrap_or(WHITE)
}
