use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontStyle;
use std::error::Error;
use std::path::Path;

use super::{TrendError, TrendReport};

// 10 x 5 in at 300 dpi
const WIDTH: u32 = 3000;
const HEIGHT: u32 = 1500;
const DPI: f64 = 300.0;

const ANOMALY_COLOR: RGBColor = RGBColor(31, 119, 180);
const TREND_COLOR: RGBColor = RGBColor(255, 0, 0);
const FONT: &str = "sans-serif";

// Legend swatch length and the legend column that holds it
const LEGEND_SWATCH: f64 = 18.0;
const LEGEND_AREA: f64 = 24.0;

/// Typographic points to pixels at the chart resolution.
fn pt(points: f64) -> f64 {
    points * DPI / 72.0
}

fn px(points: f64) -> u32 {
    pt(points).round() as u32
}

/// Anomaly tick label with two decimals, never `-0.00`.
fn anomaly_label(value: f64) -> String {
    let label = format!("{:.2}", value);
    match label.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => label,
    }
}

pub fn render(path: &Path, report: &TrendReport) -> Result<(), TrendError> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    draw(&root, report).map_err(|e| TrendError::Chart(e.to_string()))?;
    root.present()
        .map_err(|e| TrendError::Chart(e.to_string()))?;
    Ok(())
}

fn draw(root: &DrawingArea<BitMapBackend, Shift>, report: &TrendReport) -> Result<(), Box<dyn Error>> {
    let series = &report.series;
    let fit = &report.fit;
    let (first, last) = series.year_range().ok_or("empty annual series")?;
    let per_decade = report.trend_per_decade();

    root.fill(&WHITE)?;

    let title_font = (FONT, pt(13.0)).into_font().style(FontStyle::Bold);
    let area = root.titled(
        &format!("Tren Pemanasan Suhu Permukaan Laut Indonesia ({}–{})", first, last),
        title_font.clone(),
    )?;
    let area = area.titled(
        &format!(
            "Dihitung Terhadap Baseline Klimatologi {} (WMO Standard)",
            series.period
        ),
        title_font,
    )?;

    let anomalies: Vec<(f64, f64)> = series
        .rows
        .iter()
        .map(|r| (f64::from(r.year), r.sst_anom))
        .collect();
    let trend: Vec<(f64, f64)> = anomalies
        .iter()
        .map(|&(year, _)| (year, fit.predict(year)))
        .collect();

    let (y_min, y_max) = anomalies
        .iter()
        .chain(trend.iter())
        .map(|&(_, y)| y)
        .filter(|y| y.is_finite())
        .fold((0.0_f64, 0.0_f64), |(lo, hi), y| (lo.min(y), hi.max(y)));
    let pad = ((y_max - y_min) * 0.1).max(0.05);
    let x_range = (f64::from(first) - 1.0)..(f64::from(last) + 1.0);
    let y_range = (y_min - pad)..(y_max + pad);

    let mut chart = ChartBuilder::on(&area)
        .margin(px(10.0))
        .x_label_area_size(px(32.0))
        .y_label_area_size(px(42.0))
        .build_cartesian_2d(x_range.clone(), y_range.clone())?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Tahun")
        .y_desc("Anomali Suhu Permukaan Laut (°C)")
        .axis_desc_style((FONT, pt(11.0)))
        .label_style((FONT, pt(9.0)))
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&|v| anomaly_label(*v))
        .draw()?;

    let legend_len = px(LEGEND_SWATCH) as i32;
    let legend_half = px(4.0) as i32;

    // Baseline period band
    let band = RGBColor(128, 128, 128).mix(0.15);
    chart
        .draw_series(std::iter::once(Rectangle::new(
            [
                (f64::from(series.period.start), y_range.start),
                (f64::from(series.period.end), y_range.end),
            ],
            band.filled(),
        )))?
        .label(format!("Periode Normal ({})", series.period))
        .legend(move |(x, y)| {
            Rectangle::new(
                [(x, y - legend_half), (x + legend_len, y + legend_half)],
                band.filled(),
            )
        });

    // Zero line
    chart.draw_series(DashedLineSeries::new(
        vec![(x_range.start, 0.0), (x_range.end, 0.0)],
        px(4.0),
        px(2.0),
        BLACK.stroke_width(px(0.8)),
    ))?;

    let anomaly_style = ANOMALY_COLOR.stroke_width(px(1.8));
    chart
        .draw_series(LineSeries::new(anomalies.clone(), anomaly_style).point_size(px(3.0)))?
        .label("Anomali SST Tahunan")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + legend_len, y)], anomaly_style));

    let trend_style = TREND_COLOR.stroke_width(px(2.2));
    chart
        .draw_series(DashedLineSeries::new(trend, px(6.0), px(3.0), trend_style))?
        .label(format!(
            "Tren {}–{}: {:.2} °C/dekade",
            first, last, per_decade
        ))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + legend_len, y)], trend_style));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .legend_area_size(px(LEGEND_AREA))
        .label_font((FONT, pt(9.0)))
        .background_style(TRANSPARENT)
        .border_style(TRANSPARENT)
        .draw()?;

    // Statistics box, anchored at the bottom-right corner of the axes
    let lines = [
        format!("Koefisien korelasi (r): {:.2}", fit.r),
        format!("Tren: {:.2} °C/dekade", per_decade),
        format!("P-value: {:.4}", fit.p_value),
    ];
    let note_style = TextStyle::from((FONT, pt(9.0)).into_font());
    let mut text_width = 0;
    for line in &lines {
        let (w, _) = area.estimate_text_size(line, &note_style)?;
        text_width = text_width.max(w as i32);
    }
    let line_height = (pt(9.0) * 1.3).round() as i32;
    let text_height = line_height * lines.len() as i32;
    let padding = px(4.0) as i32;

    let anchor = (
        x_range.start + 0.98 * (x_range.end - x_range.start),
        y_range.start + 0.05 * (y_range.end - y_range.start),
    );
    let top_left = (-text_width - 2 * padding, -text_height - 2 * padding);

    let plotting_area = chart.plotting_area();
    plotting_area.draw(
        &(EmptyElement::at(anchor)
            + Rectangle::new([top_left, (0, 0)], WHITE.mix(0.8).filled())
            + Rectangle::new([top_left, (0, 0)], BLACK.mix(0.4).stroke_width(2))),
    )?;
    for (i, line) in lines.iter().enumerate() {
        plotting_area.draw(
            &(EmptyElement::at(anchor)
                + Text::new(
                    line.clone(),
                    (
                        top_left.0 + padding,
                        top_left.1 + padding + i as i32 * line_height,
                    ),
                    note_style.clone(),
                )),
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BaselinePeriod;
    use crate::table::tests::record;
    use crate::trend::analyze;
    use tempfile::tempdir;

    #[test]
    fn test_anomaly_label() {
        assert_eq!(anomaly_label(0.0), "0.00");
        assert_eq!(anomaly_label(-0.0), "0.00");
        assert_eq!(anomaly_label(-1e-9), "0.00");
        assert_eq!(anomaly_label(0.15), "0.15");
        assert_eq!(anomaly_label(-0.25), "-0.25");
        assert_eq!(anomaly_label(-0.1), "-0.10");
    }

    #[test]
    fn test_legend_area_holds_swatch() {
        assert!(px(LEGEND_AREA) > px(LEGEND_SWATCH));
    }

    #[test]
    fn test_render_writes_png() {
        let records: Vec<_> = (1982..=2022)
            .map(|year| {
                let sst = 28.0 + 0.02 * f64::from(year - 1982) + 0.05 * f64::from(year % 3);
                record(&format!("{}-06-01", year), -0.5, 120.5, sst)
            })
            .collect();
        let report = analyze(&records, BaselinePeriod::default()).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("trend.png");
        render(&path, &report).unwrap();

        assert_eq!(image::image_dimensions(&path).unwrap(), (WIDTH, HEIGHT));
    }
}
