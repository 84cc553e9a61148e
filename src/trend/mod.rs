//! Annual mean SST, anomaly against a climatological baseline and linear trend.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::config::{BaselinePeriod, Config};
use crate::table::{self, SstRecord, TableError};

pub mod chart;
pub mod regression;

pub use regression::{LinearFit, linear_regression};

#[derive(Debug, Error)]
pub enum TrendError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("insufficient data: {0}")]
    InsufficientData(String),
    #[error("failed to render chart: {0}")]
    Chart(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnualMean {
    pub year: i32,
    pub sst: f64,
}

/// Mean of the valid values of each calendar year, in year order. Years without
/// a single valid value are left out.
pub fn annual_means(records: &[SstRecord]) -> Vec<AnnualMean> {
    let mut sums: BTreeMap<i32, (f64, usize)> = BTreeMap::new();

    for record in records {
        let entry = sums.entry(record.year()).or_insert((0.0, 0));
        if !record.sst.is_nan() {
            entry.0 += record.sst;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .filter_map(|(year, (sum, count))| {
            if count == 0 {
                log::warn!("No valid SST value for {}, year dropped", year);
                None
            } else {
                Some(AnnualMean {
                    year,
                    sst: sum / count as f64,
                })
            }
        })
        .collect()
}

/// Mean of the annual values that fall inside `period`.
pub fn baseline(means: &[AnnualMean], period: BaselinePeriod) -> Result<f64, TrendError> {
    let in_period: Vec<f64> = means
        .iter()
        .filter(|m| period.contains(m.year))
        .map(|m| m.sst)
        .collect();

    if in_period.is_empty() {
        return Err(TrendError::InsufficientData(format!(
            "no annual value within the baseline period {}",
            period
        )));
    }

    Ok(in_period.iter().sum::<f64>() / in_period.len() as f64)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnualAnomaly {
    pub year: i32,
    pub sst: f64,
    pub sst_anom: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnualSeries {
    pub period: BaselinePeriod,
    pub baseline: f64,
    pub rows: Vec<AnnualAnomaly>,
}

impl AnnualSeries {
    pub fn from_means(means: &[AnnualMean], period: BaselinePeriod) -> Result<Self, TrendError> {
        let baseline = baseline(means, period)?;
        let rows = means
            .iter()
            .map(|m| AnnualAnomaly {
                year: m.year,
                sst: m.sst,
                sst_anom: m.sst - baseline,
            })
            .collect();

        Ok(Self {
            period,
            baseline,
            rows,
        })
    }

    pub fn from_records(records: &[SstRecord], period: BaselinePeriod) -> Result<Self, TrendError> {
        Self::from_means(&annual_means(records), period)
    }

    pub fn years(&self) -> Vec<f64> {
        self.rows.iter().map(|r| f64::from(r.year)).collect()
    }

    pub fn anomalies(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.sst_anom).collect()
    }

    pub fn year_range(&self) -> Option<(i32, i32)> {
        Some((self.rows.first()?.year, self.rows.last()?.year))
    }

    /// Linear fit of the anomaly against the year over every available year.
    pub fn fit(&self) -> Result<LinearFit, TrendError> {
        linear_regression(&self.years(), &self.anomalies()).ok_or_else(|| {
            TrendError::InsufficientData(format!(
                "a trend needs at least 2 distinct years, got {}",
                self.rows.len()
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendReport {
    pub series: AnnualSeries,
    pub fit: LinearFit,
}

impl TrendReport {
    pub fn trend_per_decade(&self) -> f64 {
        self.fit.per_decade()
    }
}

impl fmt::Display for TrendReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (first, last) = self.series.year_range().unwrap_or_default();
        writeln!(
            f,
            "Baseline {}: {:.3} °C ({} years analysed)",
            self.series.period,
            self.series.baseline,
            self.series.rows.len()
        )?;
        writeln!(
            f,
            "r = {:.2}, p-value = {:.4}, slope stderr = {:.4} °C/year",
            self.fit.r, self.fit.p_value, self.fit.stderr
        )?;
        write!(
            f,
            "Tren pemanasan laut Indonesia ({}–{}): {:.2} °C per dekade",
            first,
            last,
            self.trend_per_decade()
        )
    }
}

pub fn analyze(records: &[SstRecord], period: BaselinePeriod) -> Result<TrendReport, TrendError> {
    let series = AnnualSeries::from_records(records, period)?;
    let fit = series.fit()?;
    Ok(TrendReport { series, fit })
}

pub fn run(config: &Config) -> Result<TrendReport, TrendError> {
    let records = table::read_records(config.table())?;
    let report = analyze(&records, config.baseline())?;

    for row in &report.series.rows {
        log::debug!(
            "{}: mean {:.3} °C, anomaly {:+.3} °C",
            row.year,
            row.sst,
            row.sst_anom
        );
    }

    chart::render(config.trend_chart(), &report)?;
    println!("Grafik tren disimpan: {}", config.trend_chart().display());

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::record;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn means(range: std::ops::RangeInclusive<i32>, sst: impl Fn(i32) -> f64) -> Vec<AnnualMean> {
        range.map(|year| AnnualMean { year, sst: sst(year) }).collect()
    }

    #[test]
    fn test_annual_means_average_months_and_skip_missing() {
        let records = vec![
            record("1990-01-01", 5.5, 95.5, 28.0),
            record("1990-07-01", 5.5, 95.5, 30.0),
            record("1990-07-01", 4.5, 95.5, f64::NAN),
            record("1991-01-01", 5.5, 95.5, 29.0),
            record("1992-01-01", 5.5, 95.5, f64::NAN),
        ];

        let means = annual_means(&records);
        assert_eq!(
            means,
            vec![
                AnnualMean {
                    year: 1990,
                    sst: 29.0
                },
                AnnualMean {
                    year: 1991,
                    sst: 29.0
                },
            ]
        );
    }

    #[test]
    fn test_baseline_uses_inclusive_window() {
        // 1990 and 2021 sit just outside the window and carry outliers
        let series = means(1985..=2025, |year| match year {
            1990 | 2021 => 40.0,
            y => 28.0 + 0.01 * f64::from(y - 1991),
        });

        let value = baseline(&series, BaselinePeriod::default()).unwrap();
        let expected = (1991..=2020)
            .map(|y| 28.0 + 0.01 * f64::from(y - 1991))
            .sum::<f64>()
            / 30.0;
        assert_close(value, expected);

        let with_1990 = baseline(&series, BaselinePeriod::new(1990, 2020).unwrap()).unwrap();
        let with_2021 = baseline(&series, BaselinePeriod::new(1991, 2021).unwrap()).unwrap();
        assert!((with_1990 - value).abs() > 0.1);
        assert!((with_2021 - value).abs() > 0.1);
    }

    #[test]
    fn test_baseline_outside_data_is_an_error() {
        let series = means(1982..=1989, |_| 28.0);
        assert!(matches!(
            baseline(&series, BaselinePeriod::default()),
            Err(TrendError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_anomaly_is_difference_to_baseline() {
        let series = means(1990..=2022, |year| 27.5 + 0.015 * f64::from(year - 1990));
        let annual = AnnualSeries::from_means(&series, BaselinePeriod::default()).unwrap();

        assert_eq!(annual.rows.len(), series.len());
        for (row, mean) in annual.rows.iter().zip(&series) {
            assert_eq!(row.year, mean.year);
            assert_close(row.sst_anom, mean.sst - annual.baseline);
        }
        // The baseline is the mean of 1991..=2020, centred on 2005.5
        assert_close(annual.baseline, 27.5 + 0.015 * 15.5);
    }

    #[test]
    fn test_linear_anomalies_recover_trend() {
        let years = 1982..=2022;
        let anomalies: Vec<AnnualAnomaly> = years
            .map(|year| AnnualAnomaly {
                year,
                sst: 28.0,
                sst_anom: 0.02 * f64::from(year - 1991),
            })
            .collect();
        let series = AnnualSeries {
            period: BaselinePeriod::default(),
            baseline: 28.0,
            rows: anomalies,
        };

        let fit = series.fit().unwrap();
        assert!((fit.slope - 0.02).abs() < 1e-12);
        assert!((fit.r - 1.0).abs() < 1e-12);
        assert_eq!(series.year_range(), Some((1982, 2022)));
    }

    #[test]
    fn test_analyze_records() {
        let records: Vec<SstRecord> = (1989..=2022)
            .flat_map(|year| {
                let sst = 28.0 + 0.02 * f64::from(year - 1989);
                [
                    record(&format!("{year}-01-01"), 5.5, 95.5, sst - 0.5),
                    record(&format!("{year}-07-01"), 5.5, 95.5, sst + 0.5),
                ]
            })
            .collect();

        let report = analyze(&records, BaselinePeriod::default()).unwrap();
        assert_eq!(report.series.rows.len(), 34);
        assert!((report.trend_per_decade() - 0.2).abs() < 1e-9);
        assert!(report.to_string().contains("1989–2022): 0.20 °C per dekade"));
    }

    #[test]
    fn test_single_year_cannot_be_fitted() {
        let records = vec![record("2000-01-01", 5.5, 95.5, 28.0)];
        assert!(matches!(
            analyze(&records, BaselinePeriod::default()),
            Err(TrendError::InsufficientData(_))
        ));
    }
}
