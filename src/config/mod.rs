use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::bbox::Bbox;

pub mod error;
pub use error::ConfigError;

pub mod period;
pub use period::BaselinePeriod;

/// Optional override file looked up in the working directory.
pub const CONFIG_FILE: &str = "sst_pipeline.json";

#[derive(Debug, Clone)]
pub struct Config {
    source: PathBuf,
    variable: String,
    table: PathBuf,
    trend_chart: PathBuf,
    animation: PathBuf,
    basemap: Option<PathBuf>,
    bbox: Bbox,
    baseline: BaselinePeriod,
    color_min: f64,
    color_max: f64,
    contour_step: f64,
    fps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::from("sst.mnmean.nc"),
            variable: "sst".to_string(),
            table: PathBuf::from("sst_climatology_indonesia_monthly.xlsx"),
            trend_chart: PathBuf::from("SST_Indonesia_Trend_IPCCstyle.png"),
            animation: PathBuf::from("SST_Indonesia_1982_2022.gif"),
            basemap: None,
            bbox: Bbox::default(),
            baseline: BaselinePeriod::default(),
            color_min: 27.0,
            color_max: 31.0,
            contour_step: 1.0,
            fps: 2,
        }
    }
}

// Every key is optional and falls back to the built-in default. Values that are
// present are validated the same way the defaults would be.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct ConfigHelper {
            source: Option<PathBuf>,
            variable: Option<String>,
            table: Option<PathBuf>,
            trend_chart: Option<PathBuf>,
            animation: Option<PathBuf>,
            basemap: Option<PathBuf>,
            bbox: Option<BboxHelper>,
            baseline_start: Option<i32>,
            baseline_end: Option<i32>,
            color_min: Option<f64>,
            color_max: Option<f64>,
            contour_step: Option<f64>,
            fps: Option<u32>,
        }

        #[derive(Deserialize)]
        struct BboxHelper {
            xmin: f64,
            xmax: f64,
            ymin: f64,
            ymax: f64,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;
        let defaults = Config::default();

        let bbox = match helper.bbox {
            Some(b) => Bbox::from_bounds((b.xmin, b.xmax), (b.ymin, b.ymax))
                .map_err(|e| D::Error::custom(ConfigError::Bbox(e)))?,
            None => defaults.bbox,
        };

        let baseline = BaselinePeriod::new(
            helper.baseline_start.unwrap_or(defaults.baseline.start),
            helper.baseline_end.unwrap_or(defaults.baseline.end),
        )
        .ok_or_else(|| D::Error::custom(ConfigError::BaselineOrder))?;

        let color_min = helper.color_min.unwrap_or(defaults.color_min);
        let color_max = helper.color_max.unwrap_or(defaults.color_max);
        if !(color_min < color_max) {
            return Err(D::Error::custom(ConfigError::ColorRange));
        }

        let contour_step = helper.contour_step.unwrap_or(defaults.contour_step);
        if !(contour_step > 0.0) {
            return Err(D::Error::custom(ConfigError::ContourStep));
        }

        let fps = helper.fps.unwrap_or(defaults.fps);
        if fps == 0 {
            return Err(D::Error::custom(ConfigError::Fps));
        }

        Ok(Config {
            source: helper.source.unwrap_or(defaults.source),
            variable: helper.variable.unwrap_or(defaults.variable),
            table: helper.table.unwrap_or(defaults.table),
            trend_chart: helper.trend_chart.unwrap_or(defaults.trend_chart),
            animation: helper.animation.unwrap_or(defaults.animation),
            basemap: helper.basemap,
            bbox,
            baseline,
            color_min,
            color_max,
            contour_step,
            fps,
        })
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Reads [`CONFIG_FILE`] from the working directory when it exists, otherwise
    /// returns the built-in defaults.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            log::info!("Loading configuration from {}", path.display());
            Config::from_file(path)
        } else {
            log::debug!("{} not found, using built-in defaults", CONFIG_FILE);
            Ok(Config::default())
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn table(&self) -> &Path {
        &self.table
    }

    pub fn trend_chart(&self) -> &Path {
        &self.trend_chart
    }

    pub fn animation(&self) -> &Path {
        &self.animation
    }

    pub fn basemap(&self) -> Option<&Path> {
        self.basemap.as_deref()
    }

    pub fn bbox(&self) -> &Bbox {
        &self.bbox
    }

    pub fn baseline(&self) -> BaselinePeriod {
        self.baseline
    }

    pub fn color_range(&self) -> (f64, f64) {
        (self.color_min, self.color_max)
    }

    pub fn contour_step(&self) -> f64 {
        self.contour_step
    }

    /// Delay between two animation frames in milliseconds.
    pub fn frame_delay_ms(&self) -> u32 {
        1000 / self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("sst_pipeline.json");
        let mut file = File::create(&file_path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, file_path)
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.source(), Path::new("sst.mnmean.nc"));
        assert_eq!(
            config.table(),
            Path::new("sst_climatology_indonesia_monthly.xlsx")
        );
        assert_eq!(config.bbox(), &Bbox::default());
        assert_eq!(config.baseline(), BaselinePeriod::default());
        assert_eq!(config.color_range(), (27.0, 31.0));
        assert_eq!(config.frame_delay_ms(), 500);
    }

    #[test]
    fn test_from_file_partial_override() {
        let (_dir, path) = write_config(
            r#"
    {
        "table": "subset.csv",
        "bbox": { "xmin": 95.0, "xmax": 141.0, "ymin": 6.0, "ymax": -11.0 },
        "baseline_start": 1981,
        "baseline_end": 2010
    }
    "#,
        );

        let config = Config::from_file(path).unwrap();

        assert_eq!(config.table(), Path::new("subset.csv"));
        assert_eq!(config.bbox(), &Bbox::default());
        assert_eq!(config.baseline(), BaselinePeriod::new(1981, 2010).unwrap());
        assert_eq!(config.variable(), "sst");
        assert_eq!(config.frame_delay_ms(), 500);
    }

    #[test]
    fn test_from_file_rejects_invalid_values() {
        let (_dir, path) = write_config(r#"{ "baseline_start": 2020, "baseline_end": 1991 }"#);
        assert!(matches!(Config::from_file(path), Err(ConfigError::Json(_))));

        let (_dir, path) = write_config(r#"{ "color_min": 31.0, "color_max": 27.0 }"#);
        assert!(Config::from_file(path).is_err());

        let (_dir, path) = write_config(r#"{ "fps": 0 }"#);
        assert!(Config::from_file(path).is_err());

        let (_dir, path) = write_config(
            r#"{ "bbox": { "xmin": 95.0, "xmax": 141.0, "ymin": -100.0, "ymax": 6.0 } }"#,
        );
        assert!(Config::from_file(path).is_err());

        let (_dir, path) = write_config(r#"{ "colour_min": 20.0 }"#);
        assert!(Config::from_file(path).is_err());
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempdir().unwrap();
        let result = Config::from_file(dir.path().join("nope.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
