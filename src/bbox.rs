use serde::Deserialize;

/// Geographic window in degrees. Longitudes may use either the -180..180 or the
/// 0..360 convention, the source grid decides which one applies.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Bbox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Bbox {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self, String> {
        if !(-180.0..=360.0).contains(&xmin) || !(-180.0..=360.0).contains(&xmax) {
            return Err("Longitude values must be between -180 and 360".to_string());
        }

        if !(-90.0..=90.0).contains(&ymin) || !(-90.0..=90.0).contains(&ymax) {
            return Err("Latitude values must be between -90 and 90".to_string());
        }

        if xmin > xmax || ymin > ymax {
            return Err("Min values must be <= max values".to_string());
        }

        Ok(Bbox {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    /// Builds a box from two longitude and two latitude bounds given in any order.
    ///
    /// Grids stored north to south are usually sliced as `lat = (6, -11)`; this
    /// accepts that form as well as the ascending one.
    pub fn from_bounds(lon: (f64, f64), lat: (f64, f64)) -> Result<Self, String> {
        Bbox::new(
            lon.0.min(lon.1),
            lon.0.max(lon.1),
            lat.0.min(lat.1),
            lat.0.max(lat.1),
        )
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        (self.xmin..=self.xmax).contains(&lon) && (self.ymin..=self.ymax).contains(&lat)
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

impl Default for Bbox {
    /// Indonesian maritime continent.
    fn default() -> Self {
        Bbox {
            xmin: 95.0,
            xmax: 141.0,
            ymin: -11.0,
            ymax: 6.0,
        }
    }
}
