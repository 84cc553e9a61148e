use plotters::style::RGBColor;

/// Polynomial approximation of the Turbo colormap, `t` in `[0, 1]`.
pub fn turbo(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);

    let r = 0.135_721_38
        + t * (4.615_392_60
            + t * (-42.660_322_58 + t * (132.131_082_34 + t * (-152.942_393_96 + t * 59.286_379_43))));
    let g = 0.091_402_61
        + t * (2.194_188_39
            + t * (4.842_966_58 + t * (-14.185_033_33 + t * (4.277_298_57 + t * 2.829_566_04))));
    let b = 0.106_673_30
        + t * (12.641_946_08
            + t * (-60.582_048_36 + t * (110.362_767_71 + t * (-89.903_109_12 + t * 27.348_249_73))));

    RGBColor(channel(r), channel(g), channel(b))
}

fn channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Fixed linear normalisation of temperatures onto the colormap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
}

impl ColorScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Position of `value` on the scale, clamped to `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f64 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// `None` for missing values so they render as gaps.
    pub fn color(&self, value: f64) -> Option<RGBColor> {
        if value.is_nan() {
            None
        } else {
            Some(turbo(self.normalize(value)))
        }
    }
}
