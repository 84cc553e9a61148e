use std::fmt;

/// Summary of a block of values where `NaN` marks a missing cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub valid: usize,
    pub total: usize,
}

pub fn value_statistics(values: &[f64]) -> Option<ValueStats> {
    let valid_values: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();

    if valid_values.is_empty() {
        return None;
    }

    Some(ValueStats {
        min: valid_values.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
        max: valid_values
            .iter()
            .fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
        mean: valid_values.iter().sum::<f64>() / valid_values.len() as f64,
        valid: valid_values.len(),
        total: values.len(),
    })
}

impl fmt::Display for ValueStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Min: {:.2} °C, Max: {:.2} °C, Mean: {:.2} °C, Valid cells: {} / {} ({:.1}%)",
            self.min,
            self.max,
            self.mean,
            self.valid,
            self.total,
            100.0 * self.valid as f64 / self.total as f64
        )
    }
}
