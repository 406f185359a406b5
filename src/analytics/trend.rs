//! Ordinary least-squares trend over a monthly series.
//!
//! The independent variable is the month's position in the ordered series
//! (`0..n`), not its calendar value, so gaps between months are ignored.

use serde::{Deserialize, Serialize};

/// A fitted line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    /// Fitted value at month index `x`.
    pub fn value_at(&self, x: usize) -> f64 {
        self.slope * x as f64 + self.intercept
    }

    /// Fitted values for indices `0..n`, aligned with the input series.
    pub fn fitted(&self, n: usize) -> Vec<f64> {
        (0..n).map(|x| self.value_at(x)).collect()
    }
}

/// Fit a least-squares line through `(i, values[i])`.
///
/// Returns `None` for fewer than two points, where the line is undefined.
pub fn fit_trend(values: &[f64]) -> Option<TrendLine> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let count = n as f64;
    let mean_x = (count - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / count;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }

    // sxx > 0 whenever n >= 2 since the x values are distinct
    let slope = sxy / sxx;
    Some(TrendLine {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}
