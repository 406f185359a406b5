//! Period-over-period percentage change.

/// Percentage change from `previous` to `current`.
///
/// Undefined (`None`) when `previous` is zero.
pub fn period_variation(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

/// Variation at every index `i >= 1` of an ordered series.
///
/// The result has `values.len() - 1` entries (empty for fewer than two values).
pub fn variations(values: &[f64]) -> Vec<Option<f64>> {
    values
        .windows(2)
        .map(|pair| period_variation(pair[0], pair[1]))
        .collect()
}

/// Variation of the final period: the headline delta.
pub fn last_variation(values: &[f64]) -> Option<f64> {
    match values {
        [.., previous, current] => period_variation(*previous, *current),
        _ => None,
    }
}
