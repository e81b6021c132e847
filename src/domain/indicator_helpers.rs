//! Shared rolling-window statistics for indicator calculations.

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (divides by n - 1).
///
/// `None` for fewer than two values. A window of identical values yields
/// exactly `0.0` rather than a rounding residue.
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    if values.iter().all(|v| *v == values[0]) {
        return Some(0.0);
    }

    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// The `window` values ending at index `i`, if all of them are present.
pub fn trailing_window(values: &[Option<f64>], i: usize, window: usize) -> Option<Vec<f64>> {
    if window == 0 || i + 1 < window {
        return None;
    }
    values[i + 1 - window..=i].iter().copied().collect()
}
