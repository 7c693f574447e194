// =============================================================================
// Simple Moving Average (SMA) with an expanding head
// =============================================================================
//
// SMA_t = mean(x_{t-window+1} ..= x_t)
//
// For t < window - 1 the mean is taken over the t + 1 points seen so far, so
// the output has the same length as the input and no leading gaps.
// Non-finite inputs are skipped inside the window; a window with no finite
// value yields NaN.
// =============================================================================

use crate::error::CoreError;

/// Rolling mean with an expanding head (`min_periods = 1`).
///
/// # Errors
/// `InvalidParameter` when `window == 0`.
pub fn rolling_mean(series: &[f64], window: usize) -> Result<Vec<f64>, CoreError> {
    if window == 0 {
        return Err(CoreError::invalid("window", "must be at least 1"));
    }

    let mut out = Vec::with_capacity(series.len());
    for i in 0..series.len() {
        let start = (i + 1).saturating_sub(window);
        let (sum, count) = series[start..=i]
            .iter()
            .filter(|v| v.is_finite())
            .fold((0.0_f64, 0_usize), |(s, c), &v| (s + v, c + 1));
        out.push(if count == 0 { f64::NAN } else { sum / count as f64 });
    }
    Ok(out)
}
