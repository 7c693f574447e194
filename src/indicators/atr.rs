// =============================================================================
// Average True Range (ATR)
// =============================================================================
//
// True Range (TR) for each bar:
//   TR_0 = H_0 - L_0
//   TR_t = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the rolling mean of TR with an expanding head, so the first 13 bars
// of a 14-period ATR average fewer than 14 ranges.
//
// Default period: 14
// =============================================================================

use super::sma::rolling_mean;
use crate::error::CoreError;

pub const ATR_PERIOD: usize = 14;

/// True range per bar, aligned with the inputs.
///
/// # Errors
/// `InvalidParameter` when the three slices differ in length.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Result<Vec<f64>, CoreError> {
    if high.len() != low.len() || high.len() != close.len() {
        return Err(CoreError::invalid(
            "ohlc",
            format!(
                "high/low/close lengths differ ({}/{}/{})",
                high.len(),
                low.len(),
                close.len()
            ),
        ));
    }

    let mut tr = Vec::with_capacity(high.len());
    for i in 0..high.len() {
        let hl = high[i] - low[i];
        if i == 0 {
            tr.push(hl);
            continue;
        }
        let prev_close = close[i - 1];
        let hc = (high[i] - prev_close).abs();
        let lc = (low[i] - prev_close).abs();
        // f64::max ignores a NaN operand, like a skip-NaN row max.
        tr.push(hl.max(hc).max(lc));
    }
    Ok(tr)
}

/// Rolling mean of the true range over `period` bars.
pub fn average_true_range(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    period: usize,
) -> Result<Vec<f64>, CoreError> {
    if period == 0 {
        return Err(CoreError::invalid("period", "must be at least 1"));
    }
    let tr = true_range(high, low, close)?;
    rolling_mean(&tr, period)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_bar_is_high_minus_low() {
        let tr = true_range(&[105.0], &[95.0], &[100.0]).unwrap();
        assert_eq!(tr, vec![10.0]);
    }

    #[test]
    fn true_range_uses_prev_close_on_gaps() {
        // Gap up: |115 - 95| = 20 > 115 - 108 = 7
        let tr = true_range(&[105.0, 115.0], &[95.0, 108.0], &[95.0, 112.0]).unwrap();
        assert_eq!(tr, vec![10.0, 20.0]);
    }

    #[test]
    fn true_range_gap_down() {
        // |80 - 100| = 20 > 85 - 80 = 5
        let tr = true_range(&[101.0, 85.0], &[99.0, 80.0], &[100.0, 82.0]).unwrap();
        assert_eq!(tr[1], 20.0);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        assert!(true_range(&[1.0, 2.0], &[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn atr_constant_range() {
        let n = 30;
        let high: Vec<f64> = (0..n).map(|_| 105.0).collect();
        let low: Vec<f64> = (0..n).map(|_| 95.0).collect();
        let close: Vec<f64> = (0..n).map(|_| 100.0).collect();
        let atr = average_true_range(&high, &low, &close, ATR_PERIOD).unwrap();
        assert_eq!(atr.len(), n);
        assert!(atr.iter().all(|v| (v - 10.0).abs() < 1e-10));
    }

    #[test]
    fn atr_head_averages_available_ranges() {
        let atr = average_true_range(&[12.0, 14.0], &[10.0, 10.0], &[11.0, 13.0], 14).unwrap();
        // TR = [2, 4]
        assert_eq!(atr, vec![2.0, 3.0]);
    }

    #[test]
    fn atr_period_zero() {
        assert!(average_true_range(&[1.0], &[1.0], &[1.0], 0).is_err());
    }
}
