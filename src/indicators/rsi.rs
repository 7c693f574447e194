// =============================================================================
// Relative Strength Index (RSI), rolling-mean variant on percent changes
// =============================================================================
//
// Step 1: Percent change of consecutive closes:
//            delta_t = (close_t - close_{t-1}) / close_{t-1} * 100
// Step 2: gain_t = max(delta_t, 0), loss_t = max(-delta_t, 0); the first bar
//          has no delta and contributes 0 to both.
// Step 3: Average both with a rolling mean (expanding head, 14 bars).
// Step 4: RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// When avg_loss is 0 the ratio is unbounded and RSI is exactly 100, even
// when avg_gain is 0 as well (a perfectly flat market).
// =============================================================================

use super::sma::rolling_mean;
use crate::error::CoreError;

pub const RSI_PERIOD: usize = 14;

/// Compute the RSI series for `closes`, aligned one-to-one with the input.
///
/// The first value is NaN: there is no earlier close to measure against.
/// A zero previous close counts as no move for that bar. A plain percent
/// change would be infinite there and pin RSI at 100 for the next `period`
/// bars; this deliberately departs from that.
///
/// # Errors
/// `InvalidParameter` when `period == 0`.
pub fn relative_strength_index(closes: &[f64], period: usize) -> Result<Vec<f64>, CoreError> {
    if period == 0 {
        return Err(CoreError::invalid("period", "must be at least 1"));
    }

    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        let delta = if i == 0 || closes[i - 1] == 0.0 {
            f64::NAN
        } else {
            (closes[i] - closes[i - 1]) / closes[i - 1] * 100.0
        };
        gains.push(if delta > 0.0 { delta } else { 0.0 });
        losses.push(if delta < 0.0 { -delta } else { 0.0 });
    }

    let avg_gain = rolling_mean(&gains, period)?;
    let avg_loss = rolling_mean(&losses, period)?;

    Ok(avg_gain
        .iter()
        .zip(&avg_loss)
        .enumerate()
        .map(|(i, (&g, &l))| if i == 0 { f64::NAN } else { rsi_from_averages(g, l) })
        .collect())
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty_input() {
        assert!(relative_strength_index(&[], 14).unwrap().is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert!(relative_strength_index(&[1.0, 2.0, 3.0], 0).is_err());
    }

    #[test]
    fn rsi_first_value_is_undefined() {
        let rsi = relative_strength_index(&[10.0, 11.0], 14).unwrap();
        assert!(rsi[0].is_nan());
        assert_eq!(rsi.len(), 2);
    }

    #[test]
    fn rsi_flat_market_saturates_at_100() {
        let rsi = relative_strength_index(&[100.0; 30], RSI_PERIOD).unwrap();
        for &v in &rsi[1..] {
            assert_eq!(v, 100.0);
        }
    }

    #[test]
    fn rsi_all_gains() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let rsi = relative_strength_index(&closes, RSI_PERIOD).unwrap();
        for &v in &rsi[1..] {
            assert_eq!(v, 100.0);
        }
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let rsi = relative_strength_index(&closes, RSI_PERIOD).unwrap();
        for &v in &rsi[1..] {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_known_values() {
        // deltas: +10%, -10%
        let rsi = relative_strength_index(&[100.0, 110.0, 99.0], 14).unwrap();
        // bar 1: gain mean = 5, loss mean = 0 => 100
        assert_eq!(rsi[1], 100.0);
        // bar 2: gain mean = 10/3, loss mean = 10/3 => RS = 1 => 50
        assert!((rsi[2] - 50.0).abs() < 1e-10);
    }

    #[test]
    fn rsi_window_forgets_old_losses() {
        // one loss, then only gains; once the loss leaves a 3-bar window RSI hits 100
        let closes = [100.0, 90.0, 95.0, 100.0, 105.0, 110.0];
        let rsi = relative_strength_index(&closes, 3).unwrap();
        assert!(rsi[2] < 100.0);
        assert_eq!(rsi[4], 100.0);
        assert_eq!(rsi[5], 100.0);
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let rsi = relative_strength_index(&closes, RSI_PERIOD).unwrap();
        for &v in &rsi[1..] {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_zero_previous_close_counts_as_no_move() {
        let rsi = relative_strength_index(&[0.0, 5.0, 5.0], 14).unwrap();
        assert_eq!(rsi[1], 100.0);
        assert_eq!(rsi[2], 100.0);
    }
}
