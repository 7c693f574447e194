// =============================================================================
// MACD (Moving Average Convergence Divergence)
// =============================================================================
//
// MACD      = EMA(close, 12) - EMA(close, 26)
// Signal    = EMA(MACD, 9)
// Histogram = MACD - Signal
// =============================================================================

use super::ema::ewm_mean;
use crate::error::CoreError;

pub const FAST_SPAN: usize = 12;
pub const SLOW_SPAN: usize = 26;
pub const SIGNAL_SPAN: usize = 9;

/// The three MACD lines, each aligned with the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// MACD with explicit spans.
pub fn macd_with(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<MacdLines, CoreError> {
    let fast_ema = ewm_mean(closes, fast)?;
    let slow_ema = ewm_mean(closes, slow)?;
    let macd: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal = ewm_mean(&macd, signal)?;
    let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();
    Ok(MacdLines {
        macd,
        signal,
        histogram,
    })
}

/// MACD with the standard 12/26/9 spans.
pub fn macd(closes: &[f64]) -> Result<MacdLines, CoreError> {
    macd_with(closes, FAST_SPAN, SLOW_SPAN, SIGNAL_SPAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_is_macd_minus_signal() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let lines = macd(&closes).unwrap();
        assert_eq!(lines.macd.len(), closes.len());
        for i in 0..closes.len() {
            assert!((lines.histogram[i] - (lines.macd[i] - lines.signal[i])).abs() < 1e-12);
        }
    }

    #[test]
    fn starts_at_zero() {
        let lines = macd(&[50.0, 51.0]).unwrap();
        assert_eq!(lines.macd[0], 0.0);
        assert_eq!(lines.signal[0], 0.0);
        assert_eq!(lines.histogram[0], 0.0);
    }

    #[test]
    fn uptrend_gives_positive_macd() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64 * 0.5).collect();
        let lines = macd(&closes).unwrap();
        assert!(*lines.macd.last().unwrap() > 0.0);
    }

    #[test]
    fn zero_span_is_rejected() {
        assert!(macd_with(&[1.0], 0, 26, 9).is_err());
    }
}
