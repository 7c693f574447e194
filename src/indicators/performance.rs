// =============================================================================
// Relative performance and bar direction
// =============================================================================
//
// Helpers for the multi-security comparison chart and for colouring volume
// bars. Both are aligned one-to-one with the price history.

use serde::{Deserialize, Serialize};

use crate::market_data::{PriceBar, PriceHistory};

/// Change of each close relative to the first close, as a fraction.
///
/// All NaN when the first close is zero or non-finite.
pub fn relative_change(closes: &[f64]) -> Vec<f64> {
    let Some(&base) = closes.first() else {
        return Vec::new();
    };
    if base == 0.0 || !base.is_finite() {
        return vec![f64::NAN; closes.len()];
    }
    closes.iter().map(|c| (c - base) / base).collect()
}

/// Relative change per security, in input order.
pub fn compare_securities(histories: &[PriceHistory]) -> Vec<(String, Vec<f64>)> {
    histories
        .iter()
        .map(|h| (h.symbol().to_string(), relative_change(&h.closes())))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarDirection {
    Up,
    Down,
}

/// `Up` when a bar closed above its open, otherwise `Down`.
pub fn bar_direction(bars: &[PriceBar]) -> Vec<BarDirection> {
    bars.iter()
        .map(|b| {
            if b.close > b.open {
                BarDirection::Up
            } else {
                BarDirection::Down
            }
        })
        .collect()
}
