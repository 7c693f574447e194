// =============================================================================
// Moving-average cross-over detection
// =============================================================================
//
// A golden cross is the first bar where the short average is at or above the
// long one after being below it; a death cross is the first bar where it
// drops below after being at or above. Equality counts as "at or above".

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossSignal {
    Golden,
    Death,
}

impl CrossSignal {
    /// +1 for golden, -1 for death.
    pub fn value(self) -> f64 {
        match self {
            Self::Golden => 1.0,
            Self::Death => -1.0,
        }
    }
}

/// Cross-over events per bar. Bar 0 never carries an event, and neither does
/// a bar whose pair, or the previous pair, has a non-finite value.
pub fn detect_crossovers(short: &[f64], long: &[f64]) -> Result<Vec<Option<CrossSignal>>, CoreError> {
    if short.len() != long.len() {
        return Err(CoreError::invalid(
            "crossover",
            format!("series lengths differ ({} vs {})", short.len(), long.len()),
        ));
    }

    let mut out = vec![None; short.len()];
    for i in 1..short.len() {
        let pair = [short[i - 1], long[i - 1], short[i], long[i]];
        if pair.iter().any(|v| !v.is_finite()) {
            continue;
        }
        let was_above = short[i - 1] >= long[i - 1];
        let is_above = short[i] >= long[i];
        out[i] = match (was_above, is_above) {
            (false, true) => Some(CrossSignal::Golden),
            (true, false) => Some(CrossSignal::Death),
            _ => None,
        };
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_up_one_down() {
        let long = vec![10.0; 7];
        let short = vec![8.0, 9.0, 11.0, 12.0, 11.0, 9.0, 8.0];
        let signals = detect_crossovers(&short, &long).unwrap();
        assert_eq!(signals[2], Some(CrossSignal::Golden));
        assert_eq!(signals[5], Some(CrossSignal::Death));
        assert_eq!(signals.iter().filter(|s| s.is_some()).count(), 2);
    }

    #[test]
    fn touching_from_below_is_a_golden_cross() {
        let signals = detect_crossovers(&[9.0, 10.0, 10.0], &[10.0, 10.0, 10.0]).unwrap();
        assert_eq!(signals, vec![None, Some(CrossSignal::Golden), None]);
    }

    #[test]
    fn leaving_equality_downwards_is_a_death_cross() {
        let signals = detect_crossovers(&[10.0, 9.0], &[10.0, 10.0]).unwrap();
        assert_eq!(signals, vec![None, Some(CrossSignal::Death)]);
    }

    #[test]
    fn no_cross_when_always_above() {
        let signals = detect_crossovers(&[11.0, 12.0, 13.0], &[10.0, 10.0, 10.0]).unwrap();
        assert!(signals.iter().all(Option::is_none));
    }

    #[test]
    fn nan_suppresses_events() {
        let signals = detect_crossovers(&[9.0, f64::NAN, 11.0], &[10.0, 10.0, 10.0]).unwrap();
        assert!(signals.iter().all(Option::is_none));
    }

    #[test]
    fn length_mismatch() {
        assert!(detect_crossovers(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn signal_values() {
        assert_eq!(CrossSignal::Golden.value(), 1.0);
        assert_eq!(CrossSignal::Death.value(), -1.0);
    }
}
