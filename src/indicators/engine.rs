// =============================================================================
// Technical Indicator Engine
// =============================================================================
//
// Turns a list of indicator specs into named columns aligned with a price
// history. Every spec is validated before any column is computed, so a bad
// request never yields a half-built result. Inputs are never modified: the
// engine returns a copy of the history with the derived columns beside it.
// =============================================================================

use std::str::FromStr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::atr::{average_true_range, ATR_PERIOD};
use super::crossover::detect_crossovers;
use super::ema::ewm_mean;
use super::macd::macd;
use super::rsi::{relative_strength_index, RSI_PERIOD};
use super::sma::rolling_mean;
use crate::error::{CoreError, CoreResult};
use crate::market_data::PriceHistory;

// ---------------------------------------------------------------------------
// Specs
// ---------------------------------------------------------------------------

/// Moving-average flavour used by SMA/EMA columns and cross-overs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaKind {
    Sma,
    Ema,
}

impl MaKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::Sma => "SMA",
            Self::Ema => "EMA",
        }
    }

    fn column(self, window: usize) -> String {
        format!("{}_{window}", self.prefix())
    }
}

/// One requested indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorSpec {
    Sma(usize),
    Ema(usize),
    /// 14-bar average true range.
    Atr,
    /// MACD, Signal and MACD_Hist together.
    Macd,
    /// 14-bar relative strength index.
    Rsi,
    Crossover { kind: MaKind, short: usize, long: usize },
}

impl IndicatorSpec {
    /// Columns this spec contributes to the output.
    pub fn columns(&self) -> Vec<String> {
        match self {
            Self::Sma(w) => vec![MaKind::Sma.column(*w)],
            Self::Ema(w) => vec![MaKind::Ema.column(*w)],
            Self::Atr => vec!["ATR".into()],
            Self::Macd => vec!["MACD".into(), "Signal".into(), "MACD_Hist".into()],
            Self::Rsi => vec!["RSI".into()],
            Self::Crossover { kind, short, long } => {
                vec![format!("CROSS_{}_{short}_{long}", kind.prefix())]
            }
        }
    }

    fn validate(&self) -> CoreResult<()> {
        match *self {
            Self::Sma(0) | Self::Ema(0) => Err(CoreError::invalid("window", "must be at least 1")),
            Self::Crossover { short, long, .. } => {
                if short == 0 || long == 0 {
                    Err(CoreError::invalid("window", "must be at least 1"))
                } else if short >= long {
                    Err(CoreError::invalid(
                        "crossover",
                        format!("short window {short} must be below long window {long}"),
                    ))
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }
}

impl FromStr for IndicatorSpec {
    type Err = CoreError;

    /// Parses `SMA_20`, `EMA_50`, `ATR`, `MACD`, `RSI` and
    /// `CROSS_SMA_20_50` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_uppercase();
        let parts: Vec<&str> = token.split('_').collect();

        let no_params = |spec: IndicatorSpec| {
            if parts.len() == 1 {
                Ok(spec)
            } else {
                Err(CoreError::invalid(
                    parts[0],
                    format!("`{s}`: {} takes no parameters", parts[0]),
                ))
            }
        };

        match parts[0] {
            "SMA" | "EMA" => {
                let [_, window] = parts[..] else {
                    return Err(CoreError::invalid("window", format!("`{s}` needs one window, e.g. SMA_20")));
                };
                let window = parse_window(window)?;
                Ok(if parts[0] == "SMA" {
                    Self::Sma(window)
                } else {
                    Self::Ema(window)
                })
            }
            "ATR" => no_params(Self::Atr),
            "MACD" => no_params(Self::Macd),
            "RSI" => no_params(Self::Rsi),
            "CROSS" => {
                let [_, kind, short, long] = parts[..] else {
                    return Err(CoreError::invalid(
                        "crossover",
                        format!("`{s}` should look like CROSS_SMA_20_50"),
                    ));
                };
                let kind = match kind {
                    "SMA" => MaKind::Sma,
                    "EMA" => MaKind::Ema,
                    other => return Err(CoreError::UnsupportedIndicator(format!("CROSS_{other}"))),
                };
                let spec = Self::Crossover {
                    kind,
                    short: parse_window(short)?,
                    long: parse_window(long)?,
                };
                spec.validate()?;
                Ok(spec)
            }
            _ => Err(CoreError::UnsupportedIndicator(s.trim().to_string())),
        }
    }
}

fn parse_window(raw: &str) -> CoreResult<usize> {
    match raw.parse::<i64>() {
        Ok(w) if w > 0 => Ok(w as usize),
        Ok(w) => Err(CoreError::invalid("window", format!("{w} is not positive"))),
        Err(_) if raw.parse::<f64>().is_ok() => {
            Err(CoreError::invalid("window", format!("{raw} is not an integer")))
        }
        Err(_) => Err(CoreError::invalid("window", format!("`{raw}` is not a number"))),
    }
}

/// Replace the `X` placeholder in tokens such as `SMA_X` with `span`.
pub fn expand_time_span<S: AsRef<str>>(tokens: &[S], span: usize) -> Vec<String> {
    tokens
        .iter()
        .map(|t| {
            let t = t.as_ref().trim();
            match t.strip_suffix("_X").or_else(|| t.strip_suffix("_x")) {
                Some(head) => format!("{head}_{span}"),
                None => t.to_string(),
            }
        })
        .collect()
}

/// Parse every token, failing on the first bad one.
pub fn parse_specs<S: AsRef<str>>(tokens: &[S]) -> CoreResult<Vec<IndicatorSpec>> {
    tokens.iter().map(|t| t.as_ref().parse()).collect()
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Derived columns keyed by name, in the order they were requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorSet {
    columns: IndexMap<String, Vec<f64>>,
}

impl IndicatorSet {
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn insert(&mut self, name: String, values: Vec<f64>) {
        self.columns.insert(name, values);
    }
}

/// A price history together with its derived columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedHistory {
    pub history: PriceHistory,
    pub indicators: IndicatorSet,
}

impl EnrichedHistory {
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.indicators.get(name)
    }

    /// `(timestamp, value)` pairs for one column.
    pub fn series(&self, name: &str) -> Option<Vec<(DateTime<Utc>, f64)>> {
        let values = self.indicators.get(name)?;
        Some(
            self.history
                .bars()
                .iter()
                .zip(values)
                .map(|(b, v)| (b.timestamp, *v))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Compute the requested indicators for `history`.
///
/// Specs are applied in order; a spec repeated later is ignored. Cross-overs
/// reuse moving-average columns requested earlier and compute any missing
/// one privately, without adding it to the output.
///
/// # Errors
/// `InvalidParameter` for a zero window or an inverted cross-over pair,
/// raised before anything is computed.
pub fn compute_indicators(history: &PriceHistory, specs: &[IndicatorSpec]) -> CoreResult<EnrichedHistory> {
    for spec in specs {
        spec.validate()?;
    }

    let closes = history.closes();
    let mut set = IndicatorSet::default();

    for spec in specs {
        let names = spec.columns();
        if names.iter().all(|n| set.columns.contains_key(n)) {
            continue;
        }

        match *spec {
            IndicatorSpec::Sma(w) => set.insert(names[0].clone(), rolling_mean(&closes, w)?),
            IndicatorSpec::Ema(w) => set.insert(names[0].clone(), ewm_mean(&closes, w)?),
            IndicatorSpec::Atr => {
                let atr = average_true_range(&history.highs(), &history.lows(), &closes, ATR_PERIOD)?;
                set.insert(names[0].clone(), atr);
            }
            IndicatorSpec::Macd => {
                let lines = macd(&closes)?;
                set.insert("MACD".into(), lines.macd);
                set.insert("Signal".into(), lines.signal);
                set.insert("MACD_Hist".into(), lines.histogram);
            }
            IndicatorSpec::Rsi => {
                set.insert(names[0].clone(), relative_strength_index(&closes, RSI_PERIOD)?)
            }
            IndicatorSpec::Crossover { kind, short, long } => {
                let short_ma = moving_average(&set, &closes, kind, short)?;
                let long_ma = moving_average(&set, &closes, kind, long)?;
                let signals = detect_crossovers(&short_ma, &long_ma)?
                    .into_iter()
                    .map(|s| s.map_or(0.0, |s| s.value()))
                    .collect();
                set.insert(names[0].clone(), signals);
            }
        }
    }

    debug!(
        symbol = history.symbol(),
        bars = history.len(),
        columns = set.len(),
        "indicators computed"
    );

    Ok(EnrichedHistory {
        history: history.clone(),
        indicators: set,
    })
}

fn moving_average(set: &IndicatorSet, closes: &[f64], kind: MaKind, window: usize) -> CoreResult<Vec<f64>> {
    if let Some(existing) = set.get(&kind.column(window)) {
        return Ok(existing.to_vec());
    }
    match kind {
        MaKind::Sma => rolling_mean(closes, window),
        MaKind::Ema => ewm_mean(closes, window),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::price_history::test_support::{bar, history_from_closes};

    fn specs(tokens: &[&str]) -> Vec<IndicatorSpec> {
        parse_specs(tokens).unwrap()
    }

    // ---- parsing ---------------------------------------------------------

    #[test]
    fn parses_all_kinds() {
        assert_eq!(
            specs(&["SMA_20", "ema_50", "ATR", "MACD", "RSI", "CROSS_SMA_20_50"]),
            vec![
                IndicatorSpec::Sma(20),
                IndicatorSpec::Ema(50),
                IndicatorSpec::Atr,
                IndicatorSpec::Macd,
                IndicatorSpec::Rsi,
                IndicatorSpec::Crossover { kind: MaKind::Sma, short: 20, long: 50 },
            ]
        );
    }

    #[test]
    fn unknown_kind_is_unsupported() {
        assert_eq!(
            "VWAP".parse::<IndicatorSpec>(),
            Err(CoreError::UnsupportedIndicator("VWAP".into()))
        );
        assert!(matches!(
            "CROSS_WMA_5_10".parse::<IndicatorSpec>(),
            Err(CoreError::UnsupportedIndicator(_))
        ));
    }

    #[test]
    fn bad_windows_are_invalid_parameters() {
        for token in ["SMA_0", "SMA_-5", "EMA_2.5", "SMA_abc", "SMA", "SMA_1_2", "RSI_7"] {
            assert!(
                matches!(token.parse::<IndicatorSpec>(), Err(CoreError::InvalidParameter { .. })),
                "{token} should be rejected"
            );
        }
    }

    #[test]
    fn crossover_needs_short_below_long() {
        assert!(matches!(
            "CROSS_EMA_50_20".parse::<IndicatorSpec>(),
            Err(CoreError::InvalidParameter { .. })
        ));
        assert!("CROSS_EMA_20_20".parse::<IndicatorSpec>().is_err());
    }

    #[test]
    fn time_span_placeholder_is_expanded() {
        let tokens = expand_time_span(&["SMA_X", "EMA_20", "EMA_X", "RSI"], 30);
        assert_eq!(tokens, vec!["SMA_30", "EMA_20", "EMA_30", "RSI"]);
    }

    // ---- engine ----------------------------------------------------------

    #[test]
    fn columns_are_named_and_aligned() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let h = history_from_closes(&closes);
        let out = compute_indicators(&h, &specs(&["SMA_20", "EMA_10", "ATR", "MACD", "RSI"])).unwrap();
        let names: Vec<&str> = out.indicators.names().collect();
        assert_eq!(names, vec!["SMA_20", "EMA_10", "ATR", "MACD", "Signal", "MACD_Hist", "RSI"]);
        for (_, values) in out.indicators.iter() {
            assert_eq!(values.len(), h.len());
        }
        assert_eq!(out.history, h);
    }

    #[test]
    fn atr_does_not_leak_true_range() {
        let h = history_from_closes(&[1.0, 2.0, 3.0]);
        let out = compute_indicators(&h, &[IndicatorSpec::Atr]).unwrap();
        assert_eq!(out.indicators.names().collect::<Vec<_>>(), vec!["ATR"]);
    }

    #[test]
    fn short_history_uses_expanding_windows() {
        let h = history_from_closes(&[10.0, 20.0]);
        let out = compute_indicators(&h, &specs(&["SMA_200"])).unwrap();
        assert_eq!(out.column("SMA_200").unwrap(), &[10.0, 15.0]);
    }

    #[test]
    fn invalid_spec_fails_before_any_work() {
        let h = history_from_closes(&[1.0, 2.0]);
        let err = compute_indicators(&h, &[IndicatorSpec::Rsi, IndicatorSpec::Sma(0)]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidParameter { .. }));
    }

    #[test]
    fn macd_hist_is_exact_difference() {
        let closes: Vec<f64> = (0..80).map(|i| 50.0 + (i as f64 / 4.0).cos() * 3.0).collect();
        let out = compute_indicators(&history_from_closes(&closes), &[IndicatorSpec::Macd]).unwrap();
        let (m, s, hist) = (
            out.column("MACD").unwrap(),
            out.column("Signal").unwrap(),
            out.column("MACD_Hist").unwrap(),
        );
        for i in 0..closes.len() {
            assert!((hist[i] - (m[i] - s[i])).abs() < 1e-12);
        }
    }

    #[test]
    fn flat_series_rsi_is_100_after_first_bar() {
        let out = compute_indicators(&history_from_closes(&[7.0; 20]), &[IndicatorSpec::Rsi]).unwrap();
        let rsi = out.column("RSI").unwrap();
        assert!(rsi[0].is_nan());
        assert!(rsi[1..].iter().all(|&v| v == 100.0));
    }

    #[test]
    fn crossover_emits_one_golden_and_one_death() {
        // rises, falls, then rallies
        let closes = [
            10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 12.0, 9.0, 6.0, 3.0, 6.0, 10.0, 14.0, 18.0, 22.0,
        ];
        let h = history_from_closes(&closes);
        let out = compute_indicators(&h, &specs(&["CROSS_SMA_2_4"])).unwrap();
        let signals = out.column("CROSS_SMA_2_4").unwrap();

        let short = rolling_mean(&closes, 2).unwrap();
        let long = rolling_mean(&closes, 4).unwrap();
        let expected_up = (1..closes.len())
            .find(|&i| short[i - 1] < long[i - 1] && short[i] >= long[i])
            .unwrap();
        let expected_down = (1..closes.len())
            .find(|&i| short[i - 1] >= long[i - 1] && short[i] < long[i])
            .unwrap();

        assert_eq!(signals.iter().filter(|&&v| v == 1.0).count(), 1);
        assert_eq!(signals.iter().filter(|&&v| v == -1.0).count(), 1);
        assert_eq!(signals[expected_up], 1.0);
        assert_eq!(signals[expected_down], -1.0);
        // helper averages stay private
        assert!(out.column("SMA_2").is_none());
        assert!(out.column("SMA_4").is_none());
    }

    #[test]
    fn crossover_reuses_requested_columns() {
        let closes: Vec<f64> = (0..30).map(|i| (i as f64 / 3.0).sin() * 10.0 + 50.0).collect();
        let h = history_from_closes(&closes);
        let out = compute_indicators(&h, &specs(&["EMA_5", "EMA_10", "CROSS_EMA_5_10"])).unwrap();
        assert_eq!(out.indicators.len(), 3);
        let standalone = compute_indicators(&h, &specs(&["CROSS_EMA_5_10"])).unwrap();
        assert_eq!(out.column("CROSS_EMA_5_10"), standalone.column("CROSS_EMA_5_10"));
    }

    #[test]
    fn repeated_specs_are_computed_once() {
        let h = history_from_closes(&[1.0, 2.0, 3.0]);
        let out = compute_indicators(&h, &specs(&["SMA_2", "SMA_2", "RSI", "RSI"])).unwrap();
        assert_eq!(out.indicators.len(), 2);
    }

    #[test]
    fn compute_is_idempotent() {
        let h = PriceHistory::new(
            "IDEM",
            (0..25)
                .map(|i| {
                    let c = 100.0 + (i as f64).sqrt();
                    bar(i, c - 0.5, c + 1.0, c - 1.0, c)
                })
                .collect(),
        )
        .unwrap();
        let s = specs(&["SMA_5", "EMA_5", "ATR", "MACD", "RSI", "CROSS_SMA_3_8"]);
        let first = compute_indicators(&h, &s).unwrap();
        let second = compute_indicators(&h, &s).unwrap();
        // RSI[0] is NaN, so compare bit patterns rather than with ==.
        for ((n1, v1), (n2, v2)) in first.indicators.iter().zip(second.indicators.iter()) {
            assert_eq!(n1, n2);
            let b1: Vec<u64> = v1.iter().map(|v| v.to_bits()).collect();
            let b2: Vec<u64> = v2.iter().map(|v| v.to_bits()).collect();
            assert_eq!(b1, b2);
        }
        assert_eq!(first.history, h);
    }

    #[test]
    fn series_pairs_timestamps_with_values() {
        let h = history_from_closes(&[1.0, 3.0]);
        let out = compute_indicators(&h, &specs(&["SMA_2"])).unwrap();
        let series = out.series("SMA_2").unwrap();
        assert_eq!(series[0].0, h.bars()[0].timestamp);
        assert_eq!(series[1].1, 2.0);
        assert!(out.series("EMA_9").is_none());
    }

    #[test]
    fn empty_history_yields_empty_columns() {
        let h = PriceHistory::new("EMPTY", Vec::new()).unwrap();
        let out = compute_indicators(&h, &specs(&["SMA_20", "RSI", "MACD"])).unwrap();
        assert!(out.indicators.iter().all(|(_, v)| v.is_empty()));
    }
}
