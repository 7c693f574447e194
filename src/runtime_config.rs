// =============================================================================
// Dashboard Configuration
// =============================================================================
//
// What the dashboard shows: which securities, over which period and bar
// width, with which indicators and ratios. Every field carries a serde
// default so a partial (or empty) JSON file still loads.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::fundamentals::Ratio;
use crate::indicators::{expand_time_span, parse_specs, IndicatorSpec};
use crate::symbols::{forex_symbol, parse_symbol_list};
use crate::types::{validate_interval, Interval, Period, PeriodType};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_symbols() -> Vec<String> {
    vec!["MSFT".to_string()]
}

fn default_indicators() -> Vec<String> {
    vec!["SMA_X".to_string(), "RSI".to_string()]
}

fn default_time_span() -> usize {
    30
}

fn default_ratios() -> Vec<String> {
    Ratio::ALL.iter().map(|r| r.label().to_string()).collect()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

// =============================================================================
// DashboardConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    // --- Securities ---------------------------------------------------------

    /// Ticker symbols; more than one switches to the comparison chart.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    #[serde(default)]
    pub period: Period,

    #[serde(default)]
    pub interval: Interval,

    /// Optional currency pair, e.g. `EUR` / `USD`, appended to `symbols`.
    #[serde(default)]
    pub base_currency: Option<String>,

    #[serde(default)]
    pub counter_currency: Option<String>,

    // --- Technical analysis -------------------------------------------------

    /// Indicator tokens such as `SMA_20`, `SMA_X`, `RSI`, `CROSS_SMA_20_50`.
    #[serde(default = "default_indicators")]
    pub indicators: Vec<String>,

    /// Window substituted for the `X` placeholder in indicator tokens.
    #[serde(default = "default_time_span")]
    pub time_span: usize,

    #[serde(default = "default_true")]
    pub show_volume: bool,

    // --- Fundamentals -------------------------------------------------------

    #[serde(default)]
    pub period_type: PeriodType,

    /// Ratio labels ("Current Ratio", "P/E", ...).
    #[serde(default = "default_ratios")]
    pub ratios: Vec<String>,

    // --- Data ---------------------------------------------------------------

    /// Root of the JSON snapshots read by the fixture source.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            period: Period::default(),
            interval: Interval::default(),
            base_currency: None,
            counter_currency: None,
            indicators: default_indicators(),
            time_span: default_time_span(),
            show_volume: true,
            period_type: PeriodType::default(),
            ratios: default_ratios(),
            data_dir: default_data_dir(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dashboard config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse dashboard config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = ?config.symbols,
            period = %config.period,
            interval = %config.interval,
            "dashboard config loaded"
        );

        Ok(config)
    }

    /// Replace the symbol list from a comma-separated string.
    pub fn override_symbols(&mut self, raw: &str) {
        let symbols = parse_symbol_list(raw);
        if !symbols.is_empty() {
            self.symbols = symbols;
        }
    }

    /// Provider symbol of the configured currency pair, if any.
    pub fn forex_pair(&self) -> CoreResult<Option<String>> {
        match (&self.base_currency, &self.counter_currency) {
            (Some(base), Some(counter)) => forex_symbol(base, counter).map(Some),
            (None, None) => Ok(None),
            _ => Err(CoreError::invalid(
                "currency",
                "base_currency and counter_currency must be set together",
            )),
        }
    }

    /// Normalised symbol list: upper-cased, de-duplicated and capped, with
    /// the currency pair last.
    pub fn symbol_list(&self) -> CoreResult<Vec<String>> {
        let mut raw = self.symbols.join(",");
        if let Some(pair) = self.forex_pair()? {
            raw.push(',');
            raw.push_str(&pair);
        }
        Ok(parse_symbol_list(&raw))
    }

    /// Indicator specs with `time_span` substituted for `X`.
    pub fn indicator_specs(&self) -> CoreResult<Vec<IndicatorSpec>> {
        parse_specs(&expand_time_span(&self.indicators, self.time_span))
    }

    pub fn ratio_list(&self) -> CoreResult<Vec<Ratio>> {
        self.ratios.iter().map(|r| r.parse()).collect()
    }

    /// Check everything the dashboard will ask of the engines up front.
    pub fn validate(&self) -> CoreResult<()> {
        validate_interval(self.period, self.interval)?;
        self.forex_pair()?;
        self.indicator_specs()?;
        self.ratio_list()?;
        Ok(())
    }
}
