// =============================================================================
// Market data sources
// =============================================================================
//
// The engines never fetch anything themselves. Whatever feeds them implements
// `MarketDataSource`; `FixtureSource` reads JSON snapshots from disk laid out
// as
//
//   <data_dir>/<SYMBOL>/history_<period>_<interval>.json
//   <data_dir>/<SYMBOL>/<balance|income|cashflow>_<annual|quarterly>.json
//   <data_dir>/<SYMBOL>/quote.json
// =============================================================================

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::price_history::{PriceBar, PriceHistory};
use super::quote::QuoteSnapshot;
use crate::fundamentals::StatementTable;
use crate::types::{validate_interval, Interval, Period, PeriodType, StatementKind};

/// Anything that can hand out histories, statements and quotes.
pub trait MarketDataSource: Send + Sync {
    fn price_history(&self, symbol: &str, period: Period, interval: Interval) -> Result<PriceHistory>;

    fn statement(&self, symbol: &str, kind: StatementKind, period_type: PeriodType) -> Result<StatementTable>;

    fn quote(&self, symbol: &str) -> Result<QuoteSnapshot>;
}

/// Reads snapshots written under a data directory.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    root: PathBuf,
}

impl FixtureSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn symbol_dir(&self, symbol: &str) -> PathBuf {
        self.root.join(symbol.to_uppercase())
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}

/// Fixture files store the bars only; the symbol comes from the directory.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum HistoryFile {
    Bars(Vec<PriceBar>),
    Full(PriceHistory),
}

impl MarketDataSource for FixtureSource {
    fn price_history(&self, symbol: &str, period: Period, interval: Interval) -> Result<PriceHistory> {
        validate_interval(period, interval)?;

        let path = self
            .symbol_dir(symbol)
            .join(format!("history_{period}_{interval}.json"));
        let history = match Self::read_json::<HistoryFile>(&path)? {
            HistoryFile::Bars(bars) => PriceHistory::new(symbol.to_uppercase(), bars)
                .with_context(|| format!("bad bars in {}", path.display()))?,
            HistoryFile::Full(history) => history,
        };

        debug!(symbol, %period, %interval, bars = history.len(), "history loaded");
        Ok(history)
    }

    fn statement(&self, symbol: &str, kind: StatementKind, period_type: PeriodType) -> Result<StatementTable> {
        let cadence = match period_type {
            PeriodType::Annual => "annual",
            PeriodType::Quarterly => "quarterly",
        };
        let path = self.symbol_dir(symbol).join(format!("{kind}_{cadence}.json"));
        let rows: BTreeMap<String, BTreeMap<NaiveDate, Option<f64>>> = Self::read_json(&path)?;

        let table = StatementTable::from_rows(kind, rows);
        debug!(
            symbol,
            %kind,
            %period_type,
            items = table.items().count(),
            unmapped = table.unmapped_items().len(),
            periods = table.periods().len(),
            "statement loaded"
        );
        Ok(table)
    }

    fn quote(&self, symbol: &str) -> Result<QuoteSnapshot> {
        Self::read_json(&self.symbol_dir(symbol).join("quote.json"))
    }
}
