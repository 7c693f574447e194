use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV bar as delivered by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Forex pairs and some indices carry no volume.
    #[serde(default)]
    pub volume: Option<f64>,
}

/// Ordered, immutable bar history for one symbol.
///
/// Timestamps are strictly increasing. The engines read from it and build
/// new columns next to it; nothing mutates the bars once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPriceHistory")]
pub struct PriceHistory {
    symbol: String,
    bars: Vec<PriceBar>,
}

#[derive(Deserialize)]
struct RawPriceHistory {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl TryFrom<RawPriceHistory> for PriceHistory {
    type Error = CoreError;

    fn try_from(raw: RawPriceHistory) -> Result<Self, Self::Error> {
        Self::new(raw.symbol, raw.bars)
    }
}

impl PriceHistory {
    /// Build a history, rejecting out-of-order or duplicate timestamps.
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, CoreError> {
        if let Some(pos) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(CoreError::invalid(
                "bars",
                format!(
                    "timestamps must be strictly increasing (bar {} at {})",
                    pos + 1,
                    bars[pos + 1].timestamp
                ),
            ));
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Volumes, `NaN` where the bar has none.
    pub fn volumes(&self) -> Vec<f64> {
        self.bars
            .iter()
            .map(|b| b.volume.unwrap_or(f64::NAN))
            .collect()
    }

    pub fn has_volume(&self) -> bool {
        self.bars.iter().any(|b| b.volume.is_some())
    }

    /// Copy of this history with the volume column removed.
    pub fn without_volume(&self) -> Self {
        Self {
            symbol: self.symbol.clone(),
            bars: self
                .bars
                .iter()
                .map(|b| PriceBar { volume: None, ..b.clone() })
                .collect(),
        }
    }
}
