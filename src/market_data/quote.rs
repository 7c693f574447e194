use serde::{Deserialize, Serialize};

/// Latest quote summary for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub previous_close: f64,
    pub day_high: f64,
    pub day_low: f64,
    #[serde(default)]
    pub volume: Option<f64>,
    pub current_price: f64,
    #[serde(default)]
    pub currency: Option<String>,
    pub quote_type: QuoteType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuoteType {
    Equity,
    Etf,
    Currency,
    Cryptocurrency,
    Future,
    Index,
    MutualFund,
}

impl QuoteSnapshot {
    /// Absolute move since the previous close.
    pub fn change(&self) -> f64 {
        self.current_price - self.previous_close
    }

    /// Percentage move since the previous close.
    pub fn change_pct(&self) -> Option<f64> {
        if self.previous_close == 0.0 {
            return None;
        }
        let pct = self.change() / self.previous_close * 100.0;
        pct.is_finite().then_some(pct)
    }
}
