// =============================================================================
// Financial Ratio Engine
// =============================================================================
//
// Derives per-period ratios from balance sheet, income statement and cash
// flow tables. Each ratio reads only the statements it needs and evaluates
// the fiscal periods they share (inner join on period end).
//
// A period whose inputs are missing, or whose denominator is zero, is left
// out of the series and recorded as a `RatioGap`. Gaps never abort the
// series and are never turned into zeros.
// =============================================================================

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::line_item::LineItem;
use super::statement::{common_periods, StatementTable};
use crate::error::CoreError;
use crate::types::StatementKind;

// ---------------------------------------------------------------------------
// Ratio catalogue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ratio {
    CurrentRatio,
    DebtToEquity,
    NetMargin,
    Eps,
    PriceToEarnings,
    ReturnOnEquity,
    OperatingCashFlowRatio,
    PriceToCashFlow,
}

impl Ratio {
    pub const ALL: [Ratio; 8] = [
        Self::CurrentRatio,
        Self::DebtToEquity,
        Self::NetMargin,
        Self::Eps,
        Self::PriceToEarnings,
        Self::ReturnOnEquity,
        Self::OperatingCashFlowRatio,
        Self::PriceToCashFlow,
    ];

    /// Display label, also accepted by `FromStr`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CurrentRatio => "Current Ratio",
            Self::DebtToEquity => "Debt to Equity",
            Self::NetMargin => "Net Margin",
            Self::Eps => "EPS",
            Self::PriceToEarnings => "P/E",
            Self::ReturnOnEquity => "ROE",
            Self::OperatingCashFlowRatio => "Operating Cash Flow Ratio",
            Self::PriceToCashFlow => "P/CF",
        }
    }

    /// Statements that must all be present, and whose periods are joined.
    pub fn statements(&self) -> &'static [StatementKind] {
        use StatementKind::*;
        match self {
            Self::CurrentRatio | Self::DebtToEquity => &[Balance],
            Self::NetMargin | Self::Eps | Self::PriceToEarnings => &[Income],
            Self::ReturnOnEquity => &[Balance, Income],
            Self::OperatingCashFlowRatio => &[Balance, Cashflow],
            Self::PriceToCashFlow => &[Cashflow, Income],
        }
    }

    /// Valuation ratios divide the current market price and are only
    /// evaluated for the latest shared period.
    pub fn needs_price(&self) -> bool {
        matches!(self, Self::PriceToEarnings | Self::PriceToCashFlow)
    }
}

impl std::fmt::Display for Ratio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Ratio {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|r| {
                r.label().eq_ignore_ascii_case(wanted)
                    || format!("{r:?}").eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| CoreError::invalid("ratio", format!("unknown ratio `{s}`")))
    }
}

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// Statements for one company and period type, plus the current price for
/// valuation ratios.
#[derive(Debug, Clone, Default)]
pub struct StatementSet {
    pub balance: Option<StatementTable>,
    pub income: Option<StatementTable>,
    pub cashflow: Option<StatementTable>,
    pub market_price: Option<f64>,
}

impl StatementSet {
    pub fn table(&self, kind: StatementKind) -> Option<&StatementTable> {
        match kind {
            StatementKind::Balance => self.balance.as_ref(),
            StatementKind::Income => self.income.as_ref(),
            StatementKind::Cashflow => self.cashflow.as_ref(),
        }
    }
}

/// Why a ratio has no value for a period (or at all).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RatioGap {
    /// A statement the ratio reads was not supplied.
    MissingStatement { kind: StatementKind },
    /// The joined statements share no fiscal period.
    InsufficientJoin,
    /// A valuation ratio was requested without a market price.
    MissingPrice,
    MissingLineItem { period: NaiveDate, item: LineItem },
    ZeroDenominator { period: NaiveDate },
}

/// One ratio over fiscal period ends, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioSeries {
    pub ratio: Ratio,
    pub values: BTreeMap<NaiveDate, f64>,
    pub gaps: Vec<RatioGap>,
}

impl RatioSeries {
    fn empty(ratio: Ratio) -> Self {
        Self {
            ratio,
            values: BTreeMap::new(),
            gaps: Vec::new(),
        }
    }

    pub fn get(&self, period: NaiveDate) -> Option<f64> {
        self.values.get(&period).copied()
    }

    pub fn periods(&self) -> Vec<NaiveDate> {
        self.values.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Compute every requested ratio. Duplicate requests collapse into one entry;
/// output order follows first request order.
pub fn compute_ratios(statements: &StatementSet, requests: &[Ratio]) -> IndexMap<Ratio, RatioSeries> {
    let mut out = IndexMap::with_capacity(requests.len());
    for &ratio in requests {
        if out.contains_key(&ratio) {
            continue;
        }
        let series = compute_ratio(statements, ratio);
        debug!(
            ratio = %ratio,
            values = series.values.len(),
            gaps = series.gaps.len(),
            "ratio computed"
        );
        out.insert(ratio, series);
    }
    out
}

/// Compute a single ratio series.
pub fn compute_ratio(statements: &StatementSet, ratio: Ratio) -> RatioSeries {
    let mut series = RatioSeries::empty(ratio);

    let mut tables = Vec::with_capacity(ratio.statements().len());
    for &kind in ratio.statements() {
        match statements.table(kind) {
            Some(t) => tables.push(t),
            None => {
                series.gaps.push(RatioGap::MissingStatement { kind });
                return series;
            }
        }
    }

    let mut periods = common_periods(&tables);
    if periods.is_empty() {
        debug!(ratio = %ratio, "no overlapping fiscal periods");
        series.gaps.push(RatioGap::InsufficientJoin);
        return series;
    }

    if ratio.needs_price() {
        if statements.market_price.filter(|p| p.is_finite()).is_none() {
            series.gaps.push(RatioGap::MissingPrice);
            return series;
        }
        if let Some(&latest) = periods.last() {
            periods = vec![latest];
        }
    }

    for period in periods {
        match evaluate(statements, ratio, period) {
            Ok(v) => {
                series.values.insert(period, v);
            }
            Err(gap) => {
                debug!(ratio = %ratio, %period, ?gap, "ratio value omitted");
                series.gaps.push(gap);
            }
        }
    }
    series
}

fn evaluate(s: &StatementSet, ratio: Ratio, period: NaiveDate) -> Result<f64, RatioGap> {
    // Presence of every table was checked by the caller.
    let balance = || s.balance.as_ref();
    let income = || s.income.as_ref();
    let cashflow = || s.cashflow.as_ref();

    match ratio {
        Ratio::CurrentRatio => {
            let assets = item(balance(), LineItem::CurrentAssets, period)?;
            let liabilities = item(balance(), LineItem::CurrentLiabilities, period)?;
            divide(assets, liabilities, period)
        }
        Ratio::DebtToEquity => {
            let liabilities = item(balance(), LineItem::TotalLiabilitiesNetMinorityInterest, period)?;
            let equity = item(balance(), LineItem::StockholdersEquity, period)?;
            divide(liabilities, equity, period)
        }
        Ratio::NetMargin => {
            let net_income = item(income(), LineItem::NetIncome, period)?;
            let revenue = item(income(), LineItem::TotalRevenue, period)?;
            divide(net_income, revenue, period)
        }
        Ratio::Eps => eps(income(), period),
        Ratio::PriceToEarnings => {
            let eps = eps(income(), period)?;
            divide(s.market_price.unwrap_or(f64::NAN), eps, period)
        }
        Ratio::ReturnOnEquity => {
            let net_income = item(income(), LineItem::NetIncome, period)?;
            let equity = average_equity(balance(), period)?;
            divide(net_income, equity, period)
        }
        Ratio::OperatingCashFlowRatio => {
            let ocf = item(cashflow(), LineItem::OperatingCashFlow, period)?;
            let liabilities = item(balance(), LineItem::CurrentLiabilities, period)?;
            divide(ocf, liabilities, period)
        }
        Ratio::PriceToCashFlow => {
            let ocf = item(cashflow(), LineItem::OperatingCashFlow, period)?;
            let shares = share_count(income(), period)?;
            let per_share = divide(ocf, shares, period)?;
            divide(s.market_price.unwrap_or(f64::NAN), per_share, period)
        }
    }
}

fn item(table: Option<&StatementTable>, item: LineItem, period: NaiveDate) -> Result<f64, RatioGap> {
    table
        .and_then(|t| t.value(&item, period))
        .ok_or(RatioGap::MissingLineItem { period, item })
}

fn divide(numerator: f64, denominator: f64, period: NaiveDate) -> Result<f64, RatioGap> {
    if denominator == 0.0 {
        return Err(RatioGap::ZeroDenominator { period });
    }
    let v = numerator / denominator;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(RatioGap::ZeroDenominator { period })
    }
}

/// Diluted weighted share count, falling back to basic.
fn share_count(income: Option<&StatementTable>, period: NaiveDate) -> Result<f64, RatioGap> {
    item(income, LineItem::DilutedAverageShares, period)
        .or_else(|_| item(income, LineItem::BasicAverageShares, period))
        .map_err(|_| RatioGap::MissingLineItem {
            period,
            item: LineItem::DilutedAverageShares,
        })
}

fn eps(income: Option<&StatementTable>, period: NaiveDate) -> Result<f64, RatioGap> {
    let earnings = item(income, LineItem::NetIncomeCommonStockholders, period)?;
    let shares = share_count(income, period)?;
    divide(earnings, shares, period)
}

/// Mean of opening and closing equity. Opening equity is the balance sheet's
/// previous period end; without one, closing equity is used alone.
fn average_equity(balance: Option<&StatementTable>, period: NaiveDate) -> Result<f64, RatioGap> {
    let closing = item(balance, LineItem::StockholdersEquity, period)?;
    let opening = balance
        .and_then(|t| t.previous_period(period))
        .and_then(|prev| balance.and_then(|t| t.value(&LineItem::StockholdersEquity, prev)));
    Ok(match opening {
        Some(open) => (open + closing) / 2.0,
        None => closing,
    })
}
