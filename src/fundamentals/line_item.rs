// =============================================================================
// Statement line items
// =============================================================================
//
// Providers label rows with human-readable names ("Current Assets", ...).
// Known rows map to a variant; anything else lands in `Unmapped` so a renamed
// or exotic row is carried through instead of silently vanishing.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LineItem {
    // Balance sheet
    TotalAssets,
    CurrentAssets,
    CashAndCashEquivalents,
    CurrentLiabilities,
    TotalLiabilitiesNetMinorityInterest,
    StockholdersEquity,
    TotalDebt,
    OrdinarySharesNumber,
    // Income statement
    TotalRevenue,
    GrossProfit,
    OperatingIncome,
    NetIncome,
    NetIncomeCommonStockholders,
    DilutedAverageShares,
    BasicAverageShares,
    DilutedEps,
    // Cash flow
    OperatingCashFlow,
    InvestingCashFlow,
    FinancingCashFlow,
    CapitalExpenditure,
    FreeCashFlow,
    /// A row the dashboard has no mapping for, keyed by its provider name.
    Unmapped(String),
}

const KNOWN: [(LineItem, &str); 21] = [
    (LineItem::TotalAssets, "Total Assets"),
    (LineItem::CurrentAssets, "Current Assets"),
    (LineItem::CashAndCashEquivalents, "Cash And Cash Equivalents"),
    (LineItem::CurrentLiabilities, "Current Liabilities"),
    (
        LineItem::TotalLiabilitiesNetMinorityInterest,
        "Total Liabilities Net Minority Interest",
    ),
    (LineItem::StockholdersEquity, "Stockholders Equity"),
    (LineItem::TotalDebt, "Total Debt"),
    (LineItem::OrdinarySharesNumber, "Ordinary Shares Number"),
    (LineItem::TotalRevenue, "Total Revenue"),
    (LineItem::GrossProfit, "Gross Profit"),
    (LineItem::OperatingIncome, "Operating Income"),
    (LineItem::NetIncome, "Net Income"),
    (
        LineItem::NetIncomeCommonStockholders,
        "Net Income Common Stockholders",
    ),
    (LineItem::DilutedAverageShares, "Diluted Average Shares"),
    (LineItem::BasicAverageShares, "Basic Average Shares"),
    (LineItem::DilutedEps, "Diluted EPS"),
    (LineItem::OperatingCashFlow, "Operating Cash Flow"),
    (LineItem::InvestingCashFlow, "Investing Cash Flow"),
    (LineItem::FinancingCashFlow, "Financing Cash Flow"),
    (LineItem::CapitalExpenditure, "Capital Expenditure"),
    (LineItem::FreeCashFlow, "Free Cash Flow"),
];

impl LineItem {
    /// Provider-facing row name.
    pub fn name(&self) -> &str {
        if let Self::Unmapped(name) = self {
            return name;
        }
        KNOWN
            .iter()
            .find(|(item, _)| item == self)
            .map(|(_, name)| *name)
            .unwrap_or_default()
    }

    pub fn is_mapped(&self) -> bool {
        !matches!(self, Self::Unmapped(_))
    }
}

impl FromStr for LineItem {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(KNOWN
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(trimmed))
            .map(|(item, _)| item.clone())
            .unwrap_or_else(|| Self::Unmapped(trimmed.to_string())))
    }
}

impl From<String> for LineItem {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(item) => item,
            Err(never) => match never {},
        }
    }
}

impl From<LineItem> for String {
    fn from(item: LineItem) -> Self {
        item.name().to_string()
    }
}

impl std::fmt::Display for LineItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
