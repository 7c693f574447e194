// =============================================================================
// Shared request types: look-back periods, bar intervals, statement kinds
// =============================================================================

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Look-back window of a price history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub const ALL: [Period; 11] = [
        Self::OneDay,
        Self::FiveDays,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
        Self::TwoYears,
        Self::FiveYears,
        Self::TenYears,
        Self::YearToDate,
        Self::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::FiveDays => "5d",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
            Self::TenYears => "10y",
            Self::YearToDate => "ytd",
            Self::Max => "max",
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Self::ThreeMonths
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| CoreError::invalid("period", format!("unknown period `{s}`")))
    }
}

/// Width of a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "2m")]
    TwoMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "60m")]
    SixtyMinutes,
    #[serde(rename = "90m")]
    NinetyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1wk")]
    OneWeek,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
}

impl Interval {
    /// All intervals, finest first.
    pub const ALL: [Interval; 13] = [
        Self::OneMinute,
        Self::TwoMinutes,
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::SixtyMinutes,
        Self::NinetyMinutes,
        Self::OneHour,
        Self::OneDay,
        Self::FiveDays,
        Self::OneWeek,
        Self::OneMonth,
        Self::ThreeMonths,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::TwoMinutes => "2m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::ThirtyMinutes => "30m",
            Self::SixtyMinutes => "60m",
            Self::NinetyMinutes => "90m",
            Self::OneHour => "1h",
            Self::OneDay => "1d",
            Self::FiveDays => "5d",
            Self::OneWeek => "1wk",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
        }
    }

    /// Intervals that may be requested for `period`.
    ///
    /// When the period token also names an interval (`1d`, `5d`, `1mo`,
    /// `3mo`) only the intervals listed strictly before it qualify, so a
    /// history always holds more than one bar. Longer periods allow every
    /// interval.
    pub fn allowed_for(period: Period) -> Vec<Interval> {
        match Self::ALL.iter().position(|i| i.as_str() == period.as_str()) {
            Some(idx) => Self::ALL[..idx].to_vec(),
            None => Self::ALL.to_vec(),
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::OneDay
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|i| i.as_str() == s.trim())
            .ok_or_else(|| CoreError::invalid("interval", format!("unknown interval `{s}`")))
    }
}

/// Reject an interval that is too coarse for the requested period.
pub fn validate_interval(period: Period, interval: Interval) -> Result<(), CoreError> {
    if Interval::allowed_for(period).contains(&interval) {
        Ok(())
    } else {
        Err(CoreError::invalid(
            "interval",
            format!("`{interval}` is not available for a `{period}` period"),
        ))
    }
}

/// Reporting cadence of a fundamentals table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PeriodType {
    #[default]
    Annual,
    Quarterly,
}

impl std::fmt::Display for PeriodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Annual => write!(f, "Annual"),
            Self::Quarterly => write!(f, "Quarterly"),
        }
    }
}

/// Which financial statement a table holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Balance,
    Income,
    Cashflow,
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Balance => write!(f, "balance"),
            Self::Income => write!(f, "income"),
            Self::Cashflow => write!(f, "cashflow"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_round_trips_through_str() {
        for p in Period::ALL {
            assert_eq!(p.as_str().parse::<Period>().unwrap(), p);
        }
        assert!("2w".parse::<Period>().is_err());
    }

    #[test]
    fn interval_round_trips_through_str() {
        for i in Interval::ALL {
            assert_eq!(i.as_str().parse::<Interval>().unwrap(), i);
        }
        assert!("7m".parse::<Interval>().is_err());
    }

    #[test]
    fn one_month_period_excludes_monthly_and_coarser() {
        let allowed = Interval::allowed_for(Period::OneMonth);
        assert_eq!(allowed.last(), Some(&Interval::OneWeek));
        assert!(!allowed.contains(&Interval::OneMonth));
        assert!(!allowed.contains(&Interval::ThreeMonths));
    }

    #[test]
    fn one_day_period_allows_intraday_only() {
        let allowed = Interval::allowed_for(Period::OneDay);
        assert_eq!(allowed.len(), 8);
        assert_eq!(allowed.last(), Some(&Interval::OneHour));
    }

    #[test]
    fn long_periods_allow_everything() {
        assert_eq!(Interval::allowed_for(Period::Max).len(), Interval::ALL.len());
        assert_eq!(Interval::allowed_for(Period::YearToDate).len(), Interval::ALL.len());
    }

    #[test]
    fn validate_interval_rejects_coarse_pairs() {
        assert!(validate_interval(Period::ThreeMonths, Interval::OneDay).is_ok());
        let err = validate_interval(Period::FiveDays, Interval::OneWeek).unwrap_err();
        assert!(matches!(err, CoreError::InvalidParameter { .. }));
    }

    #[test]
    fn serde_uses_short_tokens() {
        let json = serde_json::to_string(&(Period::OneYear, Interval::OneWeek)).unwrap();
        assert_eq!(json, r#"["1y","1wk"]"#);
    }
}
