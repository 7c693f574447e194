use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use super::line_item::LineItem;
use crate::types::StatementKind;

/// Present-rate below which a line item is considered too sparse to show.
pub const DEFAULT_MIN_PRESENT: f64 = 0.5;

/// One financial statement: line item -> fiscal period end -> value.
///
/// Periods are kept in ascending date order regardless of the order the
/// provider delivered them in. Missing cells are simply absent; the period
/// itself is still registered so present-rates stay honest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementTable {
    kind: StatementKind,
    periods: BTreeSet<NaiveDate>,
    rows: IndexMap<LineItem, BTreeMap<NaiveDate, f64>>,
}

impl StatementTable {
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            periods: BTreeSet::new(),
            rows: IndexMap::new(),
        }
    }

    /// Build from the provider's `row name -> {date -> value|null}` layout.
    pub fn from_rows<I, C>(kind: StatementKind, rows: I) -> Self
    where
        I: IntoIterator<Item = (String, C)>,
        C: IntoIterator<Item = (NaiveDate, Option<f64>)>,
    {
        let mut table = Self::new(kind);
        for (name, cells) in rows {
            let item: LineItem = name.into();
            if !item.is_mapped() {
                debug!(kind = %kind, item = %item, "unmapped line item");
            }
            for (date, value) in cells {
                table.insert(item.clone(), date, value);
            }
        }
        table
    }

    /// Record one cell. `None` and non-finite values register the period
    /// but leave the cell empty.
    pub fn insert(&mut self, item: LineItem, period: NaiveDate, value: Option<f64>) {
        self.periods.insert(period);
        let row = self.rows.entry(item).or_default();
        if let Some(v) = value.filter(|v| v.is_finite()) {
            row.insert(period, v);
        }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Fiscal period ends, oldest first.
    pub fn periods(&self) -> Vec<NaiveDate> {
        self.periods.iter().copied().collect()
    }

    pub fn latest_period(&self) -> Option<NaiveDate> {
        self.periods.last().copied()
    }

    /// The period immediately before `period`, if the table has one.
    pub fn previous_period(&self, period: NaiveDate) -> Option<NaiveDate> {
        self.periods.range(..period).next_back().copied()
    }

    pub fn items(&self) -> impl Iterator<Item = &LineItem> {
        self.rows.keys()
    }

    pub fn contains(&self, item: &LineItem) -> bool {
        self.rows.get(item).is_some_and(|row| !row.is_empty())
    }

    pub fn value(&self, item: &LineItem, period: NaiveDate) -> Option<f64> {
        self.rows.get(item)?.get(&period).copied()
    }

    /// Row values aligned to [`periods`](Self::periods); `None` for gaps.
    pub fn row(&self, item: &LineItem) -> Vec<Option<f64>> {
        self.periods
            .iter()
            .map(|p| self.value(item, *p))
            .collect()
    }

    /// Fraction of the table's periods for which `item` has a value.
    pub fn present_rate(&self, item: &LineItem) -> f64 {
        if self.periods.is_empty() {
            return 0.0;
        }
        let present = self.rows.get(item).map_or(0, BTreeMap::len);
        present as f64 / self.periods.len() as f64
    }

    /// Copy of the table without line items whose present-rate is below
    /// `min_present`.
    pub fn drop_sparse_items(&self, min_present: f64) -> Self {
        let mut rows = IndexMap::with_capacity(self.rows.len());
        for (item, cells) in &self.rows {
            let rate = self.present_rate(item);
            if rate < min_present {
                debug!(kind = %self.kind, item = %item, rate, "dropping sparse line item");
                continue;
            }
            rows.insert(item.clone(), cells.clone());
        }
        Self {
            kind: self.kind,
            periods: self.periods.clone(),
            rows,
        }
    }

    /// Line items the dashboard has no mapping for.
    pub fn unmapped_items(&self) -> Vec<&LineItem> {
        self.rows.keys().filter(|item| !item.is_mapped()).collect()
    }
}

/// Fiscal periods present in every table, oldest first.
pub fn common_periods(tables: &[&StatementTable]) -> Vec<NaiveDate> {
    let Some((first, rest)) = tables.split_first() else {
        return Vec::new();
    };
    first
        .periods
        .iter()
        .filter(|p| rest.iter().all(|t| t.periods.contains(p)))
        .copied()
        .collect()
}
