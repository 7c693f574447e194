use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use tracing::{debug, info};

use super::price_history::PriceHistory;
use super::quote::QuoteSnapshot;
use super::source::MarketDataSource;
use crate::fundamentals::StatementTable;
use crate::types::{Interval, Period, PeriodType, StatementKind};

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Identifies one cached price history.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct HistoryKey {
    pub symbol: String,
    pub period: Period,
    pub interval: Interval,
}

impl std::fmt::Display for HistoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}/{}", self.symbol, self.period, self.interval)
    }
}

/// Identifies one cached statement table.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct StatementKey {
    pub symbol: String,
    pub kind: StatementKind,
    pub period_type: PeriodType,
}

impl std::fmt::Display for StatementKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}/{}", self.symbol, self.kind, self.period_type)
    }
}

// ---------------------------------------------------------------------------
// CachedSource -- memoising wrapper around any data source
// ---------------------------------------------------------------------------

/// Thread-safe memo of every fetch, keyed by the exact call arguments.
///
/// Entries live until [`refresh`](Self::refresh) drops them all. Failed
/// fetches are not cached, so a retry goes back to the source.
pub struct CachedSource<S> {
    inner: S,
    histories: RwLock<HashMap<HistoryKey, Arc<PriceHistory>>>,
    statements: RwLock<HashMap<StatementKey, Arc<StatementTable>>>,
    quotes: RwLock<HashMap<String, Arc<QuoteSnapshot>>>,
}

impl<S: MarketDataSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            histories: RwLock::new(HashMap::new()),
            statements: RwLock::new(HashMap::new()),
            quotes: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn price_history(&self, symbol: &str, period: Period, interval: Interval) -> Result<Arc<PriceHistory>> {
        let key = HistoryKey {
            symbol: symbol.to_uppercase(),
            period,
            interval,
        };
        memoise(&self.histories, key, |k| {
            self.inner.price_history(&k.symbol, k.period, k.interval)
        })
    }

    pub fn statement(
        &self,
        symbol: &str,
        kind: StatementKind,
        period_type: PeriodType,
    ) -> Result<Arc<StatementTable>> {
        let key = StatementKey {
            symbol: symbol.to_uppercase(),
            kind,
            period_type,
        };
        memoise(&self.statements, key, |k| {
            self.inner.statement(&k.symbol, k.kind, k.period_type)
        })
    }

    pub fn quote(&self, symbol: &str) -> Result<Arc<QuoteSnapshot>> {
        memoise(&self.quotes, symbol.to_uppercase(), |k| self.inner.quote(k))
    }

    /// Drop every cached entry (the dashboard's "refresh all" action).
    pub fn refresh(&self) {
        let dropped = self.len();
        self.histories.write().clear();
        self.statements.write().clear();
        self.quotes.write().clear();
        info!(dropped, "market data cache cleared");
    }

    /// Total number of cached entries across all three maps.
    pub fn len(&self) -> usize {
        self.histories.read().len() + self.statements.read().len() + self.quotes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn memoise<K, V>(map: &RwLock<HashMap<K, Arc<V>>>, key: K, fetch: impl FnOnce(&K) -> Result<V>) -> Result<Arc<V>>
where
    K: Hash + Eq + std::fmt::Display,
{
    if let Some(hit) = map.read().get(&key) {
        debug!(key = %key, "cache hit");
        return Ok(Arc::clone(hit));
    }

    debug!(key = %key, "cache miss");
    // Fetch without holding the lock; if two callers race, the first insert wins.
    let value = Arc::new(fetch(&key)?);
    let mut guard = map.write();
    Ok(Arc::clone(guard.entry(key).or_insert(value)))
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::bail;

    use super::*;
    use crate::market_data::price_history::test_support::history_from_closes;
    use crate::market_data::QuoteType;

    /// Counts calls and fails for the symbol "FAIL".
    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl MarketDataSource for CountingSource {
        fn price_history(&self, symbol: &str, _: Period, _: Interval) -> Result<PriceHistory> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if symbol == "FAIL" {
                bail!("no data for {symbol}");
            }
            Ok(history_from_closes(&[1.0, 2.0, 3.0]))
        }

        fn statement(&self, _: &str, kind: StatementKind, _: PeriodType) -> Result<StatementTable> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(StatementTable::new(kind))
        }

        fn quote(&self, _: &str) -> Result<QuoteSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(QuoteSnapshot {
                previous_close: 1.0,
                day_high: 1.0,
                day_low: 1.0,
                volume: None,
                current_price: 1.0,
                currency: None,
                quote_type: QuoteType::Equity,
            })
        }
    }

    #[test]
    fn second_call_is_served_from_cache() {
        let cache = CachedSource::new(CountingSource::default());
        let a = cache.price_history("msft", Period::OneYear, Interval::OneDay).unwrap();
        let b = cache.price_history("MSFT", Period::OneYear, Interval::OneDay).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.inner().calls(), 1);
    }

    #[test]
    fn different_arguments_are_different_entries() {
        let cache = CachedSource::new(CountingSource::default());
        cache.price_history("MSFT", Period::OneYear, Interval::OneDay).unwrap();
        cache.price_history("MSFT", Period::OneYear, Interval::OneWeek).unwrap();
        cache.statement("MSFT", StatementKind::Balance, PeriodType::Annual).unwrap();
        cache.statement("MSFT", StatementKind::Balance, PeriodType::Quarterly).unwrap();
        cache.quote("MSFT").unwrap();
        assert_eq!(cache.inner().calls(), 5);
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn refresh_forces_refetch() {
        let cache = CachedSource::new(CountingSource::default());
        cache.quote("SPY").unwrap();
        cache.refresh();
        assert!(cache.is_empty());
        cache.quote("SPY").unwrap();
        assert_eq!(cache.inner().calls(), 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = CachedSource::new(CountingSource::default());
        assert!(cache.price_history("FAIL", Period::OneYear, Interval::OneDay).is_err());
        assert!(cache.price_history("FAIL", Period::OneYear, Interval::OneDay).is_err());
        assert_eq!(cache.inner().calls(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn shared_across_threads() {
        let cache = Arc::new(CachedSource::new(CountingSource::default()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache.price_history("QQQ", Period::FiveYears, Interval::OneWeek).unwrap().len()
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 3);
        }
        assert_eq!(cache.len(), 1);
    }
}
