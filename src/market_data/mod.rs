// =============================================================================
// Market Data Module
// =============================================================================
//
// Price histories, quote snapshots and the sources that supply them. The
// engines only ever see the immutable `PriceHistory`; sources and the cache
// live at the edge.

pub mod cache;
pub mod price_history;
pub mod quote;
pub mod source;

pub use cache::{CachedSource, HistoryKey, StatementKey};
pub use price_history::{PriceBar, PriceHistory};
pub use quote::{QuoteSnapshot, QuoteType};
pub use source::{FixtureSource, MarketDataSource};
