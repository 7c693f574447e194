// =============================================================================
// Market Lens: analytics core for a financial dashboard
// =============================================================================
//
// Technical indicators over price histories and financial ratios over
// statement tables. Everything under `indicators` and `fundamentals` is pure;
// data sources, the cache and rendering sit around it.
// =============================================================================

pub mod error;
pub mod fundamentals;
pub mod indicators;
pub mod market_data;
pub mod report;
pub mod runtime_config;
pub mod symbols;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use fundamentals::{compute_ratios, Ratio, RatioGap, RatioSeries, StatementSet, StatementTable};
pub use indicators::{compute_indicators, EnrichedHistory, IndicatorSpec};
pub use market_data::{PriceBar, PriceHistory};
