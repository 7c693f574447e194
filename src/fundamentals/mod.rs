// =============================================================================
// Fundamentals Module
// =============================================================================
//
// Statement tables keyed by typed line items, and the ratio engine that joins
// them on fiscal period end.

pub mod line_item;
pub mod ratios;
pub mod statement;

pub use line_item::LineItem;
pub use ratios::{compute_ratio, compute_ratios, Ratio, RatioGap, RatioSeries, StatementSet};
pub use statement::{common_periods, StatementTable, DEFAULT_MIN_PRESENT};
