// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free series math plus the engine that maps indicator
// specs onto named columns. Every output series is aligned one-to-one with
// its input; undefined positions hold NaN rather than being dropped.

pub mod atr;
pub mod crossover;
pub mod ema;
pub mod engine;
pub mod macd;
pub mod performance;
pub mod rsi;
pub mod sma;

pub use atr::{average_true_range, true_range};
pub use crossover::{detect_crossovers, CrossSignal};
pub use ema::ewm_mean;
pub use engine::{
    compute_indicators, expand_time_span, parse_specs, EnrichedHistory, IndicatorSet, IndicatorSpec,
    MaKind,
};
pub use macd::{macd, MacdLines};
pub use performance::{bar_direction, compare_securities, relative_change, BarDirection};
pub use rsi::relative_strength_index;
pub use sma::rolling_mean;
