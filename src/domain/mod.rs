//! Domain Layer - Core types for band analysis
//!
//! Pure data types with no I/O. External interactions happen
//! through the ports layer.
//!
//! - `observation`: daily closes, bands, annotated series
//! - `verdict`: band rules, verdicts and the best-candidate record
//! - `calendar`: trading-day date ranges
//! - `error`: precondition failures shared by the strategy layer

pub mod calendar;
pub mod error;
pub mod observation;
pub mod verdict;

pub use calendar::{is_weekend, last_trading_day, trading_range, TradingRange, DEFAULT_LOOKBACK_MULTIPLIER};
pub use error::AnalysisError;
pub use observation::{AnnotatedObservation, Bands, Observation, Series};
pub use verdict::{Candidate, Rule, Verdict};
