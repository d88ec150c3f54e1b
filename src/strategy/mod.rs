//! Strategy Layer - Bollinger Band computation and candidate selection
//!
//! - `bollinger`: single-pass rolling average and band computation
//! - `trend`: trend and band-proximity predicates over a series tail
//! - `selector`: ordered rule evaluation across symbols
//! - `params`: window, factor and scan configuration

pub mod bollinger;
pub mod params;
pub mod selector;
pub mod trend;

pub use bollinger::{compute_bands, BandComputer};
pub use params::{AnalysisConfig, ParamsError, ScanMode, DEFAULT_NEAR_BAND_RATIO};
pub use selector::{Evaluation, Selection, Selector};
pub use trend::{TrendClassifier, TAIL_LEN};
