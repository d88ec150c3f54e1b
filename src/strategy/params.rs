//! Analysis Parameters
//!
//! Configuration structs for band computation and candidate selection.
//! Defaults are the classic 20-day, 2-sigma bands.

use serde::{Deserialize, Serialize};

/// Fraction of a band value a close may sit from it and still count as "near"
pub const DEFAULT_NEAR_BAND_RATIO: f64 = 0.10;

/// How far the selector scans once a rule fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Stop at the first symbol for which any rule fires.
    /// Only that symbol can ever be picked.
    #[default]
    FirstVerdict,
    /// Visit every symbol; avoided symbols are skipped, not terminal.
    ScanAll,
}

/// Main analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Rolling window length in trading days
    pub periods: usize,
    /// Band multiplier applied to the standard deviation
    pub factor: f64,
    /// Selector scan behaviour
    pub scan_mode: ScanMode,
    /// Proximity threshold for the near-band predicates
    pub near_band_ratio: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            periods: 20,
            factor: 2.0,
            scan_mode: ScanMode::FirstVerdict,
            near_band_ratio: DEFAULT_NEAR_BAND_RATIO,
        }
    }
}

impl AnalysisConfig {
    /// Create a new config with a custom window length
    pub fn with_periods(mut self, periods: usize) -> Self {
        self.periods = periods;
        self
    }

    /// Create a new config with a custom band multiplier
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    pub fn with_scan_mode(mut self, mode: ScanMode) -> Self {
        self.scan_mode = mode;
        self
    }

    pub fn with_near_band_ratio(mut self, ratio: f64) -> Self {
        self.near_band_ratio = ratio;
        self
    }

    /// Minimum series length the classifier can work with
    pub fn min_series_len(&self) -> usize {
        self.periods + 2
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.periods == 0 {
            return Err(ParamsError::InvalidPeriods(self.periods));
        }
        if !self.factor.is_finite() || self.factor < 0.0 {
            return Err(ParamsError::InvalidFactor(self.factor));
        }
        if !(self.near_band_ratio > 0.0 && self.near_band_ratio < 1.0) {
            return Err(ParamsError::InvalidNearBandRatio(self.near_band_ratio));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParamsError {
    #[error("Invalid periods: {0} (must be > 0)")]
    InvalidPeriods(usize),
    #[error("Invalid band factor: {0} (must be finite and >= 0)")]
    InvalidFactor(f64),
    #[error("Invalid near-band ratio: {0} (must be 0 < ratio < 1)")]
    InvalidNearBandRatio(f64),
}
