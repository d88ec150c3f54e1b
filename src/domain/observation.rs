use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::AnalysisError;

/// One daily close for a symbol
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub close: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Moving average with its upper and lower Bollinger bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bands {
    pub moving_average: f64,
    pub upper: f64,
    pub lower: f64,
}

impl Bands {
    /// Distance between the upper and lower band
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// An observation with its bands, once the rolling window is full
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedObservation {
    pub date: NaiveDate,
    pub close: f64,
    pub bands: Option<Bands>,
}

impl AnnotatedObservation {
    pub fn unset(observation: &Observation) -> Self {
        Self {
            date: observation.date,
            close: observation.close,
            bands: None,
        }
    }

    pub fn with_bands(observation: &Observation, bands: Bands) -> Self {
        Self {
            date: observation.date,
            close: observation.close,
            bands: Some(bands),
        }
    }

    pub fn is_computed(&self) -> bool {
        self.bands.is_some()
    }

    pub fn moving_average(&self) -> Option<f64> {
        self.bands.map(|b| b.moving_average)
    }

    pub fn upper_band(&self) -> Option<f64> {
        self.bands.map(|b| b.upper)
    }

    pub fn lower_band(&self) -> Option<f64> {
        self.bands.map(|b| b.lower)
    }
}

/// Annotated history of a single symbol, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    symbol: String,
    points: Vec<AnnotatedObservation>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, points: Vec<AnnotatedObservation>) -> Result<Self, AnalysisError> {
        let symbol = symbol.into();
        if points.is_empty() {
            return Err(AnalysisError::invalid(format!("series for {} is empty", symbol)));
        }
        Ok(Self { symbol, points })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[AnnotatedObservation] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&AnnotatedObservation> {
        self.points.last()
    }

    /// Number of points with bands set
    pub fn computed_len(&self) -> usize {
        self.points.iter().filter(|p| p.is_computed()).count()
    }
}
