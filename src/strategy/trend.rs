//! Trend Classifier
//!
//! Inspects the last three annotated points of a series and answers
//! trend-direction and band-proximity questions about them.
//!
//! The near-band checks compare every point against the most recent
//! point's band (lower) or close (upper), not each point's own value.

use crate::domain::{AnalysisError, AnnotatedObservation, Bands, Rule, Series, Verdict};
use crate::strategy::params::DEFAULT_NEAR_BAND_RATIO;

/// Number of trailing points every predicate looks at
pub const TAIL_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
struct TailPoint {
    close: f64,
    bands: Bands,
}

/// Predicates over the three most recent points, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct TrendClassifier {
    tail: [TailPoint; TAIL_LEN],
    near_band_ratio: f64,
}

impl TrendClassifier {
    pub fn new(series: &Series) -> Result<Self, AnalysisError> {
        Self::from_points(series.points())
    }

    /// Build from raw points; the last three must have bands set
    pub fn from_points(points: &[AnnotatedObservation]) -> Result<Self, AnalysisError> {
        let available = points
            .iter()
            .rev()
            .take_while(|p| p.is_computed())
            .take(TAIL_LEN)
            .count();

        let insufficient = AnalysisError::InsufficientData {
            required: TAIL_LEN,
            available,
        };
        if available < TAIL_LEN {
            return Err(insufficient);
        }

        let start = points.len() - TAIL_LEN;
        let mut tail = [TailPoint {
            close: 0.0,
            bands: Bands { moving_average: 0.0, upper: 0.0, lower: 0.0 },
        }; TAIL_LEN];
        for (slot, point) in tail.iter_mut().zip(&points[start..]) {
            let bands = point.bands.ok_or_else(|| insufficient.clone())?;
            *slot = TailPoint { close: point.close, bands };
        }

        Ok(Self {
            tail,
            near_band_ratio: DEFAULT_NEAR_BAND_RATIO,
        })
    }

    pub fn with_near_band_ratio(mut self, ratio: f64) -> Self {
        self.near_band_ratio = ratio;
        self
    }

    fn last(&self) -> &TailPoint {
        &self.tail[TAIL_LEN - 1]
    }

    /// Last close below both preceding closes
    pub fn trending_down(&self) -> bool {
        let last = self.last().close;
        last < self.tail[1].close && last < self.tail[0].close
    }

    /// Last close above both preceding closes
    pub fn trending_up(&self) -> bool {
        let last = self.last().close;
        last > self.tail[1].close && last > self.tail[0].close
    }

    /// Every close at or under its own lower band
    pub fn below_lower_band(&self) -> bool {
        self.tail.iter().all(|p| p.close <= p.bands.lower)
    }

    /// Every close at or over its own upper band
    pub fn above_upper_band(&self) -> bool {
        self.tail.iter().all(|p| p.close >= p.bands.upper)
    }

    /// Every close within the ratio of the latest lower band
    pub fn near_lower_band(&self) -> bool {
        let target = self.last().bands.lower;
        self.tail
            .iter()
            .all(|p| (p.close - target).abs() < self.near_band_ratio * p.bands.lower)
    }

    /// Every upper band within the ratio of the latest close
    pub fn near_upper_band(&self) -> bool {
        let close = self.last().close;
        self.tail
            .iter()
            .all(|p| (p.bands.upper - close).abs() < self.near_band_ratio * p.bands.upper)
    }

    /// Mean band width over the tail, used to rank candidates
    pub fn average_band_width(&self) -> f64 {
        self.tail.iter().map(|p| p.bands.width()).sum::<f64>() / TAIL_LEN as f64
    }

    /// First rule that fires, in evaluation order
    pub fn classify(&self) -> Option<Rule> {
        Rule::ORDERED.into_iter().find(|rule| self.fires(*rule))
    }

    pub fn verdict(&self) -> Verdict {
        self.classify().map(|r| r.verdict()).unwrap_or(Verdict::Neutral)
    }

    fn fires(&self, rule: Rule) -> bool {
        match rule {
            Rule::BelowLowerTrendingDown => self.below_lower_band() && self.trending_down(),
            Rule::AboveUpperTrendingUp => self.above_upper_band() && self.trending_up(),
            Rule::NearUpperTrendingDown => self.near_upper_band() && self.trending_down(),
            Rule::NearLowerTrendingUp => self.near_lower_band() && self.trending_up(),
        }
    }
}
