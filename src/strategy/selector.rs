//! Candidate Selector
//!
//! Runs the band rules over each series in caller order and keeps the
//! widest-band invest candidate.
//!
//! Rules, evaluated per symbol:
//! 1. Below lower band and trending down  -> avoid
//! 2. Above upper band and trending up    -> invest
//! 3. Near upper band and trending down   -> avoid
//! 4. Near lower band and trending up     -> invest
//!
//! In `ScanMode::FirstVerdict` the scan ends at the first symbol where any
//! rule fires, so only that symbol can be picked. `ScanMode::ScanAll`
//! keeps going and compares every invest candidate.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{AnalysisError, Candidate, Rule, Series, Verdict};
use crate::strategy::params::{AnalysisConfig, ScanMode, DEFAULT_NEAR_BAND_RATIO};
use crate::strategy::trend::TrendClassifier;

/// Classification of one symbol during a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub symbol: String,
    pub rule: Option<Rule>,
    pub verdict: Verdict,
    pub band_width: f64,
}

/// Result of one selection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub mode: ScanMode,
    pub best: Option<Candidate>,
    pub evaluations: Vec<Evaluation>,
    /// Symbol whose verdict ended a first-verdict scan
    pub halted_at: Option<String>,
}

impl Selection {
    pub fn recommended_symbol(&self) -> Option<&str> {
        self.best.as_ref().map(|c| c.symbol.as_str())
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.recommended_symbol().unwrap_or("None"))
    }
}

/// Running best candidate for a single scan
#[derive(Debug, Default)]
struct BestCandidate(Option<Candidate>);

impl BestCandidate {
    /// Keep the offer if nothing is held yet or its band is strictly wider
    fn offer(&mut self, symbol: &str, band_width: f64) -> bool {
        let better = match &self.0 {
            None => true,
            Some(current) => band_width > current.band_width,
        };
        if better {
            self.0 = Some(Candidate {
                symbol: symbol.to_string(),
                band_width,
            });
        }
        better
    }

    fn into_inner(self) -> Option<Candidate> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selector {
    mode: ScanMode,
    near_band_ratio: f64,
}

impl Default for Selector {
    fn default() -> Self {
        Self::new(ScanMode::default())
    }
}

impl Selector {
    pub fn new(mode: ScanMode) -> Self {
        Self {
            mode,
            near_band_ratio: DEFAULT_NEAR_BAND_RATIO,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.scan_mode).with_near_band_ratio(config.near_band_ratio)
    }

    pub fn with_near_band_ratio(mut self, ratio: f64) -> Self {
        self.near_band_ratio = ratio;
        self
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Evaluate series in iteration order and pick the best invest candidate
    pub fn select<'a, I>(&self, series: I) -> Result<Selection, AnalysisError>
    where
        I: IntoIterator<Item = &'a Series>,
    {
        let mut best = BestCandidate::default();
        let mut evaluations = Vec::new();
        let mut halted_at = None;

        for s in series {
            let classifier = TrendClassifier::new(s)?.with_near_band_ratio(self.near_band_ratio);
            let rule = classifier.classify();
            let band_width = classifier.average_band_width();
            let verdict = classifier.verdict();

            tracing::debug!(
                "{} | verdict: {} | rule: {} | band width: {:.4}",
                s.symbol(),
                verdict,
                rule.map(|r| r.description()).unwrap_or("none"),
                band_width
            );

            evaluations.push(Evaluation {
                symbol: s.symbol().to_string(),
                rule,
                verdict,
                band_width,
            });

            let Some(rule) = rule else {
                continue;
            };

            if rule.verdict() == Verdict::Invest && best.offer(s.symbol(), band_width) {
                tracing::debug!("{} is the new best candidate", s.symbol());
            }

            if self.mode == ScanMode::FirstVerdict {
                halted_at = Some(s.symbol().to_string());
                break;
            }
        }

        let selection = Selection {
            mode: self.mode,
            best: best.into_inner(),
            evaluations,
            halted_at,
        };
        tracing::info!("You should invest in: {}", selection);
        Ok(selection)
    }
}
