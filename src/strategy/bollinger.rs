//! Bollinger Band Computer
//!
//! Rolling moving average and standard deviation over a fixed window,
//! computed in a single pass. The window keeps a running mean and sum of
//! squared deviations (Welford), updated in O(1) as closes enter and leave:
//!
//! - avg      = mean of the window
//! - variance = m2 / n                        (population variance)
//! - upper    = avg + factor * sqrt(variance)
//! - lower    = avg - factor * sqrt(variance)
//!
//! A flat window leaves m2 at exactly zero, so its bands collapse onto the
//! average. The first `window - 1` points have no bands.

use crate::domain::{AnalysisError, AnnotatedObservation, Bands, Observation, Series};
use crate::strategy::params::AnalysisConfig;

/// Running mean and squared deviations over the trailing window
#[derive(Debug, Default, Clone, Copy)]
struct RunningWindow {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningWindow {
    /// Add a close while the window is still filling
    fn push(&mut self, close: f64) {
        self.count += 1;
        let delta = close - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (close - self.mean);
    }

    /// Swap the oldest close for a new one in a full window
    fn replace(&mut self, oldest: f64, close: f64) {
        let n = self.count as f64;
        let previous_mean = self.mean;
        self.mean += (close - oldest) / n;
        self.m2 += (close - oldest) * (close - self.mean + oldest - previous_mean);
    }

    fn bands(&self, factor: f64) -> Bands {
        // Rounding can leave m2 a hair below zero
        let variance = (self.m2 / self.count as f64).max(0.0);
        let std_dev = variance.sqrt();

        Bands {
            moving_average: self.mean,
            upper: self.mean + factor * std_dev,
            lower: self.mean - factor * std_dev,
        }
    }
}

/// Stateless band calculator for a fixed window and multiplier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandComputer {
    window: usize,
    factor: f64,
}

impl BandComputer {
    pub fn new(window: usize, factor: f64) -> Result<Self, AnalysisError> {
        if window == 0 {
            return Err(AnalysisError::invalid("window size must be > 0"));
        }
        if !factor.is_finite() || factor < 0.0 {
            return Err(AnalysisError::invalid(format!(
                "band factor must be finite and >= 0, got {}",
                factor
            )));
        }
        Ok(Self { window, factor })
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        Self::new(config.periods, config.factor)
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Annotate every observation; output has the same length and order as the input
    pub fn compute(&self, observations: &[Observation]) -> Result<Vec<AnnotatedObservation>, AnalysisError> {
        if observations.is_empty() {
            return Err(AnalysisError::invalid("no observations to compute bands over"));
        }
        if self.window > observations.len() {
            return Err(AnalysisError::invalid(format!(
                "window size {} exceeds {} observations",
                self.window,
                observations.len()
            )));
        }
        if let Some(bad) = observations.iter().find(|o| !o.close.is_finite()) {
            return Err(AnalysisError::invalid(format!(
                "non-finite close {} on {}",
                bad.close, bad.date
            )));
        }

        let mut running = RunningWindow::default();
        let mut annotated = Vec::with_capacity(observations.len());

        for (i, obs) in observations.iter().enumerate() {
            if i < self.window {
                running.push(obs.close);
            } else {
                running.replace(observations[i - self.window].close, obs.close);
            }

            if i + 1 >= self.window {
                annotated.push(AnnotatedObservation::with_bands(obs, running.bands(self.factor)));
            } else {
                annotated.push(AnnotatedObservation::unset(obs));
            }
        }

        Ok(annotated)
    }

    /// Compute bands and wrap them into a named series
    pub fn annotate(&self, symbol: &str, observations: &[Observation]) -> Result<Series, AnalysisError> {
        let points = self.compute(observations)?;
        Series::new(symbol, points)
    }
}

/// Convenience wrapper around [`BandComputer::compute`]
pub fn compute_bands(
    observations: &[Observation],
    window: usize,
    factor: f64,
) -> Result<Vec<AnnotatedObservation>, AnalysisError> {
    BandComputer::new(window, factor)?.compute(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use statrs::statistics::Statistics;

    fn observations(prices: &[f64]) -> Vec<Observation> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Observation::new(start + Duration::days(i as i64), close))
            .collect()
    }

    fn random_walk(len: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut price = 100.0;
        (0..len)
            .map(|_| {
                price += rng.gen_range(-2.0..2.0);
                price
            })
            .collect()
    }

    #[test]
    fn test_reference_scenario() {
        let obs = observations(&[10.0, 10.0, 10.0, 10.0, 10.0, 12.0, 14.0, 16.0]);
        let result = compute_bands(&obs, 5, 2.0).unwrap();

        assert_eq!(result.len(), 8);
        for point in &result[..4] {
            assert!(!point.is_computed());
        }

        let flat = result[4].bands.unwrap();
        assert_eq!(flat.moving_average, 10.0);
        assert_eq!(flat.upper, 10.0);
        assert_eq!(flat.lower, 10.0);

        let last = result[7].bands.unwrap();
        assert_relative_eq!(last.moving_average, 12.4, epsilon = 1e-12);
        assert!(last.upper > 12.4);
        assert!(last.lower < 12.4);
        // window [10, 10, 12, 14, 16]: variance 5.44
        assert_relative_eq!(last.upper - last.moving_average, 2.0 * 5.44_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_window_equal_to_length_sets_only_last() {
        let obs = observations(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0]);
        let result = compute_bands(&obs, obs.len(), 2.0).unwrap();

        assert_eq!(result.iter().filter(|p| p.is_computed()).count(), 1);
        assert!(result.last().unwrap().is_computed());
        assert!(result[..5].iter().all(|p| !p.is_computed()));
    }

    #[test]
    fn test_constant_series_collapses_bands() {
        let obs = observations(&[42.5; 12]);
        let result = compute_bands(&obs, 4, 2.0).unwrap();

        for point in result.iter().filter(|p| p.is_computed()) {
            let bands = point.bands.unwrap();
            assert_eq!(bands.moving_average, 42.5);
            assert_eq!(bands.upper, bands.moving_average);
            assert_eq!(bands.lower, bands.moving_average);
        }
    }

    #[test]
    fn test_constant_non_dyadic_prices_collapse_exactly() {
        // None of these are exact in binary
        for price in [0.1, 19.99, 101.37, 1234.56] {
            let obs = observations(&[price; 200]);
            for window in [1, 2, 5, 20, 50] {
                let result = compute_bands(&obs, window, 2.0).unwrap();
                for (i, point) in result.iter().enumerate().skip(window - 1) {
                    let bands = point.bands.unwrap();
                    assert_eq!(bands.moving_average, price, "price {price}, window {window}, index {i}");
                    assert_eq!(bands.upper, price, "price {price}, window {window}, index {i}");
                    assert_eq!(bands.lower, price, "price {price}, window {window}, index {i}");
                }
            }
        }
    }

    #[test]
    fn test_flat_stretch_after_movement_narrows_to_zero_width() {
        let mut prices = random_walk(30, 5);
        prices.extend([77.7; 30]);
        let obs = observations(&prices);
        let result = compute_bands(&obs, 10, 2.0).unwrap();

        let last = result.last().unwrap().bands.unwrap();
        assert_relative_eq!(last.moving_average, 77.7, epsilon = 1e-9);
        assert!(last.width() < 1e-4);
    }

    #[test]
    fn test_matches_naive_recomputation() {
        let prices = random_walk(300, 7);
        let obs = observations(&prices);
        let window = 20;
        let factor = 2.0;
        let result = compute_bands(&obs, window, factor).unwrap();

        for i in (window - 1)..prices.len() {
            let slice = &prices[i + 1 - window..=i];
            let mean = slice.iter().mean();
            let std_dev = slice.iter().population_std_dev();
            let bands = result[i].bands.unwrap();

            assert_relative_eq!(bands.moving_average, mean, epsilon = 1e-9);
            assert_relative_eq!(bands.upper, mean + factor * std_dev, epsilon = 1e-6);
            assert_relative_eq!(bands.lower, mean - factor * std_dev, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_band_ordering_holds() {
        for (seed, factor) in [(1_u64, 0.0), (2, 0.5), (3, 2.0), (4, 3.5)] {
            let obs = observations(&random_walk(120, seed));
            let result = compute_bands(&obs, 10, factor).unwrap();
            for bands in result.iter().filter_map(|p| p.bands) {
                assert!(bands.lower <= bands.moving_average);
                assert!(bands.moving_average <= bands.upper);
            }
        }
    }

    #[test]
    fn test_compute_is_idempotent() {
        let obs = observations(&random_walk(60, 11));
        let computer = BandComputer::new(7, 2.0).unwrap();
        assert_eq!(computer.compute(&obs).unwrap(), computer.compute(&obs).unwrap());
    }

    #[test]
    fn test_preserves_dates_and_closes() {
        let obs = observations(&[1.0, 2.0, 3.0]);
        let result = compute_bands(&obs, 2, 1.0).unwrap();
        for (o, a) in obs.iter().zip(&result) {
            assert_eq!(o.date, a.date);
            assert_eq!(o.close, a.close);
        }
    }

    #[test]
    fn test_invalid_window() {
        let obs = observations(&[1.0, 2.0, 3.0]);
        assert!(matches!(compute_bands(&obs, 0, 2.0), Err(AnalysisError::InvalidParameter(_))));
        assert!(matches!(compute_bands(&obs, 4, 2.0), Err(AnalysisError::InvalidParameter(_))));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(compute_bands(&[], 1, 2.0), Err(AnalysisError::InvalidParameter(_))));
    }

    #[test]
    fn test_invalid_factor_and_close() {
        let obs = observations(&[1.0, 2.0, 3.0]);
        assert!(compute_bands(&obs, 2, -1.0).is_err());
        assert!(compute_bands(&obs, 2, f64::INFINITY).is_err());

        let bad = observations(&[1.0, f64::NAN, 3.0]);
        assert!(matches!(compute_bands(&bad, 2, 2.0), Err(AnalysisError::InvalidParameter(_))));
    }

    #[test]
    fn test_annotate_builds_series() {
        let obs = observations(&[1.0, 2.0, 3.0, 4.0]);
        let computer = BandComputer::from_config(&AnalysisConfig::default().with_periods(2)).unwrap();
        assert_eq!(computer.window(), 2);
        assert_eq!(computer.factor(), 2.0);

        let series = computer.annotate("IBM", &obs).unwrap();
        assert_eq!(series.symbol(), "IBM");
        assert_eq!(series.computed_len(), 3);
    }
}
