//! Slope significance: residuals, standard error, t-statistic and p-value
//!
//! The sufficient sums cannot reproduce the residual sum of squares against
//! the fitted line, so the engine retains every raw point next to its
//! [`RunningRegression`]. Memory grows with the number of observations.

use crate::config::SignificanceConfig;
use crate::distributions::StudentT;
use crate::running::RunningRegression;
use regstat_core::{IdentifiedPoint, Result, StatsError};
use std::cell::Cell;
use tracing::{debug, trace, warn};

/// Minimum number of points for any slope test
pub const MIN_POINTS_FOR_SLOPE_TEST: usize = 3;

/// How the slope estimate resolved for the current data
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum SlopeFit {
    /// Some observation carried a NaN
    InvalidData,
    /// Every x is the same
    NoPredictorVariance { slope: f64 },
    /// Residuals vanish: the standard error is zero
    Exact { slope: f64 },
    Estimated {
        slope: f64,
        standard_error: f64,
        degrees_of_freedom: f64,
    },
}

/// Regression accumulator plus the retained observations needed for
/// significance testing.
///
/// Identifiers are optional. When present there is exactly one per point, in
/// insertion order; points appended without one get an empty identifier.
#[derive(Debug, Clone, Default)]
pub struct SignificanceEngine {
    regression: RunningRegression,
    points: Vec<(f64, f64)>,
    ids: Vec<String>,
    contains_invalid_data: bool,
    config: SignificanceConfig,
    cached_p_value: Cell<Option<f64>>,
}

impl SignificanceEngine {
    // ========== Construction ==========

    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(x, y)` pairs in order
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut engine = Self::new();
        for (x, y) in points {
            engine.add_point(x, y);
        }
        engine
    }

    /// Build from identified observations, e.g. `("a", 1.0, 2.0)` triples
    pub fn from_identified<I, P>(points: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<IdentifiedPoint>,
    {
        let mut engine = Self::new();
        for point in points {
            let IdentifiedPoint { id, x, y } = point.into();
            engine.add_identified_point(id, x, y);
        }
        engine
    }

    /// Builder: replace the configuration
    pub fn with_config(mut self, config: SignificanceConfig) -> Self {
        self.config = config;
        self.cached_p_value.set(None);
        self
    }

    // ========== Appending ==========

    /// Append an observation without an identifier
    pub fn add_point(&mut self, x: f64, y: f64) {
        if !self.ids.is_empty() {
            self.ids.push(String::new());
        }
        self.push(x, y);
    }

    /// Append an identified observation
    pub fn add_identified_point(&mut self, id: impl Into<String>, x: f64, y: f64) {
        // Earlier anonymous points get empty identifiers to keep positions aligned
        self.ids.resize(self.points.len(), String::new());
        self.ids.push(id.into());
        self.push(x, y);
    }

    fn push(&mut self, x: f64, y: f64) {
        if (x.is_nan() || y.is_nan()) && !self.contains_invalid_data {
            warn!(index = self.points.len(), "NaN observation; significance outputs are now NaN");
            self.contains_invalid_data = true;
        }
        self.points.push((x, y));
        self.regression.add(x, y);
        self.cached_p_value.set(None);
    }

    // ========== Accessors ==========

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Retained observations in insertion order
    pub fn data_points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Identifiers parallel to [`data_points`](Self::data_points); empty when
    /// none were supplied
    pub fn identifiers(&self) -> &[String] {
        &self.ids
    }

    pub fn regression(&self) -> &RunningRegression {
        &self.regression
    }

    pub fn config(&self) -> &SignificanceConfig {
        &self.config
    }

    /// Once any observation had a NaN coordinate this stays true
    pub fn contains_invalid_data(&self) -> bool {
        self.contains_invalid_data
    }

    /// Drop a memoized p-value so the next call recomputes it
    pub fn invalidate_cached_p_value(&self) {
        self.cached_p_value.set(None);
    }

    pub(crate) fn require_points(&self, operation: &str, required: usize) -> Result<()> {
        if self.points.len() < required {
            return Err(StatsError::insufficient_data(operation, required, self.points.len()));
        }
        Ok(())
    }

    // ========== Fit ==========

    /// Σ (y − (slope·x + intercept))² over the retained points
    pub fn residual_sum_of_squares(&self) -> f64 {
        let slope = self.regression.slope();
        let intercept = self.regression.y_intercept();
        self.points
            .iter()
            .map(|&(x, y)| {
                let residual = y - (slope * x + intercept);
                residual * residual
            })
            .sum()
    }

    pub(crate) fn fit_slope(&self, operation: &str) -> Result<SlopeFit> {
        self.require_points(operation, MIN_POINTS_FOR_SLOPE_TEST)?;

        if self.contains_invalid_data {
            debug!(operation, "data contains NaN");
            return Ok(SlopeFit::InvalidData);
        }

        let slope = self.regression.slope();
        let variance_x = self.regression.variance_x()?;
        let constant_x = self.regression.min_x() == self.regression.max_x();
        if variance_x == 0.0 || constant_x {
            debug!(operation, "no variation in x");
            return Ok(SlopeFit::NoPredictorVariance { slope });
        }

        let n = self.points.len() as f64;
        let rss = self.residual_sum_of_squares();
        let standard_error = (rss / (n - 2.0) / variance_x).sqrt();
        if standard_error == 0.0 {
            debug!(operation, slope, "zero standard error");
            return Ok(SlopeFit::Exact { slope });
        }

        Ok(SlopeFit::Estimated {
            slope,
            standard_error,
            degrees_of_freedom: n - 2.0,
        })
    }

    /// Standard error of the slope, √(RSS / (n − 2) / var(x)).
    ///
    /// NaN for NaN data or a constant predictor, 0 for a perfect fit.
    pub fn standard_error(&self) -> Result<f64> {
        Ok(match self.fit_slope("standard error")? {
            SlopeFit::InvalidData | SlopeFit::NoPredictorVariance { .. } => f64::NAN,
            SlopeFit::Exact { .. } => 0.0,
            SlopeFit::Estimated { standard_error, .. } => standard_error,
        })
    }

    /// slope / standard error; infinite for a perfect non-flat fit
    pub fn t_statistic(&self) -> Result<f64> {
        Ok(match self.fit_slope("t-statistic")? {
            SlopeFit::InvalidData | SlopeFit::NoPredictorVariance { .. } => f64::NAN,
            SlopeFit::Exact { slope } => slope / 0.0,
            SlopeFit::Estimated {
                slope, standard_error, ..
            } => slope / standard_error,
        })
    }

    // ========== P-value ==========

    /// Two-tailed p-value for the null hypothesis slope = 0.
    ///
    /// Fails below three points. NaN data gives NaN; a constant predictor
    /// gives 1; a zero standard error gives 1 for a flat fit and 0 otherwise.
    pub fn p_value(&self) -> Result<f64> {
        if let Some(p) = self.cached_p_value.get() {
            return Ok(p);
        }

        let p = match self.fit_slope("p-value")? {
            SlopeFit::InvalidData => f64::NAN,
            SlopeFit::NoPredictorVariance { .. } => 1.0,
            SlopeFit::Exact { slope } => {
                if slope == 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            SlopeFit::Estimated {
                slope,
                standard_error,
                degrees_of_freedom,
            } => {
                let t = slope / standard_error;
                let dist = StudentT::new(degrees_of_freedom)?;
                let p = 2.0 * (1.0 - dist.cdf(t.abs()));
                trace!(t, df = degrees_of_freedom, p, "slope t-test");

                if p.is_nan() || !(0.0..=1.0).contains(&p) || t.is_infinite() {
                    debug!(t, p, "degenerate p-value, reporting 1");
                    1.0
                } else {
                    p
                }
            }
        };

        if self.config.cache_p_value {
            self.cached_p_value.set(Some(p));
        }
        Ok(p)
    }
}

impl FromIterator<(f64, f64)> for SignificanceEngine {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        Self::from_points(iter)
    }
}

impl Extend<(f64, f64)> for SignificanceEngine {
    fn extend<I: IntoIterator<Item = (f64, f64)>>(&mut self, iter: I) {
        for (x, y) in iter {
            self.add_point(x, y);
        }
    }
}
