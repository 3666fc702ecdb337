//! Confidence intervals: slope interval and margin of error for a mean

use crate::distributions::StudentT;
use crate::significance::{SignificanceEngine, SlopeFit};
use regstat_core::{Axis, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Two-sided interval for the regression slope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopeInterval {
    pub lower: f64,
    pub upper: f64,
}

impl SlopeInterval {
    fn undefined() -> Self {
        Self {
            lower: f64::NAN,
            upper: f64::NAN,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Slope interval together with the quantities it was built from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopeIntervalDetail {
    pub lower: f64,
    pub upper: f64,
    pub slope: f64,
    pub standard_error: f64,
    pub p_value: f64,
}

impl SlopeIntervalDetail {
    pub fn interval(&self) -> SlopeInterval {
        SlopeInterval {
            lower: self.lower,
            upper: self.upper,
        }
    }
}

/// Mean of one variable with its margin of error, reported as `mean ± margin`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanMargin {
    pub mean: f64,
    pub margin: f64,
}

impl MeanMargin {
    /// `(mean − margin, mean + margin)`
    pub fn interval(&self) -> (f64, f64) {
        (self.mean - self.margin, self.mean + self.margin)
    }
}

/// Two-tailed critical value of t at the given confidence level
fn critical_value(confidence_level: f64, degrees_of_freedom: f64) -> Result<f64> {
    let alpha = 1.0 - confidence_level;
    Ok(StudentT::new(degrees_of_freedom)?.inverse_cdf(1.0 - alpha / 2.0))
}

impl SignificanceEngine {
    // ============ Slope Interval ============

    /// Slope interval at the configured confidence level
    pub fn confidence_interval(&self) -> Result<SlopeInterval> {
        self.confidence_interval_at(self.config().confidence_level)
    }

    /// `slope ∓ t* · SE` with t* the two-tailed critical value for
    /// `confidence_level` and n − 2 degrees of freedom.
    ///
    /// Fails below three points. NaN data or a constant predictor give
    /// `(NaN, NaN)`; a zero standard error collapses to `(slope, slope)`.
    pub fn confidence_interval_at(&self, confidence_level: f64) -> Result<SlopeInterval> {
        Ok(match self.fit_slope("confidence interval")? {
            SlopeFit::InvalidData | SlopeFit::NoPredictorVariance { .. } => SlopeInterval::undefined(),
            SlopeFit::Exact { slope } => SlopeInterval {
                lower: slope,
                upper: slope,
            },
            SlopeFit::Estimated {
                slope,
                standard_error,
                degrees_of_freedom,
            } => {
                let margin = critical_value(confidence_level, degrees_of_freedom)? * standard_error;
                SlopeInterval {
                    lower: slope - margin,
                    upper: slope + margin,
                }
            }
        })
    }

    /// Detailed slope interval at the configured confidence level
    pub fn confidence_interval_with_detail(&self) -> Result<SlopeIntervalDetail> {
        self.confidence_interval_with_detail_at(self.config().confidence_level)
    }

    /// Slope interval plus slope, standard error and p-value.
    ///
    /// The p-value comes from [`p_value`](SignificanceEngine::p_value), so
    /// the two always agree. Costs a second pass over the points.
    pub fn confidence_interval_with_detail_at(&self, confidence_level: f64) -> Result<SlopeIntervalDetail> {
        Ok(match self.fit_slope("confidence interval")? {
            SlopeFit::InvalidData => SlopeIntervalDetail {
                lower: f64::NAN,
                upper: f64::NAN,
                slope: f64::NAN,
                standard_error: f64::NAN,
                p_value: f64::NAN,
            },
            SlopeFit::NoPredictorVariance { slope } => SlopeIntervalDetail {
                lower: f64::NAN,
                upper: f64::NAN,
                slope,
                standard_error: f64::NAN,
                p_value: 1.0,
            },
            SlopeFit::Exact { slope } => SlopeIntervalDetail {
                lower: slope,
                upper: slope,
                slope,
                standard_error: 0.0,
                p_value: if slope == 0.0 { 1.0 } else { 0.0 },
            },
            SlopeFit::Estimated {
                slope,
                standard_error,
                degrees_of_freedom,
            } => {
                let p_value = self.p_value()?;
                let margin = critical_value(confidence_level, degrees_of_freedom)? * standard_error;
                SlopeIntervalDetail {
                    lower: slope - margin,
                    upper: slope + margin,
                    slope,
                    standard_error,
                    p_value,
                }
            }
        })
    }

    // ============ Margin of Error ============

    /// Margin of error for the mean of `axis` at the configured level
    pub fn margin_of_error(&self, axis: Axis) -> Result<MeanMargin> {
        self.margin_of_error_at(axis, self.config().confidence_level)
    }

    /// Mean of `axis` and `t* · σ / √n` with n − 1 degrees of freedom.
    ///
    /// Fails below two points. NaN data or a level outside (0, 1) give
    /// `(NaN, NaN)`; zero spread, including every value on the axis being
    /// identical, gives `(mean, 0)`.
    pub fn margin_of_error_at(&self, axis: Axis, confidence_level: f64) -> Result<MeanMargin> {
        self.require_points("margin of error", 2)?;

        if self.contains_invalid_data() || confidence_level <= 0.0 || confidence_level >= 1.0 || confidence_level.is_nan() {
            debug!(confidence_level, "margin of error undefined");
            return Ok(MeanMargin {
                mean: f64::NAN,
                margin: f64::NAN,
            });
        }

        let reg = self.regression();
        let mean = reg.mean(axis);
        let std_dev = reg.std_dev(axis);
        let (low, high) = match axis {
            Axis::X => (reg.min_x(), reg.max_x()),
            Axis::Y => (reg.min_y(), reg.max_y()),
        };
        // rounding can leave a tiny positive spread for identical values
        if std_dev == 0.0 || low == high {
            debug!(?axis, "no spread");
            return Ok(MeanMargin { mean, margin: 0.0 });
        }

        let n = reg.count() as f64;
        let standard_error = std_dev / n.sqrt();
        let margin = critical_value(confidence_level, n - 1.0)? * standard_error;
        Ok(MeanMargin { mean, margin })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SignificanceConfig;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    fn five_points() -> SignificanceEngine {
        SignificanceEngine::from_points(vec![(1.0, 2.0), (2.0, 3.0), (3.0, 5.0), (4.0, 4.0), (5.0, 6.0)])
    }

    #[test]
    fn test_known_interval() {
        let ci = five_points().confidence_interval().unwrap();
        assert!(close(ci.lower, -0.890862572590206, 1e-8));
        assert!(close(ci.upper, 2.690862572590206, 1e-8));
        assert!(ci.contains(0.9));
        assert!(ci.contains(0.0));
    }

    #[test]
    fn test_four_point_interval() {
        let engine = SignificanceEngine::from_points(vec![(1.0, 2.0), (2.0, 3.5), (3.0, 3.9), (4.0, 6.1)]);
        let ci = engine.confidence_interval_at(0.95).unwrap();
        assert!(close(ci.lower, -0.735239291302815, 1e-8));
        assert!(close(ci.upper, 3.275239291302813, 1e-8));
    }

    #[test]
    fn test_wider_at_higher_level() {
        let engine = five_points();
        let narrow = engine.confidence_interval_at(0.80).unwrap();
        let wide = engine.confidence_interval_at(0.99).unwrap();
        assert!(wide.width() > narrow.width());
    }

    #[test]
    fn test_configured_level_is_used() {
        let engine = five_points().with_config(SignificanceConfig::new().with_confidence_level(0.9));
        assert_eq!(engine.confidence_interval().unwrap(), engine.confidence_interval_at(0.9).unwrap());
        assert_eq!(
            engine.margin_of_error(Axis::Y).unwrap(),
            engine.margin_of_error_at(Axis::Y, 0.9).unwrap()
        );
    }

    #[test]
    fn test_interval_insufficient_data() {
        let engine = SignificanceEngine::from_points(vec![(1.0, 2.0), (2.0, 3.0)]);
        assert!(engine.confidence_interval().unwrap_err().is_insufficient_data());
        assert!(engine.confidence_interval_with_detail().unwrap_err().is_insufficient_data());
    }

    #[test]
    fn test_interval_nan_data() {
        let engine = SignificanceEngine::from_points(vec![(1.0, 2.0), (f64::NAN, 3.0), (3.0, 5.0)]);
        let ci = engine.confidence_interval().unwrap();
        assert!(ci.lower.is_nan() && ci.upper.is_nan());

        let detail = engine.confidence_interval_with_detail().unwrap();
        assert!(detail.slope.is_nan());
        assert!(detail.standard_error.is_nan());
        assert!(detail.p_value.is_nan());
    }

    #[test]
    fn test_interval_constant_x() {
        let engine = SignificanceEngine::from_points(vec![(2.0, 1.0), (2.0, 5.0), (2.0, 3.0)]);
        let ci = engine.confidence_interval().unwrap();
        assert!(ci.lower.is_nan() && ci.upper.is_nan());

        let detail = engine.confidence_interval_with_detail().unwrap();
        assert!(detail.lower.is_nan());
        assert!(detail.standard_error.is_nan());
        assert_eq!(detail.p_value, 1.0);
    }

    #[test]
    fn test_interval_collapses_on_exact_fit() {
        let engine = SignificanceEngine::from_points(vec![(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]);
        let ci = engine.confidence_interval().unwrap();
        assert_eq!(ci.lower, ci.upper);
        assert_eq!(ci.lower, 2.0);

        let detail = engine.confidence_interval_with_detail().unwrap();
        assert_eq!(detail.standard_error, 0.0);
        assert_eq!(detail.p_value, 0.0);
        assert_eq!(detail.slope, 2.0);
    }

    #[test]
    fn test_detail_matches_plain_interval() {
        let engine = five_points();
        for level in [0.5, 0.9, 0.95, 0.999] {
            let plain = engine.confidence_interval_at(level).unwrap();
            let detail = engine.confidence_interval_with_detail_at(level).unwrap();
            assert_eq!(detail.interval(), plain);
            assert_eq!(detail.p_value, engine.p_value().unwrap());
            assert_eq!(detail.standard_error, engine.standard_error().unwrap());
        }
    }

    #[test]
    fn test_margin_of_error_known() {
        let engine = five_points();
        let x = engine.margin_of_error(Axis::X).unwrap();
        assert_eq!(x.mean, engine.regression().mean_x());
        assert!(close(x.margin, 0.981621580738779, 1e-8));

        let y = engine.margin_of_error(Axis::Y).unwrap();
        assert_eq!(y.mean, 4.0);
        assert!(close(y.margin, 0.981621580738779, 1e-8));

        let (lo, hi) = x.interval();
        assert!(close(hi - lo, 2.0 * x.margin, 1e-12));
    }

    #[test]
    fn test_margin_of_error_three_points() {
        let engine = SignificanceEngine::from_points(vec![(1.0, 3.4), (2.0, 2.0), (3.0, 1.0)]);
        let x = engine.margin_of_error(Axis::X).unwrap();
        assert!(close(x.margin, 1.756550621379891, 1e-8));
        let y = engine.margin_of_error(Axis::Y).unwrap();
        assert!(close(y.margin, 2.117596874812700, 1e-8));
    }

    #[test]
    fn test_margin_of_error_two_points_is_enough() {
        let engine = SignificanceEngine::from_points(vec![(1.0, 2.0), (3.0, 2.0)]);
        assert!(engine.margin_of_error(Axis::X).unwrap().margin > 0.0);
        let y = engine.margin_of_error(Axis::Y).unwrap();
        assert_eq!(y, MeanMargin { mean: 2.0, margin: 0.0 });
    }

    #[test]
    fn test_margin_of_error_identical_values() {
        let engine: SignificanceEngine = (0..7).map(|i| (0.1, i as f64)).collect();
        let x = engine.margin_of_error(Axis::X).unwrap();
        assert_eq!(x.margin, 0.0);
        assert_eq!(x.mean, engine.regression().mean_x());
        assert!(engine.margin_of_error(Axis::Y).unwrap().margin > 0.0);
    }

    #[test]
    fn test_margin_of_error_insufficient_data() {
        let engine = SignificanceEngine::from_points(vec![(1.0, 2.0)]);
        let err = engine.margin_of_error(Axis::X).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_margin_of_error_nan_data() {
        let engine = SignificanceEngine::from_points(vec![(1.0, 2.0), (f64::NAN, 3.0), (3.0, 5.0)]);
        let moe = engine.margin_of_error(Axis::X).unwrap();
        assert!(moe.mean.is_nan());
        assert!(moe.margin.is_nan());
    }

    #[test]
    fn test_margin_of_error_bad_level() {
        let engine = five_points();
        for level in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            let moe = engine.margin_of_error_at(Axis::X, level).unwrap();
            assert!(moe.mean.is_nan() && moe.margin.is_nan(), "level {}", level);
        }
    }

    #[test]
    fn test_interval_serializes() {
        let ci = five_points().confidence_interval().unwrap();
        let json = serde_json::to_value(ci).unwrap();
        assert!(json["lower"].as_f64().unwrap() < json["upper"].as_f64().unwrap());
    }
}
