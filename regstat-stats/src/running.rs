//! Running sufficient statistics for bivariate linear regression
//!
//! Keeps Σx, Σy, Σx², Σy², Σxy, the count and the extrema of a stream of
//! `(x, y)` observations. Every derived quantity (mean, variance, standard
//! deviation, slope, intercept, correlation, R²) is recomputed on demand from
//! these sums, so memory use does not grow with the stream.
//!
//! Two accumulators over disjoint streams combine field-wise: sums and counts
//! add, extrema take the min/max. This makes the type suitable for sharded or
//! windowed aggregation.

use regstat_core::{Axis, Result, StatsError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

/// Sufficient statistics of a bivariate sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunningRegression {
    count: u64,
    sum_x: f64,
    sum_y: f64,
    sum_xx: f64,
    sum_yy: f64,
    sum_xy: f64,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl Default for RunningRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningRegression {
    // ========== Construction ==========

    /// Empty accumulator: zero sums, extrema at the ±∞ sentinels
    pub fn new() -> Self {
        Self {
            count: 0,
            sum_x: 0.0,
            sum_y: 0.0,
            sum_xx: 0.0,
            sum_yy: 0.0,
            sum_xy: 0.0,
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Accumulator seeded with a single observation
    pub fn from_point(x: f64, y: f64) -> Self {
        let mut reg = Self::new();
        reg.add(x, y);
        reg
    }

    // ========== Mutation ==========

    /// Add one observation. NaN is absorbed into the sums.
    pub fn add(&mut self, x: f64, y: f64) {
        self.count += 1;
        self.sum_x += x;
        self.sum_y += y;
        self.sum_xx += x * x;
        self.sum_yy += y * y;
        self.sum_xy += x * y;

        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    /// Add `x` against a sequential label: y is `count + 1`
    pub fn add_sequential(&mut self, x: f64) {
        let label = (self.count + 1) as f64;
        self.add(x, label);
    }

    /// Remove a previously added observation.
    ///
    /// Only the sums and the count are reversed; the extrema keep whatever
    /// they were, so `min_x`/`max_x`/`min_y`/`max_y` are unreliable after any
    /// decrement.
    pub fn decrement(&mut self, x: f64, y: f64) -> Result<()> {
        if self.count == 0 {
            return Err(StatsError::insufficient_data("decrement", 1, 0));
        }

        self.count -= 1;
        self.sum_x -= x;
        self.sum_y -= y;
        self.sum_xx -= x * x;
        self.sum_yy -= y * y;
        self.sum_xy -= x * y;
        Ok(())
    }

    /// Remove the most recent [`add_sequential`](Self::add_sequential)
    /// observation: its label is the current count.
    pub fn decrement_sequential(&mut self, x: f64) -> Result<()> {
        let label = self.count as f64;
        self.decrement(x, label)
    }

    // ========== Merge ==========

    /// Combine with `other` into a new accumulator; neither input changes.
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = *self;
        merged.merge_in_place(other);
        merged
    }

    /// Like [`merge`](Self::merge) but fails when `other` is absent
    pub fn try_merge(&self, other: Option<&Self>) -> Result<Self> {
        let other = other.ok_or_else(|| StatsError::invalid_argument("accumulator to merge is absent"))?;
        Ok(self.merge(other))
    }

    /// Fold `other` into this accumulator
    pub fn merge_in_place(&mut self, other: &Self) {
        self.count += other.count;
        self.sum_x += other.sum_x;
        self.sum_y += other.sum_y;
        self.sum_xx += other.sum_xx;
        self.sum_yy += other.sum_yy;
        self.sum_xy += other.sum_xy;

        self.min_x = self.min_x.min(other.min_x);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_y = self.max_y.max(other.max_y);
    }

    // ========== Raw sums ==========

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn sum_x(&self) -> f64 {
        self.sum_x
    }

    pub fn sum_y(&self) -> f64 {
        self.sum_y
    }

    pub fn sum_xx(&self) -> f64 {
        self.sum_xx
    }

    pub fn sum_yy(&self) -> f64 {
        self.sum_yy
    }

    pub fn sum_xy(&self) -> f64 {
        self.sum_xy
    }

    /// Not reversed by [`decrement`](Self::decrement)
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    /// Not reversed by [`decrement`](Self::decrement)
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    /// Not reversed by [`decrement`](Self::decrement)
    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    /// Not reversed by [`decrement`](Self::decrement)
    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    fn n(&self) -> f64 {
        self.count as f64
    }

    // ========== Derived quantities ==========

    /// mean x = Σx / n, 0 for an empty accumulator
    pub fn mean_x(&self) -> f64 {
        if self.count > 0 {
            self.sum_x / self.n()
        } else {
            0.0
        }
    }

    /// mean y = Σy / n, 0 for an empty accumulator
    pub fn mean_y(&self) -> f64 {
        if self.count > 0 {
            self.sum_y / self.n()
        } else {
            0.0
        }
    }

    pub fn mean(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.mean_x(),
            Axis::Y => self.mean_y(),
        }
    }

    /// Population variance of x: Σx²/n − mean².
    pub fn variance_x(&self) -> Result<f64> {
        if self.count == 0 {
            return Err(StatsError::div_zero("variance requires at least one sample"));
        }
        let mean = self.mean_x();
        Ok(self.sum_xx / self.n() - mean * mean)
    }

    /// Population variance of y: Σy²/n − mean².
    pub fn variance_y(&self) -> Result<f64> {
        if self.count == 0 {
            return Err(StatsError::div_zero("variance requires at least one sample"));
        }
        let mean = self.mean_y();
        Ok(self.sum_yy / self.n() - mean * mean)
    }

    pub fn variance(&self, axis: Axis) -> Result<f64> {
        match axis {
            Axis::X => self.variance_x(),
            Axis::Y => self.variance_y(),
        }
    }

    /// √(Σx² − (Σx)²/n) / (n − 1); NaN below two samples.
    ///
    /// The division by `n − 1` sits outside the square root. Downstream
    /// margin-of-error figures are calibrated against this form.
    pub fn std_dev_x(&self) -> f64 {
        if self.count <= 1 {
            return f64::NAN;
        }
        let n = self.n();
        (self.sum_xx - self.sum_x * self.sum_x / n).sqrt() / (n - 1.0)
    }

    /// √(Σy² − (Σy)²/n) / (n − 1); NaN below two samples.
    pub fn std_dev_y(&self) -> f64 {
        if self.count <= 1 {
            return f64::NAN;
        }
        let n = self.n();
        (self.sum_yy - self.sum_y * self.sum_y / n).sqrt() / (n - 1.0)
    }

    pub fn std_dev(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.std_dev_x(),
            Axis::Y => self.std_dev_y(),
        }
    }

    /// slope = (Σxy − ΣxΣy/n) / (Σx² − (Σx)²/n)
    ///
    /// NaN below two samples or when the denominator is exactly zero.
    pub fn slope(&self) -> f64 {
        if self.count < 2 {
            return f64::NAN;
        }
        let n = self.n();
        let numerator = self.sum_xy - self.sum_x * self.sum_y / n;
        let denominator = self.sum_xx - self.sum_x * self.sum_x / n;
        if denominator != 0.0 {
            numerator / denominator
        } else {
            f64::NAN
        }
    }

    /// intercept = (Σy − slope·Σx) / n
    pub fn y_intercept(&self) -> f64 {
        (self.sum_y - self.slope() * self.sum_x) / self.n()
    }

    /// Fitted value on the regression line
    pub fn predict(&self, x: f64) -> f64 {
        self.slope() * x + self.y_intercept()
    }

    /// r = slope · σx / σy; NaN when σy is zero or the slope is infinite
    pub fn correlation(&self) -> f64 {
        let slope = self.slope();
        let std_dev_y = self.std_dev_y();
        if std_dev_y == 0.0 || slope.is_infinite() {
            return f64::NAN;
        }
        slope * self.std_dev_x() / std_dev_y
    }

    /// Coefficient of determination r²
    pub fn r_squared(&self) -> f64 {
        let r = self.correlation();
        r * r
    }

    /// True when the sums or derived fit cannot be trusted.
    ///
    /// Only a positive infinite slope is flagged; a negative infinite slope
    /// passes.
    pub fn is_invalid(&self) -> bool {
        self.std_dev_x().is_nan()
            || self.std_dev_y().is_nan()
            || self.sum_x.is_nan()
            || self.sum_y.is_nan()
            || self.slope() == f64::INFINITY
            || self.y_intercept().is_nan()
    }

    /// Snapshot of every derived quantity
    pub fn summary(&self) -> RegressionSummary {
        RegressionSummary {
            count: self.count,
            slope: self.slope(),
            y_intercept: self.y_intercept(),
            correlation: self.correlation(),
            r_squared: self.r_squared(),
            mean_x: self.mean_x(),
            mean_y: self.mean_y(),
            std_dev_x: self.std_dev_x(),
            std_dev_y: self.std_dev_y(),
            variance_x: self.variance_x().ok(),
            variance_y: self.variance_y().ok(),
            min_x: self.min_x,
            max_x: self.max_x,
            min_y: self.min_y,
            max_y: self.max_y,
            is_invalid: self.is_invalid(),
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>) -> std::result::Result<fmt::Result, StatsError> {
        let variance_x = self.variance_x()?;
        let variance_y = self.variance_y()?;
        Ok(write!(
            f,
            "Cor: {:.4} N: {} MeanX: {:.2} MeanY: {:.2} Slp: {:.2}  (Q:x{:.3} y{:.3})  (Q2: x{:.3} y{:.3})  Yincpt: {:.3}, X({} <-> {}), Y: ({} <-> {}), N: {}, isNAN:{}",
            self.correlation(),
            self.count,
            self.mean_x(),
            self.mean_y(),
            self.slope(),
            self.std_dev_x(),
            self.std_dev_y(),
            variance_x,
            variance_y,
            self.y_intercept(),
            self.min_x,
            self.max_x,
            self.min_y,
            self.max_y,
            self.count,
            self.is_invalid(),
        ))
    }
}

impl fmt::Display for RunningRegression {
    /// Human-readable summary. A failing derived quantity is reported by its
    /// error category instead of aborting the format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.slope() == f64::INFINITY {
            return write!(f, "NaN - {}", self.count);
        }
        match self.render(f) {
            Ok(written) => written,
            Err(e) => f.write_str(e.category()),
        }
    }
}

impl FromIterator<(f64, f64)> for RunningRegression {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let mut reg = Self::new();
        reg.extend(iter);
        reg
    }
}

impl Extend<(f64, f64)> for RunningRegression {
    fn extend<I: IntoIterator<Item = (f64, f64)>>(&mut self, iter: I) {
        for (x, y) in iter {
            self.add(x, y);
        }
    }
}

impl AddAssign for RunningRegression {
    fn add_assign(&mut self, other: Self) {
        self.merge_in_place(&other);
    }
}

impl<'a> AddAssign<&'a RunningRegression> for RunningRegression {
    fn add_assign(&mut self, other: &'a RunningRegression) {
        self.merge_in_place(other);
    }
}

/// Serializable snapshot of a [`RunningRegression`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionSummary {
    pub count: u64,
    pub slope: f64,
    pub y_intercept: f64,
    pub correlation: f64,
    pub r_squared: f64,
    pub mean_x: f64,
    pub mean_y: f64,
    pub std_dev_x: f64,
    pub std_dev_y: f64,
    /// Absent for an empty accumulator
    pub variance_x: Option<f64>,
    pub variance_y: Option<f64>,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub is_invalid: bool,
}
