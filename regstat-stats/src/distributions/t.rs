//! Student's t distribution (location 0, scale 1)

use super::special::{ln_gamma, regularized_incomplete_beta};
use regstat_core::{Result, StatsError};
use serde::{Deserialize, Serialize};

const MAX_ITERATIONS: usize = 200;
const TOLERANCE: f64 = 1e-13;

/// Student's t distribution with the given degrees of freedom
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StudentT {
    degrees_of_freedom: f64,
}

impl StudentT {
    /// Create a t distribution; `df` must be finite and > 0
    pub fn new(degrees_of_freedom: f64) -> Result<Self> {
        if !(degrees_of_freedom > 0.0) || !degrees_of_freedom.is_finite() {
            return Err(StatsError::domain_error(format!(
                "Student-t requires 0 < df < ∞, got {}",
                degrees_of_freedom
            )));
        }
        Ok(Self { degrees_of_freedom })
    }

    pub fn degrees_of_freedom(&self) -> f64 {
        self.degrees_of_freedom
    }

    // ============ PDF ============

    /// PDF(t) = Γ((ν+1)/2) / (√(νπ) Γ(ν/2)) · (1 + t²/ν)^(-(ν+1)/2)
    pub fn pdf(&self, t: f64) -> f64 {
        let nu = self.degrees_of_freedom;
        let coef = ln_gamma((nu + 1.0) / 2.0) - ln_gamma(nu / 2.0) - 0.5 * (nu * std::f64::consts::PI).ln();
        let term = -(nu + 1.0) / 2.0 * (t * t / nu).ln_1p();
        (coef + term).exp()
    }

    // ============ CDF ============

    /// P(T ≤ t)
    pub fn cdf(&self, t: f64) -> f64 {
        if t.is_nan() {
            return f64::NAN;
        }
        if t == f64::INFINITY {
            return 1.0;
        }
        if t == f64::NEG_INFINITY {
            return 0.0;
        }

        let nu = self.degrees_of_freedom;
        let tail = 0.5 * regularized_incomplete_beta(nu / 2.0, 0.5, nu / (nu + t * t));

        if t >= 0.0 {
            1.0 - tail
        } else {
            tail
        }
    }

    // ============ Inverse ============

    /// Quantile function: the t with `cdf(t) == p`.
    ///
    /// NaN outside [0, 1], -∞ at 0 and +∞ at 1.
    pub fn inverse_cdf(&self, p: f64) -> f64 {
        if p.is_nan() || !(0.0..=1.0).contains(&p) {
            return f64::NAN;
        }
        if p == 0.0 {
            return f64::NEG_INFINITY;
        }
        if p == 1.0 {
            return f64::INFINITY;
        }
        if p == 0.5 {
            return 0.0;
        }
        if p < 0.5 {
            return -self.upper_quantile(1.0 - p);
        }
        self.upper_quantile(p)
    }

    /// Newton-Raphson on [0, hi], falling back to bisection when a step
    /// leaves the bracket. Requires 0.5 < p < 1.
    fn upper_quantile(&self, p: f64) -> f64 {
        let mut lo = 0.0;
        let mut hi = 1.0;
        while self.cdf(hi) < p {
            lo = hi;
            hi *= 2.0;
            if !hi.is_finite() {
                return f64::INFINITY;
            }
        }

        let mut x = normal_quantile_approx(p).clamp(lo, hi);
        for _ in 0..MAX_ITERATIONS {
            let err = self.cdf(x) - p;
            if err == 0.0 {
                return x;
            }
            if err < 0.0 {
                lo = x;
            } else {
                hi = x;
            }

            let pdf = self.pdf(x);
            let newton = x - err / pdf;
            let next = if pdf > 0.0 && newton > lo && newton < hi {
                newton
            } else {
                0.5 * (lo + hi)
            };

            if (next - x).abs() <= TOLERANCE * x.abs().max(1.0) {
                return next;
            }
            x = next;
        }

        x
    }
}

/// Starting point for the quantile search (Abramowitz & Stegun 26.2.23)
fn normal_quantile_approx(p: f64) -> f64 {
    const A: [f64; 3] = [2.515517, 0.802853, 0.010328];
    const B: [f64; 3] = [1.432788, 0.189269, 0.001308];

    let sign = if p < 0.5 { -1.0 } else { 1.0 };
    let tail = if p < 0.5 { p } else { 1.0 - p };
    let t = (-2.0 * tail.ln()).sqrt();
    let num = A[0] + t * (A[1] + t * A[2]);
    let den = 1.0 + t * (B[0] + t * (B[1] + t * B[2]));
    sign * (t - num / den)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_rejects_bad_df() {
        assert!(StudentT::new(0.0).is_err());
        assert!(StudentT::new(-1.0).is_err());
        assert!(StudentT::new(f64::NAN).is_err());
        assert!(StudentT::new(f64::INFINITY).is_err());
        assert_eq!(StudentT::new(3.0).unwrap().degrees_of_freedom(), 3.0);
    }

    #[test]
    fn test_cdf_zero_is_half() {
        let t = StudentT::new(10.0).unwrap();
        assert!(close(t.cdf(0.0), 0.5, 1e-15));
    }

    #[test]
    fn test_cdf_known_values() {
        let t30 = StudentT::new(30.0).unwrap();
        assert!(close(t30.cdf(1.96), 0.970328843551975, 1e-10));

        let t10 = StudentT::new(10.0).unwrap();
        assert!(close(t10.cdf(2.0), 0.963305982614630, 1e-10));

        let t5 = StudentT::new(5.0).unwrap();
        assert!(close(t5.cdf(-1.5), 0.096951840121237, 1e-10));
    }

    #[test]
    fn test_cdf_infinite_arguments() {
        let t = StudentT::new(4.0).unwrap();
        assert_eq!(t.cdf(f64::INFINITY), 1.0);
        assert_eq!(t.cdf(f64::NEG_INFINITY), 0.0);
        assert!(t.cdf(f64::NAN).is_nan());
    }

    #[test]
    fn test_cauchy_cdf() {
        // df = 1 is Cauchy: F(t) = 1/2 + atan(t)/π
        let t = StudentT::new(1.0).unwrap();
        for x in [-3.0, -0.5, 0.7, 4.0] {
            let expected = 0.5 + f64::atan(x) / std::f64::consts::PI;
            assert!(close(t.cdf(x), expected, 1e-12), "x = {}", x);
        }
    }

    #[test]
    fn test_pdf_cauchy() {
        let t = StudentT::new(1.0).unwrap();
        assert!(close(t.pdf(0.0), 1.0 / std::f64::consts::PI, 1e-12));
    }

    #[test]
    fn test_inverse_known_values() {
        let cases = [
            (30.0, 0.975, 2.042272456301238),
            (1.0, 0.975, 12.706204736174694),
            (3.0, 0.975, 3.182446305283708),
            (4.0, 0.975, 2.776445105197793),
            (2.0, 0.95, 2.919985580353724),
        ];
        for (df, p, expected) in cases {
            let t = StudentT::new(df).unwrap();
            let q = t.inverse_cdf(p);
            assert!(close(q, expected, 1e-8), "df = {}, p = {}: {}", df, p, q);
        }
    }

    #[test]
    fn test_inverse_symmetry() {
        let t = StudentT::new(7.0).unwrap();
        assert!(close(t.inverse_cdf(0.025), -t.inverse_cdf(0.975), 1e-10));
        assert_eq!(t.inverse_cdf(0.5), 0.0);
    }

    #[test]
    fn test_inverse_edges() {
        let t = StudentT::new(5.0).unwrap();
        assert_eq!(t.inverse_cdf(0.0), f64::NEG_INFINITY);
        assert_eq!(t.inverse_cdf(1.0), f64::INFINITY);
        assert!(t.inverse_cdf(1.5).is_nan());
        assert!(t.inverse_cdf(-0.1).is_nan());
        assert!(t.inverse_cdf(f64::NAN).is_nan());
    }

    #[test]
    fn test_inverse_roundtrips_cdf() {
        let t = StudentT::new(12.0).unwrap();
        for p in [0.6, 0.9, 0.99, 0.9999] {
            assert!(close(t.cdf(t.inverse_cdf(p)), p, 1e-11), "p = {}", p);
        }
    }
}
