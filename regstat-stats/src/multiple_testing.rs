//! Benjamini-Hochberg false discovery rate adjustment (q-values)

use crate::significance::{SignificanceEngine, MIN_POINTS_FOR_SLOPE_TEST};
use regstat_core::{Result, StatsError};
use tracing::debug;

fn is_probability(p: f64) -> bool {
    (0.0..=1.0).contains(&p)
}

/// Clamp into [0, 1], mapping anything non-finite to 1
fn clamp_q(q: f64) -> f64 {
    let q = q.clamp(0.0, 1.0);
    if q.is_finite() {
        q
    } else {
        1.0
    }
}

impl SignificanceEngine {
    /// q-value of this engine's slope test within a family of p-values.
    ///
    /// `p_values` holds the p-values of all simultaneous tests; this engine's
    /// own p-value is added when it is not already present (exact match).
    /// Fails below three points or for an empty family. NaN data, NaN or
    /// out-of-range family members, and a NaN own p-value give NaN.
    pub fn q_value(&self, p_values: &[f64]) -> Result<f64> {
        self.require_points("q-value", MIN_POINTS_FOR_SLOPE_TEST)?;

        if self.contains_invalid_data() || p_values.iter().any(|&p| p.is_nan() || !is_probability(p)) {
            debug!("q-value undefined for invalid data or p-values");
            return Ok(f64::NAN);
        }

        if p_values.is_empty() {
            return Err(StatsError::insufficient_data("q-value family", 1, 0));
        }

        let own = self.p_value()?;
        if own.is_nan() {
            return Ok(f64::NAN);
        }

        let mut sorted: Vec<f64> = p_values.iter().copied().filter(|p| !p.is_nan()).collect();
        if !sorted.contains(&own) {
            sorted.push(own);
        }
        sorted.sort_by(f64::total_cmp);

        let m = sorted.len();
        let rank = match sorted.iter().position(|&p| p == own) {
            Some(index) => index + 1,
            None => return Ok(f64::NAN),
        };

        let mut q = own * m as f64 / rank as f64;
        if rank < m {
            // q-values must not decrease with rank
            let next = sorted[rank] * m as f64 / (rank + 1) as f64;
            q = q.min(next);
        }

        Ok(clamp_q(q))
    }

    /// q-value against sibling engines; each contributes its own p-value.
    ///
    /// Errors from any sibling's p-value are propagated.
    pub fn q_value_among(&self, engines: &[&SignificanceEngine]) -> Result<f64> {
        let p_values = engines
            .iter()
            .map(|engine| engine.p_value())
            .collect::<Result<Vec<f64>>>()?;
        self.q_value(&p_values)
    }
}

/// Benjamini-Hochberg q-values for a whole family, in input order.
///
/// Walks ranks from the largest down keeping the running minimum of
/// `p · m / rank`, so the result is monotone in p.
pub fn benjamini_hochberg(p_values: &[f64]) -> Result<Vec<f64>> {
    if p_values.is_empty() {
        return Err(StatsError::insufficient_data("benjamini-hochberg", 1, 0));
    }
    if let Some(bad) = p_values.iter().find(|p| p.is_nan() || !is_probability(**p)) {
        return Err(StatsError::invalid_argument(format!("p-value {} is not in [0, 1]", bad)));
    }

    let m = p_values.len();
    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let mut q_values = vec![0.0; m];
    let mut running_min = f64::INFINITY;
    for (i, &index) in order.iter().enumerate().rev() {
        let rank = (i + 1) as f64;
        running_min = running_min.min(p_values[index] * m as f64 / rank);
        q_values[index] = clamp_q(running_min);
    }

    Ok(q_values)
}
