//! Observation types shared by the accumulator and significance layers

use serde::{Deserialize, Serialize};

/// Which variable a per-axis statistic refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Predictor
    #[default]
    X,
    /// Response
    Y,
}

/// An `(x, y)` observation tagged with an external identifier.
///
/// Identifiers are opaque and need not be unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedPoint {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

impl IdentifiedPoint {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self { id: id.into(), x, y }
    }

    /// The bare `(x, y)` pair
    pub fn pair(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// True when either coordinate is NaN
    pub fn has_nan(&self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }
}

impl<S: Into<String>> From<(S, f64, f64)> for IdentifiedPoint {
    fn from((id, x, y): (S, f64, f64)) -> Self {
        Self::new(id, x, y)
    }
}
