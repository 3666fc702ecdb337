//! regstat Statistics
//!
//! Streaming bivariate linear regression with slope significance testing.
//!
//! - [`RunningRegression`]: O(1) sufficient statistics with merge algebra
//! - [`SignificanceEngine`]: p-value, confidence intervals and margin of
//!   error over retained observations
//! - [`benjamini_hochberg`] and [`SignificanceEngine::q_value`]: false
//!   discovery rate adjustment
//!
//! Requests that are not meaningful (too few points) return
//! [`StatsError`]. Degenerate data never errors: it resolves to NaN, 1, 0 or
//! a collapsed interval.
//!
//! ```
//! use regstat_stats::prelude::*;
//!
//! let engine = SignificanceEngine::from_points(vec![(1.0, 2.0), (2.0, 3.0), (3.0, 5.0), (4.0, 4.0), (5.0, 6.0)]);
//! let p = engine.p_value().unwrap();
//! assert!(p > 0.2 && p < 0.21);
//!
//! let ci = engine.confidence_interval().unwrap();
//! assert!(ci.contains(engine.regression().slope()));
//! ```

mod config;
mod confidence;
pub mod distributions;
mod multiple_testing;
mod running;
mod significance;

pub use config::{SignificanceConfig, DEFAULT_CONFIDENCE_LEVEL};
pub use confidence::{MeanMargin, SlopeInterval, SlopeIntervalDetail};
pub use distributions::StudentT;
pub use multiple_testing::benjamini_hochberg;
pub use regstat_core::{Axis, IdentifiedPoint, Result, StatsError};
pub use running::{RegressionSummary, RunningRegression};
pub use significance::{SignificanceEngine, MIN_POINTS_FOR_SLOPE_TEST};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        benjamini_hochberg, Axis, IdentifiedPoint, MeanMargin, RunningRegression, SignificanceConfig,
        SignificanceEngine, SlopeInterval, SlopeIntervalDetail, StatsError,
    };
}
