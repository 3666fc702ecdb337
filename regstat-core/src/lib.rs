//! regstat Core - Fundamental types
//!
//! This crate provides the types shared across regstat:
//! - `StatsError`: error taxonomy with machine-readable codes
//! - `Axis`: selects the predictor or response variable
//! - `IdentifiedPoint`: an observation carrying an external identifier

mod error;
mod point;

pub use error::{codes, StatsError};
pub use point::{Axis, IdentifiedPoint};

/// Result alias used throughout regstat
pub type Result<T> = std::result::Result<T, StatsError>;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::codes;
    pub use crate::{Axis, IdentifiedPoint, StatsError};
}
