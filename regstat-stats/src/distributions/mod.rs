//! Continuous distributions used by the significance layer

mod special;
pub mod t;

pub use special::{ln_gamma, regularized_incomplete_beta};
pub use t::StudentT;
