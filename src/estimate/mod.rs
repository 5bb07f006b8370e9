//! Source estimation.
//!
//! Responsibilities:
//!
//! - pick the reference observer (time origin)
//! - score every candidate with the Gaussian tree model (parallel)
//! - normalise log-likelihoods into posteriors and rank candidates

pub mod estimator;
pub mod evaluator;
pub mod posterior;
pub mod reference;

pub use estimator::*;
pub use evaluator::*;
pub use posterior::*;
pub use reference::*;
