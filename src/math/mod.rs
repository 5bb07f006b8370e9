//! Mathematical utilities: Gaussian log-density and log-sum-exp.

pub mod gaussian;
pub mod logsumexp;

pub use gaussian::*;
pub use logsumexp::*;
