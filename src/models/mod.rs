//! Gaussian tree delay model collaborators.
//!
//! The estimator never looks inside a `PathLengthEnsemble`; it only goes
//! through the functions here:
//!
//! - `tree`: mean path lengths, per-candidate mean vector and covariance
//! - `paths`: build an ensemble from per-realisation edge delays (Dijkstra)

pub mod paths;
pub mod tree;

pub use paths::*;
pub use tree::*;
