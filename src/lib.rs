//! `diffusion-source` library crate.
//!
//! Estimates the origin of a diffusion over a graph from observer arrival
//! times, under a Gaussian edge-delay model on the tree rooted at each
//! candidate.
//!
//! The binary (`dsrc`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the estimator can be embedded in batch experiments
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod estimate;
pub mod io;
pub mod math;
pub mod models;
pub mod report;

pub use domain::{EstimatorConfig, Graph, NodeId, ObservationSet, PathLengthEnsemble, ReferenceStrategy, SourceEstimate};
pub use error::{AppError, EstimationError};
pub use estimate::estimate_source;
