//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the graph and observation inputs (`Graph`, `ObservationSet`)
//! - the path-length ensemble consumed by the delay model
//! - estimator configuration (`EstimatorConfig`, `ReferenceStrategy`)
//! - estimation outputs (`SourceEstimate`, `CandidateScore`)

pub mod types;

pub use types::*;
