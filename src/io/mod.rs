//! Input/output helpers.
//!
//! - JSON inputs: graph, observations, path-length ensemble (`input`)
//! - result exports: scores CSV, estimate JSON (`export`)

pub mod export;
pub mod input;

pub use export::*;
pub use input::*;
