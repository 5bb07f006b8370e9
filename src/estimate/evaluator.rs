//! Per-candidate likelihood evaluation.
//!
//! For candidate `s`:
//!
//! 1. model inputs: mean vector and covariance over the usable non-reference
//!    observers (`mu_vector_s`, `cov_matrix`)
//! 2. observed relative delays `t_o - t_ref`, in the same observer order
//! 3. multivariate normal log-density of (2) under (1)
//!
//! Evaluations only read shared inputs, so the candidate loop runs on the
//! rayon pool and results are merged afterwards.

use nalgebra::DVector;
use rayon::prelude::*;

use crate::domain::{NodeId, ObservationSet, PathLengthEnsemble};
use crate::error::EstimationError;
use crate::math::log_density;
use crate::models::{MeanPathLengths, cov_matrix, mu_vector_s};

/// Read-only inputs shared by every candidate evaluation of one call.
#[derive(Debug, Clone, Copy)]
pub struct CandidateModel<'a> {
    pub ensemble: &'a PathLengthEnsemble,
    pub mean: &'a MeanPathLengths,
    pub observations: &'a ObservationSet,
    pub observers: &'a [NodeId],
    pub reference: NodeId,
    pub min_selected_observers: usize,
}

impl CandidateModel<'_> {
    /// Log-likelihood of `candidate` being the source.
    pub fn log_likelihood(&self, candidate: NodeId) -> Result<f64, EstimationError> {
        let (mu, selected) = mu_vector_s(self.mean, candidate, self.observers, self.reference);
        let required = self.min_selected_observers.max(1);
        if selected.len() < required {
            return Err(EstimationError::InsufficientSelectedObservers {
                selected: selected.len(),
                required,
            });
        }

        let cov = cov_matrix(self.ensemble, &selected, candidate, self.reference)?;
        let observed = observed_delays(self.observations, &selected, self.reference)?;

        let ll = log_density(&observed, &mu, &cov)?;
        if ll.is_nan() {
            return Err(EstimationError::SingularCovariance);
        }
        Ok(ll)
    }

    /// Score every candidate; output order follows `candidates`.
    pub fn evaluate_all(
        &self,
        candidates: &[NodeId],
        parallel: bool,
    ) -> Vec<(NodeId, Result<f64, EstimationError>)> {
        if parallel {
            candidates
                .par_iter()
                .map(|&s| (s, self.log_likelihood(s)))
                .collect()
        } else {
            candidates
                .iter()
                .map(|&s| (s, self.log_likelihood(s)))
                .collect()
        }
    }
}

/// `t_o - t_ref` for each observer in `selected`, in order.
pub fn observed_delays(
    observations: &ObservationSet,
    selected: &[NodeId],
    reference: NodeId,
) -> Result<DVector<f64>, EstimationError> {
    let t_ref = *observations
        .get(&reference)
        .ok_or(EstimationError::UnknownReference(reference))?;

    let delays = selected
        .iter()
        .map(|o| {
            observations
                .get(o)
                .map(|t| t - t_ref)
                .ok_or_else(|| {
                    EstimationError::DimensionMismatch(format!(
                        "selected observer {o} has no observation"
                    ))
                })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    Ok(DVector::from_vec(delays))
}
