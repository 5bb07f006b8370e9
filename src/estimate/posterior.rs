//! Posterior normalisation and ranking.
//!
//! posterior(s) = exp(ll(s) - logsumexp(ll)). Impossible candidates carry
//! `ll = -inf` and end up with posterior exactly 0.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::{CandidateScore, NodeId};
use crate::error::EstimationError;
use crate::math::log_sum_exp;

/// Normalise a log-likelihood map into posterior probabilities.
///
/// Fails with `NoFeasibleCandidate` when no entry is finite.
pub fn posterior_from_log_likelihood(
    log_likelihoods: &BTreeMap<NodeId, f64>,
) -> Result<BTreeMap<NodeId, f64>, EstimationError> {
    let values: Vec<f64> = log_likelihoods.values().copied().collect();
    let bias = log_sum_exp(&values);
    if !bias.is_finite() {
        return Err(EstimationError::NoFeasibleCandidate);
    }

    Ok(log_likelihoods
        .iter()
        .map(|(&node, &ll)| {
            let p = if ll.is_finite() { (ll - bias).exp() } else { 0.0 };
            (node, p)
        })
        .collect())
}

/// Rank candidates by posterior, highest first.
///
/// The sort is stable, so equal posteriors keep ascending node order.
pub fn rank_candidates(posterior: &BTreeMap<NodeId, f64>) -> Vec<CandidateScore> {
    let mut scores: Vec<CandidateScore> = posterior
        .iter()
        .map(|(&node, &posterior)| CandidateScore { node, posterior })
        .collect();
    scores.sort_by(|a, b| {
        b.posterior
            .partial_cmp(&a.posterior)
            .unwrap_or(Ordering::Equal)
    });
    scores
}

/// 1-based rank of `node` in `scores`.
pub fn rank_of(scores: &[CandidateScore], node: NodeId) -> Option<usize> {
    scores.iter().position(|s| s.node == node).map(|i| i + 1)
}

/// Whether `node` is among the first `k` ranked candidates.
pub fn top_k_contains(scores: &[CandidateScore], node: NodeId, k: usize) -> bool {
    scores.iter().take(k).any(|s| s.node == node)
}
