//! End-to-end source estimation for one set of observations.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::domain::{EstimatorConfig, Graph, NodeId, ObservationSet, PathLengthEnsemble, SourceEstimate};
use crate::error::EstimationError;
use crate::estimate::evaluator::CandidateModel;
use crate::estimate::posterior::{posterior_from_log_likelihood, rank_candidates};
use crate::estimate::reference::select_reference;
use crate::models::compute_mean_shortest_path;

/// Estimate the diffusion source from observer arrival times.
///
/// Every non-observer node is a candidate. Candidates that cannot be scored
/// (too few usable observers, singular covariance, outside `max_distance`)
/// get log-likelihood `-inf` and posterior 0 but stay in the ranking.
///
/// # Errors
/// Fails on invalid input (fewer than 2 observers, observers outside the
/// graph, non-finite times, no candidates) or when no candidate can be scored.
pub fn estimate_source(
    graph: &Graph,
    observations: &ObservationSet,
    ensemble: &PathLengthEnsemble,
    config: &EstimatorConfig,
) -> Result<SourceEstimate, EstimationError> {
    config.validate()?;
    validate_observations(graph, observations)?;

    let candidates: Vec<NodeId> = graph
        .nodes()
        .into_iter()
        .filter(|n| !observations.contains_key(n))
        .collect();
    if candidates.is_empty() {
        return Err(EstimationError::NoCandidates);
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let selection = select_reference(observations, config.reference, &mut rng)?;

    let (in_range, out_of_range) = split_by_distance(graph, observations, &candidates, config.max_distance);

    tracing::info!(
        observers = selection.observers.len(),
        candidates = candidates.len(),
        evaluated = in_range.len(),
        reference = selection.reference,
        realisations = ensemble.len(),
        "Estimating diffusion source"
    );
    if !out_of_range.is_empty() {
        tracing::debug!(
            skipped = out_of_range.len(),
            max_distance = config.max_distance,
            "Candidates beyond max distance scored as impossible"
        );
    }

    let mean = compute_mean_shortest_path(ensemble);
    let model = CandidateModel {
        ensemble,
        mean: &mean,
        observations,
        observers: &selection.observers,
        reference: selection.reference,
        min_selected_observers: config.min_selected_observers,
    };
    let results = model.evaluate_all(&in_range, config.parallel);

    let log_likelihoods: BTreeMap<NodeId, f64> = out_of_range
        .iter()
        .map(|&n| (n, f64::NEG_INFINITY))
        .chain(results.into_iter().map(|(n, result)| match result {
            Ok(ll) => (n, ll),
            Err(e) => {
                if e.is_per_candidate() {
                    tracing::debug!(candidate = n, error = %e, "Candidate scored as impossible");
                } else {
                    tracing::warn!(candidate = n, error = %e, "Unexpected candidate failure");
                }
                (n, f64::NEG_INFINITY)
            }
        }))
        .collect();

    let posterior = posterior_from_log_likelihood(&log_likelihoods)?;
    let scores = rank_candidates(&posterior);
    let best = scores.first().map(|s| s.node).ok_or(EstimationError::NoCandidates)?;

    let estimate = SourceEstimate {
        best,
        scores,
        reference: selection.reference,
        log_likelihoods,
        out_of_range: out_of_range.len(),
    };
    tracing::info!(
        best = estimate.best,
        feasible = estimate.feasible_count(),
        infeasible = candidates.len() - estimate.feasible_count(),
        "Source estimate ready"
    );
    Ok(estimate)
}

fn validate_observations(graph: &Graph, observations: &ObservationSet) -> Result<(), EstimationError> {
    if observations.len() < 2 {
        return Err(EstimationError::InsufficientObservers {
            found: observations.len(),
        });
    }
    for (&node, &t) in observations {
        if !graph.contains_node(node) {
            return Err(EstimationError::UnknownObserver(node));
        }
        if !t.is_finite() {
            return Err(EstimationError::NonFiniteObservation(node));
        }
    }
    Ok(())
}

/// Split candidates by hop distance to the nearest observer.
///
/// Without a cutoff every candidate is in range. With one, candidates not
/// connected to any observer are out of range too.
fn split_by_distance(
    graph: &Graph,
    observations: &ObservationSet,
    candidates: &[NodeId],
    max_distance: Option<usize>,
) -> (Vec<NodeId>, Vec<NodeId>) {
    let Some(max_distance) = max_distance else {
        return (candidates.to_vec(), Vec::new());
    };

    let hops = graph.hop_distances_from(observations.keys().copied());
    candidates
        .iter()
        .copied()
        .partition(|n| hops.get(n).is_some_and(|&d| d <= max_distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReferenceStrategy;

    // Star: hub 0, leaves 1..=4, plus a tail 4 - 5 - 6.
    fn star_graph() -> Graph {
        Graph::from_parts([], [(0, 1), (0, 2), (0, 3), (0, 4), (4, 5), (5, 6)])
    }

    // Lengths from observers 1, 2, 3 to hub 0 and to node 5, with noise.
    fn star_ensemble() -> PathLengthEnsemble {
        let noise = [[0.1, -0.2, 0.05], [-0.1, 0.15, -0.05], [0.2, 0.0, -0.1], [-0.2, 0.05, 0.1]];
        let realisations: Vec<BTreeMap<NodeId, BTreeMap<NodeId, f64>>> = noise
            .iter()
            .map(|eps| {
                [1, 2, 3]
                    .iter()
                    .zip(eps.iter())
                    .map(|(&o, &e)| {
                        let to_hub = 1.0 + e;
                        (o, BTreeMap::from([(0, to_hub), (4, to_hub + 1.0), (5, to_hub + 2.0)]))
                    })
                    .collect()
            })
            .collect();
        PathLengthEnsemble::new(realisations)
    }

    fn config() -> EstimatorConfig {
        EstimatorConfig {
            reference: ReferenceStrategy::Earliest,
            ..EstimatorConfig::default()
        }
    }

    #[test]
    fn candidates_behind_the_hub_are_indistinguishable() {
        let observations: ObservationSet = [(1, 1.0), (2, 1.0), (3, 1.0)].into_iter().collect();
        let est = estimate_source(&star_graph(), &observations, &star_ensemble(), &config()).unwrap();

        assert_eq!(est.reference, 1);
        // Candidates are all non-observers; 6 is never reached by the ensemble.
        let nodes: Vec<NodeId> = est.scores.iter().map(|s| s.node).collect();
        assert_eq!(nodes.len(), 4);
        for n in [0, 4, 5, 6] {
            assert!(nodes.contains(&n));
        }
        assert_eq!(est.posterior_of(6), Some(0.0));
        assert_eq!(est.log_likelihoods[&6], f64::NEG_INFINITY);

        // Every path from an observer to 0, 4 or 5 goes through the hub, so
        // the relative delays carry no information to separate them.
        for n in [0, 4, 5] {
            let p = est.posterior_of(n).unwrap();
            assert!((p - 1.0 / 3.0).abs() < 1e-9, "node {n}: {p}");
        }
        let total: f64 = est.scores.iter().map(|s| s.posterior).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(est.best, est.scores[0].node);
        assert!([0, 4, 5].contains(&est.best));
    }

    #[test]
    fn max_distance_filters_far_candidates() {
        let observations: ObservationSet = [(1, 1.0), (2, 1.0), (3, 1.0)].into_iter().collect();
        let cfg = EstimatorConfig {
            max_distance: Some(2),
            ..config()
        };
        let est = estimate_source(&star_graph(), &observations, &star_ensemble(), &cfg).unwrap();
        // Node 5 is 3 hops from the nearest observer, node 6 is 4.
        assert_eq!(est.out_of_range, 2);
        assert_eq!(est.posterior_of(5), Some(0.0));
        assert_eq!(est.scores.len(), 4);
    }

    #[test]
    fn collinear_candidate_is_impossible_while_siblings_score() {
        // Node 7 hangs off the graph; its relative delays are (e, 2e) in every
        // realisation, so its covariance has rank one. Dyadic e keeps it exact.
        let mut graph = star_graph();
        graph.add_edge(6, 7);
        let mut ensemble = star_ensemble();
        for (r, e) in ensemble.realisations.iter_mut().zip([0.5, -0.25, 0.125, -0.5]) {
            r.get_mut(&1).unwrap().insert(7, 1.0);
            r.get_mut(&2).unwrap().insert(7, 1.0 + e);
            r.get_mut(&3).unwrap().insert(7, 1.0 + 2.0 * e);
        }
        let observations: ObservationSet = [(1, 1.0), (2, 1.2), (3, 1.1)].into_iter().collect();

        let est = estimate_source(&graph, &observations, &ensemble, &config()).unwrap();

        assert_eq!(est.reference, 1);
        assert_eq!(est.log_likelihoods[&7], f64::NEG_INFINITY);
        assert_eq!(est.posterior_of(7), Some(0.0));
        for n in [0, 4, 5] {
            assert!(est.log_likelihoods[&n].is_finite(), "node {n}");
        }
        assert!([0, 4, 5].contains(&est.best));
    }

    #[test]
    fn rejects_too_few_observers() {
        let observations: ObservationSet = [(1, 1.0)].into_iter().collect();
        assert_eq!(
            estimate_source(&star_graph(), &observations, &star_ensemble(), &config()).unwrap_err(),
            EstimationError::InsufficientObservers { found: 1 }
        );
    }

    #[test]
    fn rejects_observers_outside_graph_and_bad_times() {
        let observations: ObservationSet = [(1, 1.0), (77, 1.0)].into_iter().collect();
        assert_eq!(
            estimate_source(&star_graph(), &observations, &star_ensemble(), &config()).unwrap_err(),
            EstimationError::UnknownObserver(77)
        );

        let observations: ObservationSet = [(1, 1.0), (2, f64::NAN)].into_iter().collect();
        assert_eq!(
            estimate_source(&star_graph(), &observations, &star_ensemble(), &config()).unwrap_err(),
            EstimationError::NonFiniteObservation(2)
        );
    }

    #[test]
    fn rejects_graph_without_candidates() {
        let g = Graph::from_parts([], [(1, 2)]);
        let observations: ObservationSet = [(1, 0.0), (2, 1.0)].into_iter().collect();
        assert_eq!(
            estimate_source(&g, &observations, &star_ensemble(), &config()).unwrap_err(),
            EstimationError::NoCandidates
        );
    }

    #[test]
    fn empty_ensemble_has_no_feasible_candidate() {
        let observations: ObservationSet = [(1, 1.0), (2, 1.0), (3, 1.0)].into_iter().collect();
        assert_eq!(
            estimate_source(&star_graph(), &observations, &PathLengthEnsemble::default(), &config())
                .unwrap_err(),
            EstimationError::NoFeasibleCandidate
        );
    }
}
