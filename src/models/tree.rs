//! Per-candidate model inputs for the Gaussian tree delay model.
//!
//! With candidate `s` as the source, the arrival time at observer `o` is the
//! length of the path `s -> o`. Relative to the reference observer `r`:
//!
//! ```text
//! d_o(s) = L(o, s) - L(r, s)
//! ```
//!
//! The mean vector is built from the ensemble-averaged lengths and the
//! covariance from the per-realisation spread of `d_o(s)`.

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};

use crate::domain::{NodeId, PathLengthEnsemble};
use crate::error::EstimationError;

/// Observer → node → mean path length across realisations.
pub type MeanPathLengths = BTreeMap<NodeId, BTreeMap<NodeId, f64>>;

/// Average each (observer, node) length over the realisations where the pair
/// is connected. Pairs never connected are left out.
pub fn compute_mean_shortest_path(ensemble: &PathLengthEnsemble) -> MeanPathLengths {
    let mut sums: BTreeMap<NodeId, BTreeMap<NodeId, (f64, usize)>> = BTreeMap::new();
    for realisation in &ensemble.realisations {
        for (&observer, lengths) in realisation {
            let row = sums.entry(observer).or_default();
            for (&node, &len) in lengths {
                if !len.is_finite() {
                    continue;
                }
                let acc = row.entry(node).or_insert((0.0, 0));
                acc.0 += len;
                acc.1 += 1;
            }
        }
    }

    sums.into_iter()
        .map(|(observer, row)| {
            let means = row
                .into_iter()
                .map(|(node, (sum, count))| (node, sum / count as f64))
                .collect();
            (observer, means)
        })
        .collect()
}

/// Mean relative delays for `candidate`, and the observers they refer to.
///
/// `selected` keeps the order of `observers`, skips the reference and every
/// observer with no mean length to the candidate. If the reference itself has
/// no length to the candidate, both outputs are empty.
pub fn mu_vector_s(
    mean: &MeanPathLengths,
    candidate: NodeId,
    observers: &[NodeId],
    reference: NodeId,
) -> (DVector<f64>, Vec<NodeId>) {
    let lookup = |o: NodeId| mean.get(&o).and_then(|row| row.get(&candidate)).copied();

    let Some(ref_len) = lookup(reference) else {
        return (DVector::zeros(0), Vec::new());
    };

    let mut values = Vec::with_capacity(observers.len());
    let mut selected = Vec::with_capacity(observers.len());
    for &o in observers {
        if o == reference {
            continue;
        }
        if let Some(len) = lookup(o) {
            values.push(len - ref_len);
            selected.push(o);
        }
    }

    (DVector::from_vec(values), selected)
}

/// Sample covariance (denominator `n - 1`) of the relative delays of
/// `selected` observers, over realisations where the reference and every
/// selected observer reach `candidate`.
pub fn cov_matrix(
    ensemble: &PathLengthEnsemble,
    selected: &[NodeId],
    candidate: NodeId,
    reference: NodeId,
) -> Result<DMatrix<f64>, EstimationError> {
    let k = selected.len();

    let samples: Vec<DVector<f64>> = (0..ensemble.len())
        .filter_map(|r| {
            let ref_len = ensemble.length(r, reference, candidate)?;
            let deltas: Option<Vec<f64>> = selected
                .iter()
                .map(|&o| ensemble.length(r, o, candidate).map(|len| len - ref_len))
                .collect();
            deltas.map(DVector::from_vec)
        })
        .collect();

    let n = samples.len();
    if n < 2 {
        return Err(EstimationError::DegenerateEnsemble { usable: n });
    }

    let mean = samples
        .iter()
        .fold(DVector::zeros(k), |acc: DVector<f64>, s| acc + s)
        / n as f64;

    let mut cov = DMatrix::zeros(k, k);
    for s in &samples {
        let d = s - &mean;
        cov += &d * d.transpose();
    }
    Ok(cov / (n as f64 - 1.0))
}
