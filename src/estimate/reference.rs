//! Reference-observer selection.
//!
//! All relative delays are measured against one observer, which removes the
//! unknown emission time of the source from the model. The choice is a
//! strategy so callers can pin it down (tests, reproducible reports).

use rand::Rng;
use rand::seq::SliceRandom;

use crate::domain::{NodeId, ObservationSet, ReferenceStrategy};
use crate::error::EstimationError;

/// Chosen reference plus the observer list used for the whole call.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSelection {
    pub reference: NodeId,
    /// All observers, ascending node order.
    pub observers: Vec<NodeId>,
}

pub fn select_reference<R: Rng + ?Sized>(
    observations: &ObservationSet,
    strategy: ReferenceStrategy,
    rng: &mut R,
) -> Result<ReferenceSelection, EstimationError> {
    if observations.len() < 2 {
        return Err(EstimationError::InsufficientObservers {
            found: observations.len(),
        });
    }
    let observers: Vec<NodeId> = observations.keys().copied().collect();

    let reference = match strategy {
        ReferenceStrategy::Random => *observers
            .choose(rng)
            .ok_or(EstimationError::InsufficientObservers { found: 0 })?,
        ReferenceStrategy::Earliest => earliest(observations)
            .ok_or(EstimationError::InsufficientObservers { found: 0 })?,
        ReferenceStrategy::Fixed(node) => {
            if !observations.contains_key(&node) {
                return Err(EstimationError::UnknownReference(node));
            }
            node
        }
    };

    Ok(ReferenceSelection {
        reference,
        observers,
    })
}

// Strict `<` keeps the smallest node id among equal times (map order).
fn earliest(observations: &ObservationSet) -> Option<NodeId> {
    let mut best: Option<(NodeId, f64)> = None;
    for (&node, &t) in observations {
        match best {
            Some((_, bt)) if t >= bt => {}
            _ => best = Some((node, t)),
        }
    }
    best.map(|(node, _)| node)
}
