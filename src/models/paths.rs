//! Path-length ensembles from edge-delay realisations.
//!
//! A realisation assigns a delay to every edge that carried the diffusion.
//! The arrival time at a node is then the shortest weighted path from the
//! source, so one Dijkstra run per observer gives that observer's row.

use std::collections::BTreeMap;

use petgraph::algo::dijkstra;
use petgraph::graphmap::UnGraphMap;
use petgraph::visit::EdgeRef;

use crate::domain::{Graph, NodeId, PathLengthEnsemble};
use crate::error::EstimationError;

/// One realisation: `(a, b, delay)` per edge. Graph edges not listed are not
/// traversable in that realisation.
pub type DelayRealisation = Vec<(NodeId, NodeId, f64)>;

/// Shortest path lengths from every observer, one row set per realisation.
///
/// Observers that are not graph nodes are skipped. Delays must be finite and
/// non-negative, and every listed edge must exist in `graph`.
pub fn ensemble_from_delays(
    graph: &Graph,
    observers: &[NodeId],
    realisations: &[DelayRealisation],
) -> Result<PathLengthEnsemble, EstimationError> {
    let mut out = Vec::with_capacity(realisations.len());

    for delays in realisations {
        let weighted = weighted_graph(graph, delays)?;

        let mut rows = BTreeMap::new();
        for &o in observers {
            if !weighted.contains_node(o) {
                continue;
            }
            let lengths = dijkstra(&weighted, o, None, |e| *e.weight());
            rows.insert(o, lengths.into_iter().collect::<BTreeMap<_, _>>());
        }
        out.push(rows);
    }

    Ok(PathLengthEnsemble::new(out))
}

fn weighted_graph(
    graph: &Graph,
    delays: &[(NodeId, NodeId, f64)],
) -> Result<UnGraphMap<NodeId, f64>, EstimationError> {
    let mut weighted = UnGraphMap::with_capacity(graph.node_count(), delays.len());
    for n in graph.nodes() {
        weighted.add_node(n);
    }
    for &(a, b, delay) in delays {
        if !graph.contains_edge(a, b) {
            return Err(EstimationError::UnknownEdge(a, b));
        }
        if !(delay.is_finite() && delay >= 0.0) {
            return Err(EstimationError::InvalidDelay { a, b, delay });
        }
        weighted.add_edge(a, b, delay);
    }
    Ok(weighted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path4() -> Graph {
        Graph::from_parts([], [(0, 1), (1, 2), (2, 3)])
    }

    #[test]
    fn lengths_follow_weighted_shortest_paths() {
        let g = Graph::from_parts([], [(0, 1), (1, 2), (0, 2)]);
        let delays = vec![vec![(0, 1, 1.0), (1, 2, 1.0), (0, 2, 5.0)]];
        let e = ensemble_from_delays(&g, &[0], &delays).unwrap();
        assert_eq!(e.len(), 1);
        assert_eq!(e.length(0, 0, 0), Some(0.0));
        assert_eq!(e.length(0, 0, 2), Some(2.0));
    }

    #[test]
    fn missing_edges_disconnect_nodes() {
        let delays = vec![vec![(0, 1, 1.0), (2, 3, 1.0)]];
        let e = ensemble_from_delays(&path4(), &[0, 3], &delays).unwrap();
        assert_eq!(e.length(0, 0, 1), Some(1.0));
        assert_eq!(e.length(0, 0, 2), None);
        assert_eq!(e.length(0, 3, 2), Some(1.0));
    }

    #[test]
    fn rejects_bad_delays_and_unknown_edges() {
        let negative = vec![vec![(0, 1, -1.0)]];
        assert!(matches!(
            ensemble_from_delays(&path4(), &[0], &negative),
            Err(EstimationError::InvalidDelay { .. })
        ));

        let unknown = vec![vec![(0, 3, 1.0)]];
        assert_eq!(
            ensemble_from_delays(&path4(), &[0], &unknown).unwrap_err(),
            EstimationError::UnknownEdge(0, 3)
        );
    }
}
