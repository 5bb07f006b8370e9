//! JSON input files.
//!
//! Schemas:
//!
//! ```text
//! graph:         {"nodes": [0, 1, 2], "edges": [[0, 1], [1, 2]]}
//! observations:  {"0": 0.0, "2": 3.5}
//! ensemble:      {"realisations": [{"0": {"1": 1.2, "2": 2.0}}, ...]}
//!            or  {"delays": [[[0, 1, 1.1], [1, 2, 0.9]], ...]}
//! ```
//!
//! A `delays` ensemble lists edge delays per realisation; path lengths from
//! every observer are derived from it with Dijkstra.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::{Graph, NodeId, ObservationSet, PathLengthEnsemble};
use crate::error::AppError;
use crate::models::{DelayRealisation, ensemble_from_delays};

#[derive(Debug, Clone, Deserialize)]
pub struct GraphFile {
    #[serde(default)]
    pub nodes: Vec<NodeId>,
    #[serde(default)]
    pub edges: Vec<(NodeId, NodeId)>,
}

impl GraphFile {
    pub fn into_graph(self) -> Graph {
        Graph::from_parts(self.nodes, self.edges)
    }
}

/// Ensemble file: exactly one of `realisations` (path lengths) or `delays`.
///
/// Not an untagged enum: buffered untagged content does not parse string map
/// keys as node ids.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnsembleFile {
    #[serde(default)]
    pub realisations: Option<Vec<BTreeMap<NodeId, BTreeMap<NodeId, f64>>>>,
    #[serde(default)]
    pub delays: Option<Vec<DelayRealisation>>,
}

impl EnsembleFile {
    /// Resolve into path lengths. `observers` only matters for `delays` files.
    pub fn into_ensemble(self, graph: &Graph, observers: &[NodeId]) -> Result<PathLengthEnsemble, AppError> {
        match (self.realisations, self.delays) {
            (Some(realisations), None) => Ok(PathLengthEnsemble::new(realisations)),
            (None, Some(delays)) => ensemble_from_delays(graph, observers, &delays)
                .map_err(|e| AppError::new(2, format!("Invalid delay ensemble: {e}"))),
            _ => Err(AppError::new(
                2,
                "Ensemble JSON must contain exactly one of 'realisations' or 'delays'.",
            )),
        }
    }
}

pub fn read_graph(path: &Path) -> Result<Graph, AppError> {
    let file: GraphFile = read_json(path, "graph")?;
    let graph = file.into_graph();
    if graph.node_count() == 0 {
        return Err(AppError::new(2, format!("Graph '{}' has no nodes.", path.display())));
    }
    Ok(graph)
}

pub fn read_observations(path: &Path) -> Result<ObservationSet, AppError> {
    read_json(path, "observations")
}

pub fn read_ensemble(path: &Path, graph: &Graph, observers: &[NodeId]) -> Result<PathLengthEnsemble, AppError> {
    let file: EnsembleFile = read_json(path, "ensemble")?;
    file.into_ensemble(graph, observers)
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open {what} JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid {what} JSON '{}': {e}", path.display())))
}
