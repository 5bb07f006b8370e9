//! Shared estimation pipeline used by the `estimate` and `rank` commands.
//!
//! load graph -> load observations -> load ensemble -> estimate -> (report)

use crate::domain::{Graph, NodeId, ObservationSet, PathLengthEnsemble, RunConfig, SourceEstimate};
use crate::error::AppError;
use crate::estimate::estimate_source;
use crate::io::input::{read_ensemble, read_graph, read_observations};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub graph: Graph,
    pub observations: ObservationSet,
    pub ensemble: PathLengthEnsemble,
    pub estimate: SourceEstimate,
}

/// Load the inputs named in `config` and run the estimator.
pub fn run_estimate(config: &RunConfig) -> Result<RunOutput, AppError> {
    let graph = read_graph(&config.graph_path)?;
    let observations = read_observations(&config.observations_path)?;
    let observers: Vec<NodeId> = observations.keys().copied().collect();
    let ensemble = read_ensemble(&config.ensemble_path, &graph, &observers)?;

    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        observers = observers.len(),
        realisations = ensemble.len(),
        "Inputs loaded"
    );

    run_estimate_with_inputs(config, graph, observations, ensemble)
}

/// Run the estimator on inputs already in memory.
pub fn run_estimate_with_inputs(
    config: &RunConfig,
    graph: Graph,
    observations: ObservationSet,
    ensemble: PathLengthEnsemble,
) -> Result<RunOutput, AppError> {
    let estimate = estimate_source(&graph, &observations, &ensemble, &config.estimator)?;
    Ok(RunOutput {
        graph,
        observations,
        ensemble,
        estimate,
    })
}
