//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - shared read-only across parallel candidate evaluations
//! - loaded from JSON input files
//! - exported with the estimation results

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use petgraph::algo::dijkstra;
use petgraph::graphmap::UnGraphMap;
use serde::{Deserialize, Serialize};

use crate::error::EstimationError;

/// Node identity used throughout the crate.
pub type NodeId = u32;

/// Observer node → first time the diffusion reached it.
///
/// A `BTreeMap` keeps the observer list in ascending node order, which makes
/// every estimation call iterate observers the same way.
pub type ObservationSet = BTreeMap<NodeId, f64>;

/// Undirected, unweighted graph. Read-only to the estimator.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    inner: UnGraphMap<NodeId, ()>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a node list and an edge list.
    ///
    /// Edge endpoints missing from `nodes` are added implicitly.
    pub fn from_parts(
        nodes: impl IntoIterator<Item = NodeId>,
        edges: impl IntoIterator<Item = (NodeId, NodeId)>,
    ) -> Self {
        let mut graph = Self::new();
        for n in nodes {
            graph.add_node(n);
        }
        for (a, b) in edges {
            graph.add_edge(a, b);
        }
        graph
    }

    pub fn add_node(&mut self, node: NodeId) {
        self.inner.add_node(node);
    }

    pub fn add_edge(&mut self, a: NodeId, b: NodeId) {
        self.inner.add_edge(a, b, ());
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.inner.contains_node(node)
    }

    pub fn contains_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.inner.contains_edge(a, b)
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// All nodes in ascending order.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self.inner.nodes().collect();
        nodes.sort_unstable();
        nodes
    }

    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.inner.neighbors(node)
    }

    pub fn as_graphmap(&self) -> &UnGraphMap<NodeId, ()> {
        &self.inner
    }

    /// Hop distance from the nearest of `sources` to every reachable node.
    /// Sources that are not graph nodes are ignored.
    pub fn hop_distances_from(
        &self,
        sources: impl IntoIterator<Item = NodeId>,
    ) -> HashMap<NodeId, usize> {
        let mut nearest: HashMap<NodeId, usize> = HashMap::new();
        for s in sources {
            if !self.contains_node(s) {
                continue;
            }
            for (node, hops) in dijkstra(&self.inner, s, None, |_| 1usize) {
                nearest
                    .entry(node)
                    .and_modify(|d| *d = (*d).min(hops))
                    .or_insert(hops);
            }
        }
        nearest
    }
}

/// Shortest path lengths collected over many simulated diffusions.
///
/// `realisations[k][observer][node]` is the length of the shortest path
/// between `observer` and `node` in realisation `k`. A missing entry means
/// the pair was not connected in that realisation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathLengthEnsemble {
    pub realisations: Vec<BTreeMap<NodeId, BTreeMap<NodeId, f64>>>,
}

impl PathLengthEnsemble {
    pub fn new(realisations: Vec<BTreeMap<NodeId, BTreeMap<NodeId, f64>>>) -> Self {
        Self { realisations }
    }

    pub fn len(&self) -> usize {
        self.realisations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.realisations.is_empty()
    }

    /// Path length between `observer` and `node` in realisation `k`.
    pub fn length(&self, k: usize, observer: NodeId, node: NodeId) -> Option<f64> {
        self.realisations
            .get(k)?
            .get(&observer)?
            .get(&node)
            .copied()
            .filter(|v| v.is_finite())
    }
}

/// How the reference observer (the time origin) is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceStrategy {
    /// Uniform draw from the observer set (seeded).
    #[default]
    Random,
    /// Observer with the smallest arrival time; ties go to the smallest node id.
    Earliest,
    /// Caller-provided observer.
    Fixed(NodeId),
}

impl fmt::Display for ReferenceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceStrategy::Random => write!(f, "random"),
            ReferenceStrategy::Earliest => write!(f, "earliest"),
            ReferenceStrategy::Fixed(node) => write!(f, "{node}"),
        }
    }
}

impl FromStr for ReferenceStrategy {
    type Err = String;

    /// Accepts `random`, `earliest`, or a node id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(ReferenceStrategy::Random),
            "earliest" => Ok(ReferenceStrategy::Earliest),
            other => other
                .parse::<NodeId>()
                .map(ReferenceStrategy::Fixed)
                .map_err(|_| format!("expected 'random', 'earliest' or a node id, got '{s}'")),
        }
    }
}

/// Estimator knobs.
#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    /// Candidates farther than this many hops from every observer are scored
    /// as impossible. `None` disables the cutoff.
    pub max_distance: Option<usize>,
    pub reference: ReferenceStrategy,
    /// Seed for `ReferenceStrategy::Random`.
    pub seed: u64,
    /// Minimum number of usable non-reference observers per candidate.
    pub min_selected_observers: usize,
    /// Evaluate candidates on the rayon pool.
    pub parallel: bool,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            max_distance: None,
            reference: ReferenceStrategy::Random,
            seed: 42,
            min_selected_observers: 2,
            parallel: true,
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<(), EstimationError> {
        if self.min_selected_observers == 0 {
            return Err(EstimationError::InvalidConfig(
                "min_selected_observers must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment and defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub graph_path: PathBuf,
    pub observations_path: PathBuf,
    pub ensemble_path: PathBuf,
    pub estimator: EstimatorConfig,

    pub top_n: usize,
    pub export_scores: Option<PathBuf>,
    pub export_estimate: Option<PathBuf>,
}

/// A candidate and its posterior probability of being the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub node: NodeId,
    pub posterior: f64,
}

/// Output of one estimation call.
#[derive(Debug, Clone)]
pub struct SourceEstimate {
    /// Top-ranked candidate.
    pub best: NodeId,
    /// Every non-observer node, ranked by posterior (descending).
    pub scores: Vec<CandidateScore>,
    /// Reference observer used for this call.
    pub reference: NodeId,
    /// Raw log-likelihoods (`-inf` for impossible candidates).
    pub log_likelihoods: BTreeMap<NodeId, f64>,
    /// Candidates skipped by the `max_distance` cutoff.
    pub out_of_range: usize,
}

impl SourceEstimate {
    pub fn posterior_of(&self, node: NodeId) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.node == node)
            .map(|s| s.posterior)
    }

    /// Number of candidates with a finite log-likelihood.
    pub fn feasible_count(&self) -> usize {
        self.log_likelihoods
            .values()
            .filter(|v| v.is_finite())
            .count()
    }
}
