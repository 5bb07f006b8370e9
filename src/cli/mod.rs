//! Command-line parsing for the diffusion source estimator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the estimation code.
//!
//! Options marked with an environment variable can also be set in `.env`
//! (loaded with `dotenvy` before parsing). Flags win over the environment.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::ReferenceStrategy;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dsrc", version, about = "Diffusion source estimator (Gaussian tree delay model)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate the source, print a summary and the ranking, optionally export.
    Estimate(EstimateArgs),
    /// Print the candidate ranking only (useful for scripting).
    Rank(EstimateArgs),
}

/// Common options for estimating and ranking.
#[derive(Debug, Parser, Clone)]
pub struct EstimateArgs {
    /// Graph JSON (`{"nodes": [...], "edges": [[u, v], ...]}`).
    #[arg(short = 'g', long, value_name = "JSON")]
    pub graph: PathBuf,

    /// Observations JSON (`{"<node>": time, ...}`).
    #[arg(short = 'o', long, value_name = "JSON")]
    pub observations: PathBuf,

    /// Ensemble JSON (`realisations` path lengths or per-realisation edge `delays`).
    #[arg(short = 'e', long, value_name = "JSON")]
    pub ensemble: PathBuf,

    /// Only score candidates within this many hops of an observer.
    #[arg(long, env = "DSRC_MAX_DISTANCE")]
    pub max_distance: Option<usize>,

    /// Reference observer: `random`, `earliest`, or a node id.
    #[arg(long, env = "DSRC_REFERENCE", default_value_t = ReferenceStrategy::Random)]
    pub reference: ReferenceStrategy,

    /// Random seed for the reference observer draw.
    #[arg(long, env = "DSRC_SEED", default_value_t = 42)]
    pub seed: u64,

    /// Minimum usable non-reference observers per candidate.
    #[arg(long, default_value_t = 2)]
    pub min_observers: usize,

    /// Evaluate candidates on a single thread.
    #[arg(long)]
    pub sequential: bool,

    /// Show top-N candidates.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Export ranked scores to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the estimate (settings + ranking) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_estimate_with_defaults() {
        let cli = Cli::try_parse_from([
            "dsrc", "estimate", "-g", "g.json", "-o", "o.json", "-e", "e.json",
        ])
        .unwrap();
        let Command::Estimate(args) = cli.command else {
            panic!("expected estimate");
        };
        assert_eq!(args.top, 10);
        assert_eq!(args.min_observers, 2);
        assert!(!args.sequential);
    }

    #[test]
    fn parses_reference_strategy() {
        let cli = Cli::try_parse_from([
            "dsrc", "rank", "-g", "g", "-o", "o", "-e", "e", "--reference", "7", "--max-distance", "3",
        ])
        .unwrap();
        let Command::Rank(args) = cli.command else {
            panic!("expected rank");
        };
        assert_eq!(args.reference, ReferenceStrategy::Fixed(7));
        assert_eq!(args.max_distance, Some(3));
    }
}
