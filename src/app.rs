//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs the tracing subscriber
//! - parses CLI arguments
//! - runs the estimation pipeline
//! - prints reports
//! - writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, EstimateArgs};
use crate::domain::{EstimatorConfig, RunConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `dsrc` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Estimate(args) => handle_estimate(args, OutputMode::Full),
        Command::Rank(args) => handle_estimate(args, OutputMode::RankOnly),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    RankOnly,
}

fn handle_estimate(args: EstimateArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run_estimate(&config)?;

    if mode == OutputMode::Full {
        println!("{}", crate::report::format_run_summary(&run, &config));
    }
    println!("{}", crate::report::format_rankings(&run.estimate, config.top_n));

    if let Some(path) = &config.export_scores {
        crate::io::export::write_scores_csv(path, &run.estimate)?;
        tracing::info!(path = %path.display(), "Scores written");
    }
    if let Some(path) = &config.export_estimate {
        crate::io::export::write_estimate_json(path, &run.estimate, &config.estimator)?;
        tracing::info!(path = %path.display(), "Estimate written");
    }

    Ok(())
}

pub fn run_config_from_args(args: &EstimateArgs) -> RunConfig {
    RunConfig {
        graph_path: args.graph.clone(),
        observations_path: args.observations.clone(),
        ensemble_path: args.ensemble.clone(),
        estimator: estimator_config_from_args(args),
        top_n: args.top,
        export_scores: args.export.clone(),
        export_estimate: args.export_json.clone(),
    }
}

pub fn estimator_config_from_args(args: &EstimateArgs) -> EstimatorConfig {
    EstimatorConfig {
        max_distance: args.max_distance,
        reference: args.reference,
        seed: args.seed,
        min_selected_observers: args.min_observers,
        parallel: !args.sequential,
    }
}

// Logs go to stderr; stdout carries the report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("diffusion_source=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Rewrite argv so `dsrc` defaults to `dsrc estimate`.
///
/// Rules:
/// - `dsrc -g G -o O -e E ...`  -> `dsrc estimate -g G -o O -e E ...`
/// - `dsrc --help/--version/-h` -> unchanged (show top-level help/version)
/// - `dsrc` and subcommands     -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    // If the first token is a flag, treat it as "estimate flags".
    if arg1.starts_with('-') {
        argv.insert(1, "estimate".to_string());
    }
    argv
}
