//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the estimation code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::RunOutput;
use crate::domain::{RunConfig, SourceEstimate};

/// Format the run summary (inputs + estimator settings + chosen source).
pub fn format_run_summary(run: &RunOutput, config: &RunConfig) -> String {
    let est = &run.estimate;
    let mut out = String::new();

    out.push_str("=== dsrc - Diffusion Source Estimate ===\n");
    out.push_str(&format!(
        "Graph: nodes={} edges={}\n",
        run.graph.node_count(),
        run.graph.edge_count()
    ));
    out.push_str(&format!(
        "Observers: n={} | time=[{:.3}, {:.3}]\n",
        run.observations.len(),
        run.observations.values().copied().fold(f64::INFINITY, f64::min),
        run.observations.values().copied().fold(f64::NEG_INFINITY, f64::max),
    ));
    out.push_str(&format!("Realisations: {}\n", run.ensemble.len()));

    let max_distance = config
        .estimator
        .max_distance
        .map(|d| d.to_string())
        .unwrap_or_else(|| "inf".to_string());
    out.push_str(&format!(
        "Reference: {} (strategy={}, seed={}) | max_distance={}\n",
        est.reference, config.estimator.reference, config.estimator.seed, max_distance
    ));

    let candidates = est.scores.len();
    let feasible = est.feasible_count();
    out.push_str(&format!(
        "Candidates: n={} | scored={} | impossible={} (out of range={})\n",
        candidates,
        feasible,
        candidates - feasible,
        est.out_of_range
    ));

    out.push_str(&format!(
        "\nEstimated source: {} (posterior={:.4})\n\n",
        est.best,
        est.posterior_of(est.best).unwrap_or(0.0)
    ));

    out
}

/// Format the top-N ranking table.
pub fn format_rankings(estimate: &SourceEstimate, top_n: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("Top {} candidates:\n", top_n.min(estimate.scores.len())));
    out.push_str(format!("{:>5} {:>10} {:>14} {:>16}", "rank", "node", "posterior", "log_lik").trim_end());
    out.push('\n');
    out.push_str(format!("{:->5} {:->10} {:->14} {:->16}", "", "", "", "").trim_end());
    out.push('\n');

    for (i, s) in estimate.scores.iter().take(top_n).enumerate() {
        let ll = estimate
            .log_likelihoods
            .get(&s.node)
            .copied()
            .unwrap_or(f64::NEG_INFINITY);
        out.push_str(
            format!(
                "{:>5} {:>10} {:>14} {:>16}",
                i + 1,
                s.node,
                fmt_prob(s.posterior),
                fmt_ll(ll)
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_prob(p: f64) -> String {
    if p != 0.0 && p < 1e-4 {
        format!("{p:.3e}")
    } else {
        format!("{p:.6}")
    }
}

fn fmt_ll(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.4}")
    } else {
        "-inf".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::CandidateScore;

    #[test]
    fn rankings_table_lists_top_n() {
        let estimate = SourceEstimate {
            best: 3,
            scores: vec![
                CandidateScore { node: 3, posterior: 0.7 },
                CandidateScore { node: 5, posterior: 0.3 },
                CandidateScore { node: 9, posterior: 0.0 },
            ],
            reference: 1,
            log_likelihoods: BTreeMap::from([(3, -2.0), (5, -2.8473), (9, f64::NEG_INFINITY)]),
            out_of_range: 0,
        };

        let table = format_rankings(&estimate, 2);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Top 2 candidates:");
        assert_eq!(lines.len(), 5);
        assert!(lines[3].contains("0.700000") && lines[3].contains("-2.0000"));
        assert!(!table.contains("-inf"));

        let all = format_rankings(&estimate, 10);
        assert!(all.starts_with("Top 3 candidates:"));
        assert!(all.contains("-inf"));
    }

    #[test]
    fn tiny_probabilities_use_scientific_notation() {
        assert_eq!(fmt_prob(0.0), "0.000000");
        assert!(fmt_prob(1e-9).contains('e'));
    }
}
