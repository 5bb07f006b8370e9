//! Export estimation results.
//!
//! - scores CSV: one row per candidate, ranked (spreadsheet friendly)
//! - estimate JSON: best candidate, run settings and the full ranking

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::{EstimatorConfig, NodeId, SourceEstimate};
use crate::error::AppError;

/// Write the ranked scores to a CSV file.
pub fn write_scores_csv(path: &Path, estimate: &SourceEstimate) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create scores CSV '{}': {e}", path.display())))?;
    write_scores(&mut file, estimate)
        .map_err(|e| AppError::new(2, format!("Failed to write scores CSV: {e}")))
}

fn write_scores(out: &mut impl Write, estimate: &SourceEstimate) -> std::io::Result<()> {
    writeln!(out, "rank,node,posterior,log_likelihood")?;
    for (i, s) in estimate.scores.iter().enumerate() {
        let ll = estimate
            .log_likelihoods
            .get(&s.node)
            .copied()
            .filter(|v| v.is_finite())
            .map(|v| format!("{v:.10}"))
            .unwrap_or_else(|| "-inf".to_string());
        writeln!(out, "{},{},{:.12e},{}", i + 1, s.node, s.posterior, ll)?;
    }
    Ok(())
}

/// Portable JSON representation of one estimation run.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateFile {
    pub tool: String,
    pub best: NodeId,
    pub reference: NodeId,
    pub reference_strategy: String,
    pub seed: u64,
    pub max_distance: Option<usize>,
    pub out_of_range: usize,
    pub scores: Vec<ScoreRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreRow {
    pub rank: usize,
    pub node: NodeId,
    pub posterior: f64,
    /// `None` when the candidate could not be scored.
    pub log_likelihood: Option<f64>,
}

impl EstimateFile {
    pub fn new(estimate: &SourceEstimate, config: &EstimatorConfig) -> Self {
        let scores = estimate
            .scores
            .iter()
            .enumerate()
            .map(|(i, s)| ScoreRow {
                rank: i + 1,
                node: s.node,
                posterior: s.posterior,
                log_likelihood: estimate
                    .log_likelihoods
                    .get(&s.node)
                    .copied()
                    .filter(|v| v.is_finite()),
            })
            .collect();

        Self {
            tool: "dsrc".to_string(),
            best: estimate.best,
            reference: estimate.reference,
            reference_strategy: config.reference.to_string(),
            seed: config.seed,
            max_distance: config.max_distance,
            out_of_range: estimate.out_of_range,
            scores,
        }
    }
}

/// Write the estimate JSON file.
pub fn write_estimate_json(path: &Path, estimate: &SourceEstimate, config: &EstimatorConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create estimate JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &EstimateFile::new(estimate, config))
        .map_err(|e| AppError::new(2, format!("Failed to write estimate JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::CandidateScore;

    fn estimate() -> SourceEstimate {
        SourceEstimate {
            best: 4,
            scores: vec![
                CandidateScore { node: 4, posterior: 1.0 },
                CandidateScore { node: 2, posterior: 0.0 },
            ],
            reference: 1,
            log_likelihoods: BTreeMap::from([(4, -1.5), (2, f64::NEG_INFINITY)]),
            out_of_range: 0,
        }
    }

    #[test]
    fn scores_csv_marks_impossible_candidates() {
        let mut buf = Vec::new();
        write_scores(&mut buf, &estimate()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "rank,node,posterior,log_likelihood");
        assert!(lines[1].starts_with("1,4,"));
        assert!(lines[2].starts_with("2,2,") && lines[2].ends_with(",-inf"));
    }

    #[test]
    fn estimate_file_serialises_missing_log_likelihood_as_null() {
        let file = EstimateFile::new(&estimate(), &EstimatorConfig::default());
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["best"], 4);
        assert_eq!(json["reference_strategy"], "random");
        assert!(json["scores"][1]["log_likelihood"].is_null());
        assert_eq!(json["scores"][0]["rank"], 1);
    }
}
