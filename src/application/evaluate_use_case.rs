// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Scores a directory of predicted transcriptions against the
// ground truth and writes the per-document rows to scores.csv.
//
//   Step 1: Walk gt_dir and pair with pred_dir   (Layer 7 - eval)
//   Step 2: CER / WER per document and the mean  (Layer 7 - eval)
//   Step 3: Write scores.csv                     (Layer 6 - infra)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::eval::scorer::{CorpusScore, ErrorScorer};
use crate::infra::metrics::ScoreLogger;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateConfig {
    pub gt_dir:     PathBuf,
    pub pred_dir:   PathBuf,
    pub output_dir: PathBuf,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            gt_dir:     PathBuf::from("data/gt"),
            pred_dir:   PathBuf::from("data/predictions"),
            output_dir: PathBuf::from("data/scores"),
        }
    }
}

pub struct EvaluateUseCase {
    config: EvaluateConfig,
}

impl EvaluateUseCase {
    pub fn new(config: EvaluateConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<CorpusScore> {
        let cfg = &self.config;

        let corpus = ErrorScorer::new(&cfg.gt_dir, &cfg.pred_dir)
            .score()
            .with_context(|| format!(
                "Cannot score '{}' against '{}'",
                cfg.pred_dir.display(),
                cfg.gt_dir.display()
            ))?;

        let logger = ScoreLogger::new(&cfg.output_dir)?;
        logger.log_corpus(&corpus)?;
        tracing::info!("Wrote per-document scores to '{}'", logger.csv_path().display());

        Ok(corpus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scores_written() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = EvaluateConfig {
            gt_dir:     dir.path().join("gt"),
            pred_dir:   dir.path().join("pred"),
            output_dir: dir.path().join("scores"),
        };
        fs::create_dir_all(&cfg.gt_dir).unwrap();
        fs::create_dir_all(&cfg.pred_dir).unwrap();
        fs::write(cfg.gt_dir.join("a.txt"), "hello world\n").unwrap();
        fs::write(cfg.pred_dir.join("a.txt"), "hello wrld").unwrap();

        let corpus = EvaluateUseCase::new(cfg.clone()).execute().unwrap();
        assert!((corpus.mean.wer - 0.5).abs() < 1e-9);

        let csv = fs::read_to_string(cfg.output_dir.join("scores.csv")).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.lines().nth(1).unwrap().starts_with("a.txt,0.090909,"));
    }

    #[test]
    fn test_missing_ground_truth_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = EvaluateConfig {
            gt_dir:     dir.path().join("absent"),
            pred_dir:   dir.path().to_path_buf(),
            output_dir: dir.path().join("scores"),
        };
        assert!(EvaluateUseCase::new(cfg).execute().is_err());
    }
}
