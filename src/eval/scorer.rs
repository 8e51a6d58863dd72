// ============================================================
// Layer 7 — Transcription Error Scorer
// ============================================================
// Scores predicted transcriptions against ground truth.
//
//   normalise:  "\n" → " ", then trim both ends
//   CER = lev(gt chars, pred chars) / len(gt chars)
//   WER = lev(gt words, pred words) / len(gt words)
//
// Over a corpus, every .txt under the ground-truth root is paired
// with the file at the same relative path under the prediction
// root. Documents without a prediction are skipped with a warning
// and count toward neither sum; so do documents where either file
// cannot be read. The corpus score is the mean of
// the per-document scores.
//
// CER and WER are ≥ 0 and may exceed 1 when the prediction is
// much longer than the ground truth.

use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::loader::find_files;
use crate::domain::error::{PipelineError, Result};
use crate::eval::distance::levenshtein;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EditDistanceResult {
    pub cer: f64,
    pub wer: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentScore {
    /// Path relative to the ground-truth root.
    pub document: PathBuf,
    pub score:    EditDistanceResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct CorpusScore {
    pub documents:  Vec<DocumentScore>,
    /// Documents without a prediction file
    pub skipped:    usize,
    /// Documents whose ground truth or prediction could not be read
    pub unreadable: usize,
    pub mean:       EditDistanceResult,
}

pub fn normalize(text: &str) -> String {
    text.replace('\n', " ").trim().to_string()
}

/// Score a single document. Both texts are normalised first.
pub fn score_document(ground_truth: &str, prediction: &str) -> Result<EditDistanceResult> {
    let gt   = normalize(ground_truth);
    let pred = normalize(prediction);

    let gt_chars:   Vec<char> = gt.chars().collect();
    let pred_chars: Vec<char> = pred.chars().collect();
    let gt_words:   Vec<&str> = gt.split_whitespace().collect();
    let pred_words: Vec<&str> = pred.split_whitespace().collect();

    // A non-empty normalised string always has at least one word.
    if gt_chars.is_empty() {
        return Err(PipelineError::data("ground truth is empty after normalisation"));
    }

    Ok(EditDistanceResult {
        cer: levenshtein(&gt_chars, &pred_chars) as f64 / gt_chars.len() as f64,
        wer: levenshtein(&gt_words, &pred_words) as f64 / gt_words.len() as f64,
    })
}

pub struct ErrorScorer {
    gt_root:   PathBuf,
    pred_root: PathBuf,
}

impl ErrorScorer {
    pub fn new(gt_root: impl Into<PathBuf>, pred_root: impl Into<PathBuf>) -> Self {
        Self { gt_root: gt_root.into(), pred_root: pred_root.into() }
    }

    pub fn score(&self) -> Result<CorpusScore> {
        let mut documents = Vec::new();
        let mut skipped    = 0usize;
        let mut unreadable = 0usize;

        for gt_path in find_files(&self.gt_root, "txt")? {
            let relative = gt_path
                .strip_prefix(&self.gt_root)
                .unwrap_or(&gt_path)
                .to_path_buf();
            let pred_path = self.pred_root.join(&relative);

            if !pred_path.is_file() {
                tracing::warn!("No prediction for '{}', skipping", relative.display());
                skipped += 1;
                continue;
            }

            let (ground_truth, prediction) = match (read_text(&gt_path), read_text(&pred_path)) {
                (Ok(gt), Ok(pred)) => (gt, pred),
                (Err(e), _) | (_, Err(e)) => {
                    tracing::warn!("Skipping '{}': {}", relative.display(), e);
                    unreadable += 1;
                    continue;
                }
            };
            let score = score_document(&ground_truth, &prediction).map_err(|e| {
                PipelineError::data(format!("{}: {e}", relative.display()))
            })?;

            tracing::debug!(
                "{}: cer={:.4} wer={:.4}",
                relative.display(), score.cer, score.wer
            );
            documents.push(DocumentScore { document: relative, score });
        }

        if documents.is_empty() {
            return Err(PipelineError::data(format!(
                "no documents under '{}' had a prediction under '{}'",
                self.gt_root.display(),
                self.pred_root.display()
            )));
        }

        let n = documents.len() as f64;
        let mean = EditDistanceResult {
            cer: documents.iter().map(|d| d.score.cer).sum::<f64>() / n,
            wer: documents.iter().map(|d| d.score.wer).sum::<f64>() / n,
        };

        tracing::info!(
            "Scored {} documents ({} without prediction, {} unreadable): CER={:.4} WER={:.4}",
            documents.len(), skipped, unreadable, mean.cer, mean.wer
        );

        Ok(CorpusScore { documents, skipped, unreadable, mean })
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  line one\nline two\n"), "line one line two");
    }

    #[test]
    fn test_single_deletion() {
        let s = score_document("hello world", "hello wrld").unwrap();
        assert!(close(s.cer, 1.0 / 11.0));
        assert!(close(s.wer, 0.5));
    }

    #[test]
    fn test_zero_iff_equal() {
        let s = score_document("same text\n", "same text").unwrap();
        assert_eq!(s.cer, 0.0);
        assert_eq!(s.wer, 0.0);

        let s = score_document("same text", "same texts").unwrap();
        assert!(s.cer > 0.0);
    }

    #[test]
    fn test_can_exceed_one() {
        let s = score_document("a", "a much longer guess").unwrap();
        assert!(s.cer > 1.0);
        assert!(s.wer > 1.0);
        let s = score_document("ab", "").unwrap();
        assert!(close(s.cer, 1.0));
    }

    #[test]
    fn test_empty_ground_truth_is_error() {
        assert!(matches!(score_document(" \n ", "x"), Err(PipelineError::Data(_))));
    }

    #[test]
    fn test_corpus_mean_and_missing_prediction() {
        let dir  = tempfile::tempdir().unwrap();
        let gt   = dir.path().join("gt");
        let pred = dir.path().join("pred");
        fs::create_dir_all(gt.join("p1")).unwrap();
        fs::create_dir_all(pred.join("p1")).unwrap();

        fs::write(gt.join("p1/a.txt"), "hello world").unwrap();
        fs::write(pred.join("p1/a.txt"), "hello world").unwrap();
        fs::write(gt.join("p1/b.txt"), "ab").unwrap();
        fs::write(pred.join("p1/b.txt"), "ax").unwrap();
        fs::write(gt.join("p1/c.txt"), "no prediction").unwrap();

        let corpus = ErrorScorer::new(&gt, &pred).score().unwrap();
        assert_eq!(corpus.documents.len(), 2);
        assert_eq!(corpus.skipped, 1);
        assert!(close(corpus.mean.cer, 0.25));
        assert!(close(corpus.mean.wer, 0.5));
        assert_eq!(corpus.documents[0].document, PathBuf::from("p1/a.txt"));
    }

    #[test]
    fn test_unreadable_prediction_is_skipped() {
        let dir  = tempfile::tempdir().unwrap();
        let gt   = dir.path().join("gt");
        let pred = dir.path().join("pred");
        fs::create_dir_all(&gt).unwrap();
        fs::create_dir_all(&pred).unwrap();

        fs::write(gt.join("a.txt"), "hello world").unwrap();
        fs::write(pred.join("a.txt"), "hello wrld").unwrap();
        fs::write(gt.join("b.txt"), "second page").unwrap();
        fs::write(pred.join("b.txt"), [0xff, 0xfe, 0x00]).unwrap();

        let corpus = ErrorScorer::new(&gt, &pred).score().unwrap();
        assert_eq!(corpus.documents.len(), 1);
        assert_eq!(corpus.unreadable, 1);
        assert_eq!(corpus.skipped, 0);
        assert!(close(corpus.mean.wer, 0.5));
    }

    #[test]
    fn test_nothing_scored_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("only.txt"), "text").unwrap();
        let empty = tempfile::tempdir().unwrap();
        let result = ErrorScorer::new(dir.path(), empty.path()).score();
        assert!(matches!(result, Err(PipelineError::Data(_))));
    }
}
