// ============================================================
// Layer 6 — Score Logger
// ============================================================
// Writes per-document error rates to a CSV file so a scoring run
// can be inspected or plotted later.
//
// Output file: <dir>/scores.csv
//
//   document,cer,wer
//   page_1/line_1.txt,0.090909,0.500000
//   page_1/line_2.txt,0.000000,0.000000
//   ...
//   mean,0.045455,0.250000
//
// Each run truncates the file; rows are appended as documents
// are logged and the mean row closes the file.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::eval::scorer::{CorpusScore, EditDistanceResult};

pub struct ScoreLogger {
    csv_path: PathBuf,
}

impl ScoreLogger {
    /// Create the directory and write a fresh header row.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("scores.csv");
        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "document,cer,wer")?;
        tracing::debug!("Created score CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    pub fn log(&self, document: &Path, score: &EditDistanceResult) -> Result<()> {
        self.append(&csv_field(&document.to_string_lossy()), score)
    }

    /// Log every document of a corpus followed by the mean row.
    pub fn log_corpus(&self, corpus: &CorpusScore) -> Result<()> {
        for doc in &corpus.documents {
            self.log(&doc.document, &doc.score)?;
        }
        self.append("mean", &corpus.mean)
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    fn append(&self, label: &str, score: &EditDistanceResult) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;
        writeln!(f, "{},{:.6},{:.6}", label, score.cer, score.wer)?;
        Ok(())
    }
}

/// Quote a field when it holds a comma or a quote.
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::scorer::DocumentScore;

    #[test]
    fn test_csv_rows() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = ScoreLogger::new(dir.path()).unwrap();
        let corpus = CorpusScore {
            documents: vec![DocumentScore {
                document: PathBuf::from("p1/a.txt"),
                score:    EditDistanceResult { cer: 0.5, wer: 1.0 },
            }],
            skipped:    0,
            unreadable: 0,
            mean:       EditDistanceResult { cer: 0.5, wer: 1.0 },
        };
        logger.log_corpus(&corpus).unwrap();

        let text = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![
            "document,cer,wer",
            "p1/a.txt,0.500000,1.000000",
            "mean,0.500000,1.000000",
        ]);
    }

    #[test]
    fn test_new_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let first = ScoreLogger::new(dir.path()).unwrap();
        first.log(Path::new("x.txt"), &EditDistanceResult { cer: 0.0, wer: 0.0 }).unwrap();

        let second = ScoreLogger::new(dir.path()).unwrap();
        let text = fs::read_to_string(second.csv_path()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain.txt"), "plain.txt");
        assert_eq!(csv_field("a,b.txt"), "\"a,b.txt\"");
    }
}
