// ============================================================
// Layer 4 — Vocabulary Builder
// ============================================================
// One blocking pass over the whole transcript corpus:
//
//   gt_root/**/*.txt  → every character (whitespace included)
//                     → sorted distinct set
//                     → Vocabulary (ids 0..N-1, blank = N)
//
// This must finish before any sample is encoded: the mapping has
// to be complete and fixed for every sample of the run. A file
// that cannot be read therefore fails the whole pass instead of
// silently shrinking the alphabet.
//
// Reference: Rust Book §8 (Collections)

use std::{collections::BTreeSet, fs, path::PathBuf};

use crate::data::loader::find_files;
use crate::domain::error::{PipelineError, Result};
use crate::domain::vocabulary::Vocabulary;

pub struct VocabularyBuilder {
    root: PathBuf,
}

impl VocabularyBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn build(&self) -> Result<Vocabulary> {
        let files = find_files(&self.root, "txt")?;
        let mut chars = BTreeSet::new();

        for path in &files {
            let text = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
            chars.extend(text.chars());
        }

        if chars.is_empty() {
            return Err(PipelineError::data(format!(
                "no characters in {} transcript files under '{}'",
                files.len(),
                self.root.display()
            )));
        }

        let vocab = Vocabulary::from_chars(chars);
        tracing::info!(
            "Vocabulary built from {} files: {} characters + blank (blank_id={})",
            files.len(),
            vocab.char_count(),
            vocab.blank_id()
        );
        Ok(vocab)
    }
}
