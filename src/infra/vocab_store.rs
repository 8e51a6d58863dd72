// ============================================================
// Layer 6 — Vocabulary Store
// ============================================================
// Persists the character vocabulary next to the assembled
// dataset so a model runtime (and later decoding) uses exactly
// the ids the labels were encoded with.
//
// File: <dir>/vocabulary.json
//
//   {
//     "chars":    ["a", "b"],
//     "blank_id": 2,
//     "blank":    "<blank>"
//   }
//
// On load the vocabulary is rebuilt from `chars` and the stored
// blank id is checked against it, so a hand-edited file cannot
// silently shift ids.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::domain::vocabulary::{Vocabulary, BLANK_TOKEN};

#[derive(Debug, Serialize, Deserialize)]
struct VocabularyRecord {
    chars:    Vec<char>,
    blank_id: u32,
    blank:    String,
}

pub struct VocabularyStore {
    dir: PathBuf,
}

impl VocabularyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join("vocabulary.json")
    }

    pub fn save(&self, vocab: &Vocabulary) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let record = VocabularyRecord {
            chars:    vocab.chars().to_vec(),
            blank_id: vocab.blank_id(),
            blank:    BLANK_TOKEN.to_string(),
        };
        let path = self.path();
        fs::write(&path, serde_json::to_string_pretty(&record)?)
            .with_context(|| format!("Cannot write vocabulary to '{}'", path.display()))?;

        tracing::info!(
            "Saved vocabulary ({} characters, blank_id={}) to '{}'",
            vocab.char_count(), vocab.blank_id(), path.display()
        );
        Ok(())
    }

    pub fn load(&self) -> Result<Vocabulary> {
        let path = self.path();
        let json = fs::read_to_string(&path)
            .with_context(|| format!(
                "Cannot read vocabulary from '{}'. Have you run 'assemble' first?",
                path.display()
            ))?;
        let record: VocabularyRecord = serde_json::from_str(&json)
            .with_context(|| format!("Malformed vocabulary file '{}'", path.display()))?;

        let vocab = Vocabulary::from_chars(record.chars);
        if vocab.blank_id() != record.blank_id {
            bail!(
                "Vocabulary file '{}' records blank_id {} but its characters give {}",
                path.display(), record.blank_id, vocab.blank_id()
            );
        }
        Ok(vocab)
    }
}
