// ============================================================
// Layer 3 — Vocabulary Domain Type
// ============================================================
// An immutable, bidirectional character ↔ id mapping for the
// CTC recognizer.
//
//   ids 0..N-1  → the N distinct characters, sorted by code point
//   id  N       → the reserved CTC blank (never a real character)
//
// The mapping is built once per run (see data::vocab_builder)
// and then passed by reference to every encode call. There is
// no global mapping state.
//
// Encoding is total: a character that was not seen while
// building maps to the blank id instead of failing.
//
// Reference: Graves et al. (2006) Connectionist Temporal Classification

use std::collections::{BTreeSet, HashMap};

/// Display token used for the blank id in logs and persisted files.
pub const BLANK_TOKEN: &str = "<blank>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    /// Distinct characters in id order (sorted by code point)
    chars: Vec<char>,
    /// Reverse lookup: character → id
    index: HashMap<char, u32>,
}

impl Vocabulary {
    /// Build a vocabulary from any set of characters.
    /// Duplicates are removed and the order is fixed by sorting,
    /// so the input order never affects the ids.
    pub fn from_chars(chars: impl IntoIterator<Item = char>) -> Self {
        let distinct: BTreeSet<char> = chars.into_iter().collect();
        let chars: Vec<char> = distinct.into_iter().collect();
        let index = chars
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i as u32))
            .collect();
        Self { chars, index }
    }

    /// Build a vocabulary from a collection of texts.
    pub fn from_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        Self::from_chars(texts.into_iter().flat_map(str::chars))
    }

    /// The reserved blank id: equal to the number of real characters.
    pub fn blank_id(&self) -> u32 {
        self.chars.len() as u32
    }

    /// Number of output classes including the blank.
    pub fn size(&self) -> usize {
        self.chars.len() + 1
    }

    /// Number of real characters (blank excluded).
    pub fn char_count(&self) -> usize {
        self.chars.len()
    }

    /// Characters in id order.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn id_of(&self, c: char) -> Option<u32> {
        self.index.get(&c).copied()
    }

    /// Total lookup: unknown characters map to the blank id.
    pub fn encode_char(&self, c: char) -> u32 {
        self.id_of(c).unwrap_or_else(|| self.blank_id())
    }

    /// Encode a label character by character.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        text.chars().map(|c| self.encode_char(c)).collect()
    }

    /// Map ids back to text. The blank id and ids outside the
    /// vocabulary produce nothing.
    pub fn decode(&self, ids: &[u32]) -> String {
        ids.iter()
            .filter_map(|&id| self.chars.get(id as usize))
            .collect()
    }
}
