// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Files written next to the data so runs can be resumed,
// reproduced and inspected:
//
//   vocab_store.rs — vocabulary.json (character ↔ id mapping)
//   manifest.rs    — manifest.json (config, discovery report,
//                    split and batch counts of an assemble run)
//   metrics.rs     — scores.csv (per-document CER / WER)
//
// Unlike the library layers below, these return anyhow::Result:
// their failures are reported, never absorbed.

/// Vocabulary persistence
pub mod vocab_store;

/// Run manifest persistence
pub mod manifest;

/// Per-document score CSV logger
pub mod metrics;
