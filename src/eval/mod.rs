// ============================================================
// Layer 7 — Evaluation
// ============================================================
// Character and word error rates for transcriptions produced by
// the bootstrap OCR or the trained model.
//
//   distance.rs — Levenshtein distance over any token type
//   scorer.rs   — per-document and corpus CER / WER

pub mod distance;
pub mod scorer;
