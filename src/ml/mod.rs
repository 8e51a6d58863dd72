// ============================================================
// Layer 5 — ML Boundary (Burn)
// ============================================================
// The only layer that creates Burn tensors. The network and its
// training loop live in the external model runtime; this layer
// hands it what CTC training needs and turns its output back
// into text:
//
//   batcher.rs — Burn Batcher: EncodedSamples → CtcBatch tensors
//   ctc.rs     — input/label lengths per batch, greedy decoding
//
// Reference: Burn Book §3 (Tensors), §4 (Batcher)

/// Burn Batcher producing image and label tensors
pub mod batcher;

/// CTC length derivation and greedy decoding
pub mod ctc;
