// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// One use case per CLI command. Each one orchestrates the lower
// layers in a fixed order and owns no image, label or scoring
// logic of its own:
//
//   preprocess_use_case.rs — pages → deskewed pages → line images
//   assemble_use_case.rs   — line images + transcripts → batches
//   evaluate_use_case.rs   — predictions + ground truth → CER / WER
//
// Use cases return anyhow::Result so the CLI can print the whole
// context chain of a failure.
//
// Reference: Clean Architecture pattern

// Page deskewing and line segmentation
pub mod preprocess_use_case;

// CTC dataset assembly
pub mod assemble_use_case;

// Transcription scoring
pub mod evaluate_use_case;
