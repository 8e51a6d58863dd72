// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from line images + transcripts on disk to padded
// batches ready for the model runtime.
//
// The pipeline flows in this order:
//
//   gt_root/**/*.txt
//       │
//       ▼
//   VocabularyBuilder → sorted character set + blank (barrier:
//       │               finishes before any encoding)
//       ▼
//   SampleLoader      → join line images with transcripts,
//       │               drop missing/blank ones, report counts
//       ▼
//   split_train_val   → seeded train/validation split
//       │
//       ▼
//   LineDataset       → implements Burn's Dataset trait
//       │
//       ▼
//   DatasetAssembler  → shuffle buffer → parallel SampleTransform
//       │               → LineBatcher
//       ▼
//   Batch             → images [B, W, H, 1], labels [B, Lmax]
//
// Each module is responsible for exactly one step.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Builds the Vocabulary from the transcript corpus
pub mod vocab_builder;

/// Pairs line images with transcripts (join-then-filter)
pub mod loader;

/// Decode, normalise, resize, transpose and encode one sample
pub mod transform;

/// Bounded approximate shuffle
pub mod shuffle;

/// Implements Burn's Dataset trait over discovered samples
pub mod dataset;

/// Pads and stacks encoded samples into a Batch
pub mod batcher;

/// Seeded train/validation split
pub mod splitter;

/// Lazy, restartable stream of batches
pub mod assembler;
