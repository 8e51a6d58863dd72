// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that define what the
// system works with: pages, line images, samples, the
// vocabulary and the error taxonomy.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only plain types and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// Pipeline error taxonomy (Io, Image, Config, Data, Alignment)
pub mod error;

/// Page and line image rasters
pub mod page;

/// Sample and EncodedSample
pub mod sample;

/// Character ↔ id mapping with a reserved CTC blank
pub mod vocabulary;

/// Collaborator seams (binarizer, page source)
pub mod traits;
