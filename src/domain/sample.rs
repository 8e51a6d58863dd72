// ============================================================
// Layer 3 — Sample Domain Types
// ============================================================
// A Sample pairs a line image on disk with its transcript.
// An EncodedSample is the same pair after the per-sample
// transform: a normalised, resized, transposed image buffer
// and the label as vocabulary ids.
//
//   Sample         (image_path, label_text)
//        │  data::transform::SampleTransform
//        ▼
//   EncodedSample  (image [W × H], label ids)
//
// Reference: Rust Book §5 (Structs)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::error::{PipelineError, Result};

/// A line image paired with its transcript text.
/// Only constructed through `Sample::new`, which rejects labels
/// that are empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub image_path: PathBuf,
    pub label:      String,
}

impl Sample {
    /// The stored label is trimmed.
    pub fn new(image_path: impl Into<PathBuf>, label: &str) -> Result<Self> {
        let image_path = image_path.into();
        let label = label.trim();
        if label.is_empty() {
            return Err(PipelineError::data(format!(
                "empty label for '{}'",
                image_path.display()
            )));
        }
        Ok(Self { image_path, label: label.to_string() })
    }
}

/// A sample ready for batching.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSample {
    /// Pixel values in [0, 1], width-major: index = x * height + y
    pub image:  Vec<f32>,
    /// Leading (time) axis of `image`
    pub width:  usize,
    /// Trailing axis of `image`
    pub height: usize,
    /// Vocabulary ids, never empty
    pub label:  Vec<u32>,
}

impl EncodedSample {
    pub fn label_len(&self) -> usize {
        self.label.len()
    }

    /// Pixel at column `x`, row `y` of the original orientation.
    pub fn pixel(&self, x: usize, y: usize) -> f32 {
        self.image[x * self.height + y]
    }
}
