use burn::data::dataset::Dataset;

use crate::domain::sample::Sample;

/// The discovered (image, transcript) pairs of one split.
/// Holds paths and labels only; images are decoded lazily by the
/// assembler.
#[derive(Debug, Clone, Default)]
pub struct LineDataset {
    samples: Vec<Sample>,
}

impl LineDataset {
    pub fn new(samples: Vec<Sample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    pub fn samples(&self) -> &[Sample] { &self.samples }

    /// Longest label in characters, useful for picking a target width.
    pub fn max_label_chars(&self) -> usize {
        self.samples.iter().map(|s| s.label.chars().count()).max().unwrap_or(0)
    }
}

impl Dataset<Sample> for LineDataset {
    fn get(&self, index: usize) -> Option<Sample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
