// ============================================================
// Layer 4 — Line Batcher
// ============================================================
// Stacks EncodedSamples into one Batch.
//
//   images  [batch, W, H, 1]  width-major, 0.0 outside an image
//   labels  [batch, Lmax]     right-padded with blank_id
//
// Lmax is the longest true label in THIS batch, so batches of
// short lines stay narrow. The true lengths are kept alongside
// for logging; the CTC deriver recovers them from the padded
// rows on its own (ml::ctc).
//
// All images coming out of SampleTransform share one shape, so
// the image padding only matters for hand-built batches.
//
// Reference: Graves et al. (2006) CTC — blank as padding symbol

use crate::domain::sample::EncodedSample;

#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Flat pixel buffer in [batch, width, height, 1] order
    pub images:        Vec<f32>,
    pub batch_size:    usize,
    pub width:         usize,
    pub height:        usize,
    /// Padded label rows, each of length `max_label_len`
    pub labels:        Vec<Vec<u32>>,
    pub max_label_len: usize,
    /// True (unpadded) label lengths
    pub label_lengths: Vec<usize>,
}

impl Batch {
    /// Shape of the image tensor.
    pub fn image_shape(&self) -> [usize; 4] {
        [self.batch_size, self.width, self.height, 1]
    }

    /// Label rows flattened row-major.
    pub fn labels_flat(&self) -> Vec<u32> {
        self.labels.iter().flatten().copied().collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LineBatcher {
    pub blank_id: u32,
}

impl LineBatcher {
    pub fn new(blank_id: u32) -> Self {
        Self { blank_id }
    }

    /// Pad and stack `items`. An empty input gives an empty batch.
    pub fn batch(&self, items: Vec<EncodedSample>) -> Batch {
        let batch_size    = items.len();
        let width         = items.iter().map(|s| s.width).max().unwrap_or(0);
        let height        = items.iter().map(|s| s.height).max().unwrap_or(0);
        let max_label_len = items.iter().map(|s| s.label.len()).max().unwrap_or(0);

        let mut images        = vec![0.0f32; batch_size * width * height];
        let mut labels        = Vec::with_capacity(batch_size);
        let mut label_lengths = Vec::with_capacity(batch_size);

        for (b, sample) in items.into_iter().enumerate() {
            let base = b * width * height;
            for x in 0..sample.width {
                let src = &sample.image[x * sample.height..(x + 1) * sample.height];
                let dst = base + x * height;
                images[dst..dst + sample.height].copy_from_slice(src);
            }

            label_lengths.push(sample.label.len());
            let mut row = sample.label;
            row.resize(max_label_len, self.blank_id);
            labels.push(row);
        }

        Batch {
            images,
            batch_size,
            width,
            height,
            labels,
            max_label_len,
            label_lengths,
        }
    }
}
