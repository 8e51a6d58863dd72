// ============================================================
// Layer 4 — Per-Sample Transform
// ============================================================
// Turns one Sample into an EncodedSample. Pure apart from the
// image read, and independent of every other sample, so it can
// run on any worker in any order.
//
//   PNG ──decode──▶ 1 channel u8
//       ──scale───▶ f32 in [0, 1]
//       ──resize──▶ target_height × target_width (stretched, in f32
//                   so interpolated values are not re-quantised)
//       ──transpose▶ width-major [W, H] (width = CTC time axis)
//
//   label ──Vocabulary::encode──▶ ids (unknown → blank)
//
// Images are stretched to the fixed width whatever their aspect
// ratio; wide lines are compressed horizontally, never cropped.

use image::{
    imageops::{self, FilterType},
    GrayImage, ImageBuffer, Luma,
};
use std::sync::Arc;

use crate::domain::error::{PipelineError, Result};
use crate::domain::sample::{EncodedSample, Sample};
use crate::domain::vocabulary::Vocabulary;

pub const DEFAULT_TARGET_HEIGHT: u32 = 32;
pub const DEFAULT_TARGET_WIDTH: u32 = 390;

#[derive(Debug, Clone)]
pub struct SampleTransform {
    height: u32,
    width:  u32,
    vocab:  Arc<Vocabulary>,
}

impl SampleTransform {
    pub fn new(height: u32, width: u32, vocab: Arc<Vocabulary>) -> Self {
        Self { height, width, vocab }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Read, normalise, resize, transpose and encode one sample.
    pub fn apply(&self, sample: &Sample) -> Result<EncodedSample> {
        let image = image::open(&sample.image_path)
            .map_err(|e| PipelineError::image(&sample.image_path, e))?
            .to_luma8();
        let encoded = self.encode(&image, &sample.label)?;
        tracing::trace!("Encoded '{}'", sample.image_path.display());
        Ok(encoded)
    }

    /// The in-memory part of `apply`.
    pub fn encode(&self, image: &GrayImage, label: &str) -> Result<EncodedSample> {
        let label = self.vocab.encode(label);
        if label.is_empty() {
            return Err(PipelineError::data("empty label reached the encoder"));
        }

        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Err(PipelineError::data("zero-sized line image"));
        }
        let natural_width = (w as f64 * self.height as f64 / h as f64).round() as u32;
        if natural_width > self.width {
            tracing::debug!(
                "Line {}×{} stretched to width {} (natural width {})",
                w, h, self.width, natural_width
            );
        }

        let scaled: ImageBuffer<Luma<f32>, Vec<f32>> =
            ImageBuffer::from_fn(w, h, |x, y| Luma([image.get_pixel(x, y).0[0] as f32 / 255.0]));
        let resized = imageops::resize(&scaled, self.width, self.height, FilterType::Triangle);

        let (width, height) = (self.width as usize, self.height as usize);
        let mut pixels = vec![0.0f32; width * height];
        for (x, y, p) in resized.enumerate_pixels() {
            pixels[x as usize * height + y as usize] = p.0[0];
        }

        Ok(EncodedSample { image: pixels, width, height, label })
    }
}
