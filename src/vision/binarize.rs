// ============================================================
// Layer 4b — Otsu Binarizer
// ============================================================
// Global two-level thresholding of a rasterized page:
//
//   Gaussian blur (5×5 equivalent, σ = 1.1)
//       → Otsu level from the histogram
//       → pixel > level ? 255 : 0
//
// This is the default Binarizer collaborator used by the
// preprocess command before deskewing.
//
// Reference: Otsu (1979) A Threshold Selection Method from
//            Gray-Level Histograms

use image::GrayImage;
use imageproc::{
    contrast::{otsu_level, threshold, ThresholdType},
    filter::gaussian_blur_f32,
};

use crate::domain::traits::Binarizer;

/// σ that a 5×5 kernel with automatic sigma works out to.
pub const DEFAULT_SIGMA: f32 = 1.1;

#[derive(Debug, Clone, Copy)]
pub struct OtsuBinarizer {
    pub sigma: f32,
}

impl Default for OtsuBinarizer {
    fn default() -> Self {
        Self { sigma: DEFAULT_SIGMA }
    }
}

impl Binarizer for OtsuBinarizer {
    fn binarize(&self, image: &GrayImage) -> GrayImage {
        let smooth = if self.sigma > 0.0 {
            gaussian_blur_f32(image, self.sigma)
        } else {
            image.clone()
        };
        let level = otsu_level(&smooth);
        tracing::debug!("Otsu level {}", level);

        threshold(&smooth, level, ThresholdType::Binary)
    }
}
