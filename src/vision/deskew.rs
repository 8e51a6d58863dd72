// ============================================================
// Layer 4b — Skew Estimator
// ============================================================
// Detects how far a scanned page is rotated and rotates it back.
//
//   binarized page (ink dark)
//       │  invert → ink bright
//       ▼
//   probabilistic Hough (1 px, 1°, threshold 100,
//                        min length 100, max gap 20)
//       │  angle per segment = atan2(Δy, Δx)
//       ▼
//   median angle
//       │  rotate about the centre to cancel it
//       │  (bicubic, replicated borders, same canvas size)
//       ▼
//   deskewed page + estimated angle
//
// The median ignores the odd stray segment from a margin rule,
// underline or scanner edge that would drag a mean off.
//
// Angles are in degrees in image coordinates (y down): a text
// line that falls towards the right has a positive angle.
//
// Reference: Matas et al. (2000) Progressive Probabilistic Hough Transform
//            Keys (1981) Cubic Convolution Interpolation

use image::{GrayImage, Luma};
use std::path::Path;

use crate::domain::error::{PipelineError, Result};
use crate::vision::hough::{detect_segments, HoughParams};

/// Cubic convolution coefficient (same as the common a = -0.75 kernel).
const CUBIC_A: f64 = -0.75;

/// Result of one deskew pass.
#[derive(Debug, Clone)]
pub struct Deskewed {
    pub image:    GrayImage,
    /// Median segment angle in degrees, None when nothing was detected
    pub angle:    Option<f64>,
    /// Number of Hough segments the estimate is based on
    pub segments: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SkewEstimator {
    params: HoughParams,
}

impl SkewEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: HoughParams) -> Self {
        Self { params }
    }

    /// Median segment angle of `image`, or None if no segment
    /// passes the Hough thresholds. Also returns the segment count.
    pub fn estimate(&self, image: &GrayImage) -> (Option<f64>, usize) {
        let inverted = invert(image);
        let segments = detect_segments(&inverted, &self.params);
        let angles: Vec<f64> = segments.iter().map(|s| s.angle_degrees()).collect();
        (median(angles), segments.len())
    }

    /// Estimate the skew and return the corrected image.
    /// With no detectable lines the input is returned unchanged.
    pub fn deskew(&self, image: &GrayImage) -> Deskewed {
        let (angle, segments) = self.estimate(image);
        match angle {
            None => {
                tracing::warn!("No lines detected to estimate skew; page left unchanged");
                Deskewed { image: image.clone(), angle: None, segments }
            }
            Some(a) => {
                tracing::debug!("Estimated skew {:.2}° from {} segments", a, segments);
                // counter-clockwise by `a` undoes a clockwise tilt of `a`
                let image = rotate_about_center(image, a);
                Deskewed { image, angle: Some(a), segments }
            }
        }
    }

    /// Load a page from disk and deskew it. An unreadable file is an
    /// error for this page only.
    pub fn deskew_file(&self, path: &Path) -> Result<Deskewed> {
        let image = image::open(path)
            .map_err(|e| PipelineError::image(path, e))?
            .to_luma8();
        Ok(self.deskew(&image))
    }
}

/// Invert intensities so ink becomes bright.
pub fn invert(image: &GrayImage) -> GrayImage {
    let mut out = image.clone();
    image::imageops::invert(&mut out);
    out
}

/// Median of a list of values; mean of the middle pair for even lengths.
pub fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// Rotate counter-clockwise (as displayed) by `degrees` about the
/// pixel centre (w/2, h/2). The canvas keeps its size; samples that
/// fall outside the source repeat the nearest edge pixel.
pub fn rotate_about_center(image: &GrayImage, degrees: f64) -> GrayImage {
    let (w, h) = image.dimensions();
    let cx = (w / 2) as f64;
    let cy = (h / 2) as f64;
    let (sin, cos) = degrees.to_radians().sin_cos();

    GrayImage::from_fn(w, h, |x, y| {
        // inverse map: destination → source
        let dx = x as f64 - cx;
        let dy = y as f64 - cy;
        let sx = cos * dx - sin * dy + cx;
        let sy = sin * dx + cos * dy + cy;
        Luma([sample_bicubic(image, sx, sy)])
    })
}

fn cubic_weights(t: f64) -> [f64; 4] {
    let a = CUBIC_A;
    let w0 = ((a * (t + 1.0) - 5.0 * a) * (t + 1.0) + 8.0 * a) * (t + 1.0) - 4.0 * a;
    let w1 = ((a + 2.0) * t - (a + 3.0)) * t * t + 1.0;
    let w2 = ((a + 2.0) * (1.0 - t) - (a + 3.0)) * (1.0 - t) * (1.0 - t) + 1.0;
    [w0, w1, w2, 1.0 - w0 - w1 - w2]
}

/// Bicubic sample with replicated borders.
fn sample_bicubic(image: &GrayImage, x: f64, y: f64) -> u8 {
    let (w, h) = image.dimensions();
    let x0 = x.floor();
    let y0 = y.floor();
    let wx = cubic_weights(x - x0);
    let wy = cubic_weights(y - y0);
    let clamp_x = |v: i64| v.clamp(0, w as i64 - 1) as u32;
    let clamp_y = |v: i64| v.clamp(0, h as i64 - 1) as u32;

    let mut acc = 0.0;
    for (j, wyj) in wy.iter().enumerate() {
        let sy = clamp_y(y0 as i64 - 1 + j as i64);
        for (i, wxi) in wx.iter().enumerate() {
            let sx = clamp_x(x0 as i64 - 1 + i as i64);
            acc += wyj * wxi * image.get_pixel(sx, sy).0[0] as f64;
        }
    }
    acc.round().clamp(0.0, 255.0) as u8
}
