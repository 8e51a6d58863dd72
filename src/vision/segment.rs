// ============================================================
// Layer 4b — Line Segmenter
// ============================================================
// Splits a deskewed page into one image per handwritten line
// using a horizontal ink-density profile.
//
//   page ──invert──▶ row sums (ink profile)
//                         │
//                         ▼
//        rows with density > mean × factor  (ink rows)
//                         │
//                         ▼
//        maximal runs of consecutive ink rows → (start, end)
//                         │
//                         ▼
//        pad by margin, clamp, crop band from the ORIGINAL page
//
// A single isolated ink row is still a run: it yields (r, r).
// The cropped band is rows [start - margin, end + margin), clamped
// to the page.
//
// Example with factor 0.5:
//   profile  [0, 0, 5, 6, 7, 0, 0, 9, 0]   mean = 3, threshold = 1.5
//   ink rows  2, 3, 4, 7
//   runs     (2, 4), (7, 7)

use image::{imageops, GrayImage};

use crate::domain::page::LineImage;

pub const DEFAULT_THRESHOLD_FACTOR: f64 = 0.1;
pub const DEFAULT_MARGIN: u32 = 10;

#[derive(Debug, Clone, Copy)]
pub struct LineSegmenter {
    /// Multiplier applied to the mean profile value
    pub threshold_factor: f64,
    /// Rows added above and below every run before cropping
    pub margin:           u32,
}

impl Default for LineSegmenter {
    fn default() -> Self {
        Self {
            threshold_factor: DEFAULT_THRESHOLD_FACTOR,
            margin:           DEFAULT_MARGIN,
        }
    }
}

impl LineSegmenter {
    pub fn new(threshold_factor: f64, margin: u32) -> Self {
        Self { threshold_factor, margin }
    }

    /// Crop every text line from `page`, top to bottom.
    /// Ordinals start at 1.
    pub fn segment(&self, page: &GrayImage) -> Vec<LineImage> {
        let profile = ink_profile(page);
        let threshold = mean(&profile) * self.threshold_factor;
        let runs = ink_runs(&profile, threshold);

        if runs.is_empty() {
            tracing::warn!("No ink rows above threshold {:.1}; no lines emitted", threshold);
            return Vec::new();
        }

        let (width, height) = page.dimensions();
        runs.into_iter()
            .enumerate()
            .map(|(i, (start, end))| {
                let top    = start.saturating_sub(self.margin as usize) as u32;
                // exclusive; never above end + 1 so a zero margin keeps the run
                let bottom = (end + self.margin as usize).min(height as usize).max(end + 1) as u32;
                let band   = imageops::crop_imm(page, 0, top, width, bottom - top).to_image();
                LineImage {
                    ordinal: i + 1,
                    start:   start as u32,
                    end:     end as u32,
                    image:   band,
                }
            })
            .collect()
    }
}

/// Per-row sum of inverted intensities (255 - pixel).
pub fn ink_profile(page: &GrayImage) -> Vec<f64> {
    page.rows()
        .map(|row| row.map(|p| (255 - p.0[0]) as f64).sum())
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Group the rows whose value exceeds `threshold` into maximal runs
/// of consecutive indices, returned as inclusive (start, end) pairs
/// in row order.
pub fn ink_runs(profile: &[f64], threshold: f64) -> Vec<(usize, usize)> {
    let mut runs: Vec<(usize, usize)> = Vec::new();
    for row in profile
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v > threshold)
        .map(|(i, _)| i)
    {
        match runs.last_mut() {
            Some((_, end)) if row == *end + 1 => *end = row,
            _ => runs.push((row, row)),
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_profile_runs_at_half_mean() {
        let profile = [0.0, 0.0, 5.0, 6.0, 7.0, 0.0, 0.0, 9.0, 0.0];
        let threshold = mean(&profile) * 0.5;
        assert_eq!(ink_runs(&profile, threshold), vec![(2, 4), (7, 7)]);
    }

    #[test]
    fn test_singleton_runs_are_kept() {
        let profile = [9.0, 0.0, 9.0, 0.0, 9.0];
        assert_eq!(ink_runs(&profile, 1.0), vec![(0, 0), (2, 2), (4, 4)]);
    }

    #[test]
    fn test_run_touching_last_row() {
        let profile = [0.0, 3.0, 3.0];
        assert_eq!(ink_runs(&profile, 1.0), vec![(1, 2)]);
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(ink_runs(&[1.0, 1.0], 1.0).is_empty());
    }

    #[test]
    fn test_blank_page_emits_nothing() {
        let page = GrayImage::from_pixel(50, 40, Luma([255]));
        assert!(LineSegmenter::default().segment(&page).is_empty());
    }

    #[test]
    fn test_two_lines_cropped_with_margin() {
        let mut page = GrayImage::from_pixel(100, 200, Luma([255]));
        for x in 10..90 {
            for y in 30..40 {
                page.put_pixel(x, y, Luma([0]));
            }
            page.put_pixel(x, 120, Luma([0]));
        }
        let lines = LineSegmenter::default().segment(&page);
        assert_eq!(lines.len(), 2);

        assert_eq!(lines[0].ordinal, 1);
        assert_eq!((lines[0].start, lines[0].end), (30, 39));
        assert_eq!(lines[0].image.dimensions(), (100, 29));

        assert_eq!(lines[1].ordinal, 2);
        assert_eq!((lines[1].start, lines[1].end), (120, 120));
        assert_eq!(lines[1].image.dimensions(), (100, 20));
        assert_eq!(lines[1].file_name(), "line_2.png");
    }

    #[test]
    fn test_margin_clamped_at_edges() {
        let mut page = GrayImage::from_pixel(20, 15, Luma([255]));
        for x in 0..20 {
            page.put_pixel(x, 1, Luma([0]));
            page.put_pixel(x, 14, Luma([0]));
        }
        let lines = LineSegmenter::default().segment(&page);
        assert_eq!(lines.len(), 2);
        // rows 0..11 and 4..15
        assert_eq!(lines[0].image.height(), 11);
        assert_eq!(lines[1].image.height(), 11);
    }

    #[test]
    fn test_zero_margin_singleton_keeps_its_row() {
        let mut page = GrayImage::from_pixel(10, 30, Luma([255]));
        for x in 0..10 {
            page.put_pixel(x, 15, Luma([0]));
        }
        let lines = LineSegmenter::new(DEFAULT_THRESHOLD_FACTOR, 0).segment(&page);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].image.height(), 1);
        assert_eq!(lines[0].image.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn test_crop_comes_from_original_page() {
        let mut page = GrayImage::from_pixel(10, 30, Luma([255]));
        for x in 0..10 {
            page.put_pixel(x, 15, Luma([0]));
        }
        let lines = LineSegmenter::default().segment(&page);
        // row 15 sits at offset 10 inside the band
        assert_eq!(lines[0].image.get_pixel(3, 10).0[0], 0);
        assert_eq!(lines[0].image.get_pixel(3, 0).0[0], 255);
    }
}
