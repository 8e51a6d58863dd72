// ============================================================
// Layer 4b — Probabilistic Hough Line Transform
// ============================================================
// Finds straight line segments in a single-channel image where
// every non-zero pixel is a candidate point.
//
// Progressive probabilistic variant:
//
//   1. Collect all non-zero pixels and visit them in random order
//   2. Each visited pixel votes for every (rho, theta) line
//      through it
//   3. When the best vote for the pixel reaches the threshold,
//      walk along that line in both directions from the pixel,
//      tolerating gaps of up to `max_line_gap` pixels
//   4. If the walked segment is long enough, emit it and remove
//      its pixels (un-voting them) so they cannot feed another
//      line
//
// The visiting order comes from a seeded StdRng, so the same
// image and seed always produce the same segments.
//
// Reference: Matas, Galambos & Kittler (2000) Robust Detection of
//            Lines Using the Progressive Probabilistic Hough Transform

use image::GrayImage;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Fixed-point shift used while walking along a line.
const SHIFT: i64 = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughParams {
    /// Distance resolution of the accumulator in pixels
    pub rho:             f64,
    /// Angle resolution of the accumulator in radians
    pub theta:           f64,
    /// Minimum votes for a line to be considered
    pub threshold:       u32,
    /// Minimum segment length in pixels
    pub min_line_length: u32,
    /// Maximum gap between points on the same segment
    pub max_line_gap:    u32,
    /// Seed for the point visiting order
    pub seed:            u64,
}

impl Default for HoughParams {
    /// 1 px, 1°, threshold 100, min length 100, max gap 20.
    fn default() -> Self {
        Self {
            rho:             1.0,
            theta:           std::f64::consts::PI / 180.0,
            threshold:       100,
            min_line_length: 100,
            max_line_gap:    20,
            seed:            0,
        }
    }
}

/// A detected segment with pixel end points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSegment {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl LineSegment {
    /// Angle to the horizontal axis in degrees, atan2(Δy, Δx),
    /// with y pointing down the image.
    pub fn angle_degrees(&self) -> f64 {
        ((self.y2 - self.y1) as f64)
            .atan2((self.x2 - self.x1) as f64)
            .to_degrees()
    }

    pub fn length(&self) -> f64 {
        (((self.x2 - self.x1).pow(2) + (self.y2 - self.y1).pow(2)) as f64).sqrt()
    }
}

/// Detect line segments among the non-zero pixels of `image`.
pub fn detect_segments(image: &GrayImage, params: &HoughParams) -> Vec<LineSegment> {
    let width  = image.width() as i64;
    let height = image.height() as i64;
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let irho      = 1.0 / params.rho;
    let num_angle = ((std::f64::consts::PI / params.theta).round() as usize).max(1);
    let num_rho   = (((width + height) * 2 + 1) as f64 / params.rho).round() as usize;
    let rho_off   = (num_rho as i64 - 1) / 2;

    // trig[n] = (cos θn / rho, sin θn / rho)
    let trig: Vec<(f64, f64)> = (0..num_angle)
        .map(|n| {
            let ang = n as f64 * params.theta;
            (ang.cos() * irho, ang.sin() * irho)
        })
        .collect();

    let mut accum = vec![0i32; num_angle * num_rho];
    let mut mask  = vec![false; (width * height) as usize];
    let mut points: Vec<(i64, i64)> = Vec::new();

    for (x, y, p) in image.enumerate_pixels() {
        if p.0[0] != 0 {
            mask[(y as i64 * width + x as i64) as usize] = true;
            points.push((x as i64, y as i64));
        }
    }

    let rho_index = |x: i64, y: i64, n: usize| -> usize {
        let (c, s) = trig[n];
        ((x as f64 * c + y as f64 * s).round() as i64 + rho_off) as usize
    };

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut segments = Vec::new();
    let mut count = points.len();

    while count > 0 {
        let idx = rng.gen_range(0..count);
        let (px, py) = points[idx];
        points[idx] = points[count - 1];
        count -= 1;

        // already claimed by an earlier segment
        if !mask[(py * width + px) as usize] {
            continue;
        }

        // vote and track the strongest line through this point
        let mut max_val = params.threshold as i32 - 1;
        let mut max_n   = 0usize;
        for n in 0..num_angle {
            let slot = n * num_rho + rho_index(px, py, n);
            accum[slot] += 1;
            if accum[slot] > max_val {
                max_val = accum[slot];
                max_n   = n;
            }
        }
        if max_val < params.threshold as i32 {
            continue;
        }

        // direction of the line: perpendicular to its normal
        let a = -trig[max_n].1;
        let b =  trig[max_n].0;
        let x_major = a.abs() > b.abs();
        let (x0, y0, dx0, dy0) = if x_major {
            let dx0 = if a > 0.0 { 1 } else { -1 };
            let dy0 = (b * (1i64 << SHIFT) as f64 / a.abs()).round() as i64;
            (px, (py << SHIFT) + (1 << (SHIFT - 1)), dx0, dy0)
        } else {
            let dy0 = if b > 0.0 { 1 } else { -1 };
            let dx0 = (a * (1i64 << SHIFT) as f64 / b.abs()).round() as i64;
            ((px << SHIFT) + (1 << (SHIFT - 1)), py, dx0, dy0)
        };
        let to_pixel = |x: i64, y: i64| -> (i64, i64) {
            if x_major { (x, y >> SHIFT) } else { (x >> SHIFT, y) }
        };

        // walk both directions to find the segment end points
        let mut ends = [(px, py); 2];
        for (k, end) in ends.iter_mut().enumerate() {
            let (dx, dy) = if k == 0 { (dx0, dy0) } else { (-dx0, -dy0) };
            let (mut x, mut y) = (x0, y0);
            let mut gap = 0u32;
            loop {
                let (j, i) = to_pixel(x, y);
                if j < 0 || j >= width || i < 0 || i >= height {
                    break;
                }
                if mask[(i * width + j) as usize] {
                    gap  = 0;
                    *end = (j, i);
                } else {
                    gap += 1;
                    if gap > params.max_line_gap {
                        break;
                    }
                }
                x += dx;
                y += dy;
            }
        }

        let min_len = params.min_line_length as i64;
        let good = (ends[1].0 - ends[0].0).abs() >= min_len
            || (ends[1].1 - ends[0].1).abs() >= min_len;

        // clear the walked pixels; un-vote them if the segment is kept
        for (k, end) in ends.iter().enumerate() {
            let (dx, dy) = if k == 0 { (dx0, dy0) } else { (-dx0, -dy0) };
            let (mut x, mut y) = (x0, y0);
            loop {
                let (j, i) = to_pixel(x, y);
                if j < 0 || j >= width || i < 0 || i >= height {
                    break;
                }
                let m = (i * width + j) as usize;
                if mask[m] {
                    if good {
                        for n in 0..num_angle {
                            accum[n * num_rho + rho_index(j, i, n)] -= 1;
                        }
                    }
                    mask[m] = false;
                }
                if (j, i) == *end {
                    break;
                }
                x += dx;
                y += dy;
            }
        }

        if good {
            segments.push(LineSegment {
                x1: ends[0].0,
                y1: ends[0].1,
                x2: ends[1].0,
                y2: ends[1].1,
            });
        }
    }

    tracing::debug!("Hough found {} segments", segments.len());
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn blank(w: u32, h: u32) -> GrayImage {
        GrayImage::from_pixel(w, h, Luma([0]))
    }

    #[test]
    fn test_empty_image_has_no_segments() {
        let img = blank(200, 100);
        assert!(detect_segments(&img, &HoughParams::default()).is_empty());
    }

    #[test]
    fn test_finds_horizontal_line() {
        let mut img = blank(300, 100);
        for x in 20..280 {
            img.put_pixel(x, 50, Luma([255]));
        }
        let segs = detect_segments(&img, &HoughParams::default());
        assert!(!segs.is_empty());
        for s in &segs {
            assert!(s.angle_degrees().abs() < 1.0 || (s.angle_degrees().abs() - 180.0).abs() < 1.0);
            assert!(s.length() >= 100.0);
        }
    }

    #[test]
    fn test_short_line_is_rejected() {
        let mut img = blank(300, 100);
        for x in 10..60 {
            img.put_pixel(x, 20, Luma([255]));
        }
        assert!(detect_segments(&img, &HoughParams::default()).is_empty());
    }

    #[test]
    fn test_same_seed_same_segments() {
        let mut img = blank(300, 200);
        for x in 0..300u32 {
            img.put_pixel(x, 40 + x / 10, Luma([255]));
            img.put_pixel(x, 120, Luma([255]));
        }
        let p = HoughParams::default();
        assert_eq!(detect_segments(&img, &p), detect_segments(&img, &p));
    }

    #[test]
    fn test_angle_of_descending_segment_is_positive() {
        let s = LineSegment { x1: 0, y1: 0, x2: 100, y2: 100 };
        assert!((s.angle_degrees() - 45.0).abs() < 1e-9);
    }
}
