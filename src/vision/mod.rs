// ============================================================
// Layer 4b — Page Vision
// ============================================================
// Image-level preprocessing applied to each rasterized page
// before it becomes training data:
//
//   raw page PNG
//       │
//       ▼
//   OtsuBinarizer   → black ink on white
//       │
//       ▼
//   SkewEstimator   → probabilistic Hough + median angle, rotate back
//       │
//       ▼
//   LineSegmenter   → ink-density profile → one image per line
//
// Each stage works on one page at a time with no shared state,
// so pages can be processed in parallel.

/// Global Otsu binarization
pub mod binarize;

/// Progressive probabilistic Hough line transform
pub mod hough;

/// Skew estimation and rotation
pub mod deskew;

/// Horizontal-profile line segmentation
pub mod segment;
