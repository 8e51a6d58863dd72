// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams where external collaborators plug in:
//
//   Binarizer   → grayscale page → black/white page
//                 (vision::binarize::OtsuBinarizer)
//   PageSource  → produces the page images to preprocess
//                 (application::preprocess_use_case::PngPageSource)
//
// The rasterizer and bootstrap OCR engine live outside this
// crate; the pipeline only consumes the PNG and .txt files
// they leave on disk.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use image::GrayImage;
use std::path::PathBuf;

use crate::domain::error::Result;
use crate::domain::page::PageImage;

/// Turns a grayscale page into a two-level image.
pub trait Binarizer: Send + Sync {
    fn binarize(&self, image: &GrayImage) -> GrayImage;
}

/// Any component that can list and load page images.
pub trait PageSource: Sync {
    /// Every page location, in a stable order.
    fn pages(&self) -> Result<Vec<PathBuf>>;

    /// Load one page. A failure here affects that page only.
    fn load(&self, path: &std::path::Path) -> Result<PageImage>;
}
