// ============================================================
// Layer 3 — Page and Line Image Types
// ============================================================
// A PageImage is one rasterized exam page as an 8-bit
// grayscale buffer (ink dark on a light background).
// A LineImage is a horizontal band cropped from a deskewed page.
//
// Reference: image crate documentation (GrayImage)

use image::GrayImage;

#[derive(Debug, Clone)]
pub struct PageImage {
    /// Page identity, usually the file stem (e.g. "page_3")
    pub id:    String,
    pub image: GrayImage,
}

impl PageImage {
    pub fn new(id: impl Into<String>, image: GrayImage) -> Self {
        Self { id: id.into(), image }
    }
}

#[derive(Debug, Clone)]
pub struct LineImage {
    /// 1-based position of the line on its page, top to bottom
    pub ordinal: usize,
    /// First row of the ink run, before the margin
    pub start:   u32,
    /// Last row of the ink run, before the margin
    pub end:     u32,
    pub image:   GrayImage,
}

impl LineImage {
    /// File name used on disk: line_{ordinal}.png
    pub fn file_name(&self) -> String {
        format!("line_{}.png", self.ordinal)
    }
}
