// ============================================================
// Layer 3 — Pipeline Error Taxonomy
// ============================================================
// Every library layer (data, vision, ml, eval) returns
// Result<T, PipelineError>. The application layer wraps these
// in anyhow with extra context for the user.
//
//   Io / Image  → one sample or page is unusable: skip, log, continue
//   Config      → bad options: fail before any work starts
//   Data        → nothing sensible to produce: abort with a diagnostic
//   Alignment   → a page's line images and transcripts disagree
//
// Reference: thiserror crate documentation

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors produced by the preprocessing, assembly and scoring stages.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A file could not be read or written.
    #[error("io error on '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An image file exists but could not be decoded or encoded.
    #[error("image error on '{}'", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// An option is out of range. Raised before processing starts.
    #[error("configuration: {0}")]
    Config(String),

    /// The data cannot yield a meaningful result (empty labels,
    /// empty ground truth, zero usable samples).
    #[error("data: {0}")]
    Data(String),

    /// A page's line-image count differs from its transcript count.
    #[error("page '{page}' has {images} line images but {transcripts} transcripts")]
    Alignment {
        page:        String,
        images:      usize,
        transcripts: usize,
    },
}

impl PipelineError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io { path: path.as_ref().to_path_buf(), source }
    }

    pub fn image(path: impl AsRef<Path>, source: image::ImageError) -> Self {
        Self::Image { path: path.as_ref().to_path_buf(), source }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::Data(message.into())
    }

    /// True for per-item failures that the skip policy may absorb.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Image { .. })
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
