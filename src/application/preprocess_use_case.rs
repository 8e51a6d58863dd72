// ============================================================
// Layer 2 — PreprocessUseCase
// ============================================================
// Turns rasterized page PNGs into line images ready for
// transcription and dataset assembly:
//
//   Step 1: List pages                 (PageSource)
//   Step 2: Binarize, optional         (Layer 4b - vision)
//   Step 3: Estimate skew and rotate   (Layer 4b - vision)
//   Step 4: Save the deskewed page     deskewed_dir/<page>.png
//   Step 5: Cut into text lines        (Layer 4b - vision)
//   Step 6: Save every line            segmented_dir/<page>/line_N.png
//
// Pages are independent, so steps 2-6 run for all pages in
// parallel on the rayon pool. A page that cannot be read or
// written is logged and counted, and the rest carry on.

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::loader::{has_extension, list_dir};
use crate::domain::{
    error::{PipelineError, Result as PipelineResult},
    page::PageImage,
    traits::{Binarizer, PageSource},
};
use crate::vision::{
    binarize::OtsuBinarizer,
    deskew::SkewEstimator,
    segment::{LineSegmenter, DEFAULT_MARGIN, DEFAULT_THRESHOLD_FACTOR},
};

// ─── Preprocess Configuration ────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    pub input_dir:        PathBuf,
    pub deskewed_dir:     PathBuf,
    pub segmented_dir:    PathBuf,
    pub binarize:         bool,
    pub margin:           u32,
    pub threshold_factor: f64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            input_dir:        PathBuf::from("data/pages"),
            deskewed_dir:     PathBuf::from("data/deskewed"),
            segmented_dir:    PathBuf::from("data/segmented"),
            binarize:         true,
            margin:           DEFAULT_MARGIN,
            threshold_factor: DEFAULT_THRESHOLD_FACTOR,
        }
    }
}

impl PreprocessConfig {
    pub fn validate(&self) -> PipelineResult<()> {
        if !(self.threshold_factor.is_finite() && self.threshold_factor > 0.0) {
            return Err(PipelineError::config(format!(
                "threshold_factor must be positive, got {}",
                self.threshold_factor
            )));
        }
        Ok(())
    }
}

// ─── Page Source ─────────────────────────────────────────────────────────────
/// Every `.png` directly inside a directory, in file-name order.
pub struct PngPageSource {
    dir: PathBuf,
}

impl PngPageSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PageSource for PngPageSource {
    fn pages(&self) -> PipelineResult<Vec<PathBuf>> {
        list_dir(&self.dir, |p| has_extension(p, "png"))
    }

    fn load(&self, path: &Path) -> PipelineResult<PageImage> {
        let image = image::open(path)
            .map_err(|e| PipelineError::image(path, e))?
            .to_luma8();
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(PageImage::new(id, image))
    }
}

// ─── Report ──────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreprocessReport {
    /// Pages processed end to end
    pub pages:         usize,
    /// Pages skipped because they could not be read or written
    pub failed:        usize,
    /// Line images written over all pages
    pub lines:         usize,
    /// Pages left unrotated because no lines were detected
    pub unrotated:     usize,
    /// Pages on which no text line was found
    pub without_lines: usize,
}

struct PageOutcome {
    lines:   usize,
    rotated: bool,
}

// ─── PreprocessUseCase ───────────────────────────────────────────────────────
pub struct PreprocessUseCase {
    config:    PreprocessConfig,
    binarizer: Option<Box<dyn Binarizer>>,
    estimator: SkewEstimator,
    segmenter: LineSegmenter,
}

impl PreprocessUseCase {
    pub fn new(config: PreprocessConfig) -> Self {
        let binarizer: Option<Box<dyn Binarizer>> = if config.binarize {
            Some(Box::new(OtsuBinarizer::default()))
        } else {
            None
        };
        let segmenter = LineSegmenter::new(config.threshold_factor, config.margin);
        Self { config, binarizer, estimator: SkewEstimator::new(), segmenter }
    }

    /// Replace the default Otsu binarizer with another implementation.
    pub fn with_binarizer(mut self, binarizer: Box<dyn Binarizer>) -> Self {
        self.binarizer = Some(binarizer);
        self
    }

    pub fn execute(&self) -> Result<PreprocessReport> {
        let cfg = &self.config;
        cfg.validate()?;

        let source = PngPageSource::new(&cfg.input_dir);
        self.run(&source)
    }

    /// Preprocess every page of `source`.
    pub fn run(&self, source: &dyn PageSource) -> Result<PreprocessReport> {
        let cfg = &self.config;

        // ── Step 1: List pages ───────────────────────────────────────────────
        let pages = source
            .pages()
            .with_context(|| format!("Cannot list pages in '{}'", cfg.input_dir.display()))?;
        tracing::info!("Preprocessing {} pages from '{}'", pages.len(), cfg.input_dir.display());

        for dir in [&cfg.deskewed_dir, &cfg.segmented_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create '{}'", dir.display()))?;
        }

        // ── Steps 2-6: every page in parallel ────────────────────────────────
        let outcomes: Vec<PipelineResult<PageOutcome>> = pages
            .par_iter()
            .map(|path| self.process_page(source, path))
            .collect();

        let mut report = PreprocessReport::default();
        for (path, outcome) in pages.iter().zip(outcomes) {
            match outcome {
                Ok(page) => {
                    report.pages += 1;
                    report.lines += page.lines;
                    if !page.rotated {
                        report.unrotated += 1;
                    }
                    if page.lines == 0 {
                        report.without_lines += 1;
                    }
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("Skipping page '{}': {}", path.display(), e);
                    report.failed += 1;
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed on page '{}'", path.display()));
                }
            }
        }

        tracing::info!(
            "Preprocessed {} pages ({} skipped): {} lines written to '{}'",
            report.pages, report.failed, report.lines, cfg.segmented_dir.display()
        );
        Ok(report)
    }

    fn process_page(&self, source: &dyn PageSource, path: &Path) -> PipelineResult<PageOutcome> {
        let cfg  = &self.config;
        let page = source.load(path)?;

        let image = match &self.binarizer {
            Some(b) => b.binarize(&page.image),
            None    => page.image,
        };

        let deskewed = self.estimator.deskew(&image);
        let out = cfg.deskewed_dir.join(format!("{}.png", page.id));
        deskewed.image.save(&out).map_err(|e| PipelineError::image(&out, e))?;

        let lines = self.segmenter.segment(&deskewed.image);
        let line_dir = cfg.segmented_dir.join(&page.id);
        fs::create_dir_all(&line_dir).map_err(|e| PipelineError::io(&line_dir, e))?;
        for line in &lines {
            let out = line_dir.join(line.file_name());
            line.image.save(&out).map_err(|e| PipelineError::image(&out, e))?;
        }

        tracing::debug!(
            "Page '{}': skew {:?}, {} lines",
            page.id, deskewed.angle, lines.len()
        );
        Ok(PageOutcome { lines: lines.len(), rotated: deskewed.angle.is_some() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    /// White page with three dark horizontal rules.
    fn ruled_page() -> GrayImage {
        GrayImage::from_fn(300, 200, |x, y| {
            let on_rule = [50, 100, 150].iter().any(|&r| (r..r + 3).contains(&y));
            if on_rule && (20..280).contains(&x) { Luma([0]) } else { Luma([255]) }
        })
    }

    fn config(root: &Path) -> PreprocessConfig {
        PreprocessConfig {
            input_dir:     root.join("pages"),
            deskewed_dir:  root.join("deskewed"),
            segmented_dir: root.join("segmented"),
            ..Default::default()
        }
    }

    #[test]
    fn test_unreadable_page_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        fs::create_dir_all(&cfg.input_dir).unwrap();
        ruled_page().save(cfg.input_dir.join("page_1.png")).unwrap();
        fs::write(cfg.input_dir.join("page_2.png"), b"not a png").unwrap();

        let report = PreprocessUseCase::new(cfg.clone()).execute().unwrap();

        assert_eq!(report.pages, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.lines, 3);
        assert!(cfg.deskewed_dir.join("page_1.png").is_file());
        for n in 1..=3 {
            assert!(cfg.segmented_dir.join("page_1").join(format!("line_{n}.png")).is_file());
        }
        assert!(!cfg.segmented_dir.join("page_2").exists());
    }

    #[test]
    fn test_blank_page_has_no_lines() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PreprocessConfig { binarize: false, ..config(dir.path()) };
        fs::create_dir_all(&cfg.input_dir).unwrap();
        GrayImage::from_pixel(120, 80, Luma([255]))
            .save(cfg.input_dir.join("blank.png"))
            .unwrap();

        let report = PreprocessUseCase::new(cfg).execute().unwrap();
        assert_eq!(report.pages, 1);
        assert_eq!(report.unrotated, 1);
        assert_eq!(report.without_lines, 1);
        assert_eq!(report.lines, 0);
    }

    #[test]
    fn test_page_source_sorted_png_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.png", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let pages = PngPageSource::new(dir.path()).pages().unwrap();
        let names: Vec<String> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_rejects_non_positive_threshold() {
        let cfg = PreprocessConfig { threshold_factor: 0.0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(PipelineError::Config(_))));
    }
}
