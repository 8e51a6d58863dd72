// ============================================================
// Layer 4 — Sample Loader (join-then-filter)
// ============================================================
// Pairs every line image with its transcript by naming
// convention and keeps only usable pairs.
//
// Directory convention:
//
//   images_root/                gt_root/
//     page_1/                     page_1/
//       line_1.png   ◀────────▶     line_1.txt
//       line_2.png   ◀────────▶     line_2.txt
//     page_2/                     page_2/
//       ...                         ...
//
// For each line image the expected transcript path is
// gt_root/<page dir name>/<image stem>.txt. A pair is kept only
// when that file exists AND its trimmed content is non-empty.
// This is the only source of samples; nothing is encoded before
// it has run.
//
// Every candidate is accounted for in the AssemblyReport:
// found = used + dropped, with the drop reasons tallied.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use crate::domain::error::{PipelineError, Result};
use crate::domain::sample::Sample;

/// Why a candidate (image, transcript) pair was not used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// No transcript file at the mirrored path
    MissingTranscript,
    /// Transcript exists but is blank after trimming
    EmptyTranscript,
    /// Transcript exists but could not be read as UTF-8
    UnreadableTranscript,
}

/// Bookkeeping for one discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyReport {
    /// Line images found under the images root
    pub found:            usize,
    /// Pairs kept as samples
    pub used:             usize,
    /// Dropped candidates by reason
    pub dropped:          BTreeMap<DropReason, usize>,
    /// Pages whose image count differs from their transcript count
    pub misaligned_pages: Vec<String>,
}

impl AssemblyReport {
    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }

    fn drop(&mut self, reason: DropReason) {
        *self.dropped.entry(reason).or_insert(0) += 1;
    }
}

/// Discovers samples from mirrored image and ground-truth trees.
pub struct SampleLoader {
    images_root:      PathBuf,
    gt_root:          PathBuf,
    /// Turn a page alignment mismatch into an error instead of a warning
    strict_alignment: bool,
}

impl SampleLoader {
    pub fn new(images_root: impl Into<PathBuf>, gt_root: impl Into<PathBuf>) -> Self {
        Self {
            images_root:      images_root.into(),
            gt_root:          gt_root.into(),
            strict_alignment: false,
        }
    }

    pub fn strict_alignment(mut self, strict: bool) -> Self {
        self.strict_alignment = strict;
        self
    }

    /// Expected transcript path for a line image inside `page_dir`.
    pub fn transcript_path(&self, page_dir: &Path, image_path: &Path) -> Option<PathBuf> {
        let page = page_dir.file_name()?;
        let stem = image_path.file_stem()?;
        let mut file = stem.to_os_string();
        file.push(".txt");
        Some(self.gt_root.join(page).join(file))
    }

    /// Run the join-then-filter pass.
    /// Returns the usable samples in sorted page/file order plus the
    /// report. Zero usable samples is a DataError.
    pub fn load(&self) -> Result<(Vec<Sample>, AssemblyReport)> {
        let mut report  = AssemblyReport::default();
        let mut samples = Vec::new();

        if !self.images_root.is_dir() {
            tracing::warn!(
                "Images directory '{}' does not exist — no candidates",
                self.images_root.display()
            );
        } else {
            for page_dir in list_dir(&self.images_root, |p| p.is_dir())? {
                self.load_page(&page_dir, &mut samples, &mut report)?;
            }
        }

        report.used = samples.len();
        tracing::info!(
            "Candidates: {} found, {} dropped {:?}, {} used",
            report.found,
            report.dropped_total(),
            report.dropped,
            report.used,
        );

        if samples.is_empty() {
            return Err(PipelineError::data(format!(
                "no usable samples under '{}' with transcripts in '{}' ({} candidates, {} dropped)",
                self.images_root.display(),
                self.gt_root.display(),
                report.found,
                report.dropped_total(),
            )));
        }
        Ok((samples, report))
    }

    fn load_page(
        &self,
        page_dir: &Path,
        samples:  &mut Vec<Sample>,
        report:   &mut AssemblyReport,
    ) -> Result<()> {
        let images = list_dir(page_dir, |p| has_extension(p, "png"))?;
        self.check_alignment(page_dir, images.len(), report)?;

        for image_path in images {
            report.found += 1;
            let Some(gt_path) = self.transcript_path(page_dir, &image_path) else {
                report.drop(DropReason::MissingTranscript);
                continue;
            };
            if !gt_path.is_file() {
                tracing::debug!("No transcript for '{}'", image_path.display());
                report.drop(DropReason::MissingTranscript);
                continue;
            }
            let text = match fs::read_to_string(&gt_path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Skipping '{}': {}", gt_path.display(), e);
                    report.drop(DropReason::UnreadableTranscript);
                    continue;
                }
            };
            match Sample::new(image_path, &text) {
                Ok(sample) => samples.push(sample),
                Err(_) => report.drop(DropReason::EmptyTranscript),
            }
        }
        Ok(())
    }

    fn check_alignment(
        &self,
        page_dir: &Path,
        images:   usize,
        report:   &mut AssemblyReport,
    ) -> Result<()> {
        let page = page_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let gt_page = self.gt_root.join(&page);
        let transcripts = if gt_page.is_dir() {
            list_dir(&gt_page, |p| has_extension(p, "txt"))?.len()
        } else {
            0
        };

        if images == transcripts {
            return Ok(());
        }
        if self.strict_alignment {
            return Err(PipelineError::Alignment { page, images, transcripts });
        }
        tracing::warn!(
            "Page '{}' has {} line images but {} transcripts",
            page, images, transcripts
        );
        report.misaligned_pages.push(page);
        Ok(())
    }
}

pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Entries of `dir` matching `keep`, sorted by path.
pub fn list_dir(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))? {
        let path = entry.map_err(|e| PipelineError::io(dir, e))?.path();
        if keep(&path) {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Every file with extension `ext` below `root`, recursively, sorted.
pub fn find_files(root: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for path in list_dir(&dir, |_| true)? {
            if path.is_dir() {
                stack.push(path);
            } else if has_extension(&path, ext) {
                out.push(path);
            }
        }
    }
    out.sort();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, contents: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    /// images/p1/{line_1,line_2,line_3,line_4}.png, with transcripts
    /// present, present, blank, missing.
    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("images");
        let gt  = dir.path().join("gt");
        for n in 1..=4 {
            write(&img.join("p1").join(format!("line_{n}.png")), b"png");
        }
        write(&gt.join("p1/line_1.txt"), b"  first line \n");
        write(&gt.join("p1/line_2.txt"), b"second");
        write(&gt.join("p1/line_3.txt"), b" \n ");
        dir
    }

    #[test]
    fn test_join_then_filter_counts() {
        let dir = fixture();
        let loader = SampleLoader::new(dir.path().join("images"), dir.path().join("gt"));
        let (samples, report) = loader.load().unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].label, "first line");
        assert!(samples[0].image_path.ends_with("p1/line_1.png"));
        assert_eq!(report.found, 4);
        assert_eq!(report.used, 2);
        assert_eq!(report.dropped[&DropReason::EmptyTranscript], 1);
        assert_eq!(report.dropped[&DropReason::MissingTranscript], 1);
        assert_eq!(report.found, report.used + report.dropped_total());
    }

    #[test]
    fn test_no_sample_has_empty_label() {
        let dir = fixture();
        let loader = SampleLoader::new(dir.path().join("images"), dir.path().join("gt"));
        let (samples, _) = loader.load().unwrap();
        assert!(samples.iter().all(|s| !s.label.trim().is_empty()));
    }

    #[test]
    fn test_misaligned_page_is_reported() {
        let dir = fixture();
        let loader = SampleLoader::new(dir.path().join("images"), dir.path().join("gt"));
        let (_, report) = loader.load().unwrap();
        // 4 images, 3 transcripts
        assert_eq!(report.misaligned_pages, vec!["p1".to_string()]);
    }

    #[test]
    fn test_strict_alignment_errors() {
        let dir = fixture();
        let loader = SampleLoader::new(dir.path().join("images"), dir.path().join("gt"))
            .strict_alignment(true);
        let err = loader.load().unwrap_err();
        assert!(matches!(err, PipelineError::Alignment { images: 4, transcripts: 3, .. }));
    }

    #[test]
    fn test_zero_usable_samples_is_data_error() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("images/p1/line_1.png"), b"png");
        let loader = SampleLoader::new(dir.path().join("images"), dir.path().join("gt"));
        assert!(matches!(loader.load().unwrap_err(), PipelineError::Data(_)));
    }

    #[test]
    fn test_transcript_path_mirrors_page() {
        let loader = SampleLoader::new("imgs", "truth");
        let p = loader
            .transcript_path(Path::new("imgs/23CS060"), Path::new("imgs/23CS060/line_7.png"))
            .unwrap();
        assert_eq!(p, PathBuf::from("truth/23CS060/line_7.txt"));
    }

    #[test]
    fn test_find_files_is_recursive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("b/x.txt"), b"1");
        write(&dir.path().join("a/deep/y.txt"), b"2");
        write(&dir.path().join("a/z.png"), b"3");
        let files = find_files(dir.path(), "txt").unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a/deep/y.txt"));
        assert!(files[1].ends_with("b/x.txt"));
    }
}
