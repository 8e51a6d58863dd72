// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands and their flags:
//
//   preprocess — deskew pages and cut them into line images
//   assemble   — build the vocabulary and CTC training batches
//   evaluate   — score predicted transcriptions (CER / WER)
//
// Every Args struct converts into its application-layer config
// through From, so Layer 2 never sees clap types.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{
    assemble_use_case::DatasetConfig,
    evaluate_use_case::EvaluateConfig,
    preprocess_use_case::PreprocessConfig,
};
use crate::data::assembler::FailurePolicy;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deskew rasterized pages and segment them into text lines
    Preprocess(PreprocessArgs),

    /// Pair line images with transcripts and assemble CTC batches
    Assemble(AssembleArgs),

    /// Score predicted transcriptions against ground truth
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
pub struct PreprocessArgs {
    /// Directory of rasterized page PNGs
    #[arg(long, default_value = "data/pages")]
    pub input_dir: PathBuf,

    /// Where deskewed pages are written
    #[arg(long, default_value = "data/deskewed")]
    pub deskewed_dir: PathBuf,

    /// Where line images are written, one subdirectory per page
    #[arg(long, default_value = "data/segmented")]
    pub segmented_dir: PathBuf,

    /// Skip Otsu binarization (pages are already two-level)
    #[arg(long)]
    pub no_binarize: bool,

    /// Rows kept above and below every detected line
    #[arg(long, default_value_t = 10)]
    pub margin: u32,

    /// A row is ink when its profile exceeds this × the mean profile
    #[arg(long, default_value_t = 0.1)]
    pub threshold_factor: f64,
}

impl From<PreprocessArgs> for PreprocessConfig {
    fn from(a: PreprocessArgs) -> Self {
        PreprocessConfig {
            input_dir:        a.input_dir,
            deskewed_dir:     a.deskewed_dir,
            segmented_dir:    a.segmented_dir,
            binarize:         !a.no_binarize,
            margin:           a.margin,
            threshold_factor: a.threshold_factor,
        }
    }
}

#[derive(Args, Debug)]
pub struct AssembleArgs {
    /// Root of the line images (<page>/line_N.png)
    #[arg(long, default_value = "data/segmented")]
    pub images_dir: PathBuf,

    /// Root of the transcripts (<page>/line_N.txt)
    #[arg(long, default_value = "data/gt")]
    pub gt_dir: PathBuf,

    /// Where vocabulary.json and manifest.json are written
    #[arg(long, default_value = "data/assembled")]
    pub output_dir: PathBuf,

    /// Height every line image is resized to
    #[arg(long, default_value_t = 32)]
    pub target_height: u32,

    /// Width every line image is stretched to (the CTC time axis)
    #[arg(long, default_value_t = 390)]
    pub target_width: u32,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Capacity of the streaming shuffle buffer
    #[arg(long, default_value_t = 1000)]
    pub shuffle_buffer: usize,

    /// Fraction of samples kept for training; the rest validate
    #[arg(long, default_value_t = 0.9)]
    pub train_ratio: f64,

    /// Passes a model runtime makes over the training split.
    /// Recorded in the manifest; this command checks one pass.
    #[arg(long, default_value_t = 1)]
    pub epochs: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Threads decoding and resizing images
    #[arg(long, default_value_t = 4)]
    pub num_workers: usize,

    /// Abort on the first unreadable image instead of skipping it
    #[arg(long)]
    pub fail_fast: bool,

    /// Treat a page whose image and transcript counts differ as an error
    #[arg(long)]
    pub strict_alignment: bool,
}

impl From<AssembleArgs> for DatasetConfig {
    fn from(a: AssembleArgs) -> Self {
        DatasetConfig {
            images_dir:       a.images_dir,
            gt_dir:           a.gt_dir,
            output_dir:       a.output_dir,
            target_height:    a.target_height,
            target_width:     a.target_width,
            batch_size:       a.batch_size,
            shuffle_buffer:   a.shuffle_buffer,
            train_ratio:      a.train_ratio,
            epochs:           a.epochs,
            seed:             a.seed,
            num_workers:      a.num_workers,
            failure_policy:   if a.fail_fast { FailurePolicy::Abort } else { FailurePolicy::Skip },
            strict_alignment: a.strict_alignment,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Root of the ground-truth .txt files
    #[arg(long, default_value = "data/gt")]
    pub gt_dir: PathBuf,

    /// Root of the predictions, mirroring the ground-truth layout
    #[arg(long, default_value = "data/predictions")]
    pub pred_dir: PathBuf,

    /// Where scores.csv is written
    #[arg(long, default_value = "data/scores")]
    pub output_dir: PathBuf,
}

impl From<EvaluateArgs> for EvaluateConfig {
    fn from(a: EvaluateArgs) -> Self {
        EvaluateConfig {
            gt_dir:     a.gt_dir,
            pred_dir:   a.pred_dir,
            output_dir: a.output_dir,
        }
    }
}
