// ============================================================
// Layer 2 — AssembleUseCase
// ============================================================
// Builds the CTC training dataset from segmented line images and
// their transcripts:
//
//   Step 1: Validate the config             (fail before any work)
//   Step 2: Build the vocabulary            (Layer 4 - data, barrier)
//   Step 3: Save vocabulary.json            (Layer 6 - infra)
//   Step 4: Discover (image, label) pairs   (Layer 4 - data)
//   Step 5: Split train / validation        (Layer 4 - data)
//   Step 6: Assemble batches per epoch      (Layer 4 - data)
//   Step 7: Save manifest.json              (Layer 6 - infra)
//
// Step 2 completes before anything is encoded, and the finished
// Vocabulary is shared read-only with every worker.
//
// Reference: Burn Book §4 (Dataset and Batcher)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::Arc};

use crate::data::{
    assembler::{AssemblerOptions, DatasetAssembler, FailurePolicy, DEFAULT_BATCH_SIZE, DEFAULT_SHUFFLE_BUFFER},
    batcher::Batch,
    dataset::LineDataset,
    loader::SampleLoader,
    splitter::split_train_val,
    transform::{SampleTransform, DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH},
    vocab_builder::VocabularyBuilder,
};
use crate::domain::error::{PipelineError, Result as PipelineResult};
use crate::infra::{
    manifest::{ManifestStore, RunManifest},
    vocab_store::VocabularyStore,
};
use crate::ml::ctc::CtcLengths;

// ─── Dataset Configuration ───────────────────────────────────────────────────
// Everything that determines the batch sequence of a run.
// Saved in full inside manifest.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub images_dir:       PathBuf,
    pub gt_dir:           PathBuf,
    pub output_dir:       PathBuf,
    pub target_height:    u32,
    pub target_width:     u32,
    pub batch_size:       usize,
    pub shuffle_buffer:   usize,
    pub train_ratio:      f64,
    pub epochs:           usize,
    pub seed:             u64,
    pub num_workers:      usize,
    pub failure_policy:   FailurePolicy,
    pub strict_alignment: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            images_dir:       PathBuf::from("data/segmented"),
            gt_dir:           PathBuf::from("data/gt"),
            output_dir:       PathBuf::from("data/assembled"),
            target_height:    DEFAULT_TARGET_HEIGHT,
            target_width:     DEFAULT_TARGET_WIDTH,
            batch_size:       DEFAULT_BATCH_SIZE,
            shuffle_buffer:   DEFAULT_SHUFFLE_BUFFER,
            train_ratio:      0.9,
            epochs:           1,
            seed:             42,
            num_workers:      4,
            failure_policy:   FailurePolicy::Skip,
            strict_alignment: false,
        }
    }
}

impl DatasetConfig {
    /// Reject out-of-range options before any file is touched.
    pub fn validate(&self) -> PipelineResult<()> {
        let positive = [
            ("target_height",  self.target_height as usize),
            ("target_width",   self.target_width as usize),
            ("batch_size",     self.batch_size),
            ("shuffle_buffer", self.shuffle_buffer),
            ("epochs",         self.epochs),
            ("num_workers",    self.num_workers),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(PipelineError::config(format!("{name} must be positive")));
            }
        }
        if !(self.train_ratio > 0.0 && self.train_ratio <= 1.0) {
            return Err(PipelineError::config(format!(
                "train_ratio must be in (0, 1], got {}",
                self.train_ratio
            )));
        }
        Ok(())
    }

    fn assembler_options(&self) -> AssemblerOptions {
        AssemblerOptions {
            batch_size:     self.batch_size,
            shuffle_buffer: self.shuffle_buffer,
            seed:           self.seed,
            num_workers:    self.num_workers,
            failure_policy: self.failure_policy,
        }
    }
}

// ─── Pass Summary ────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassSummary {
    pub batches:          usize,
    pub samples:          usize,
    pub skipped:          usize,
    /// Total true label length over all batched samples
    pub label_characters: usize,
    /// Samples with more label characters than CTC time steps
    pub infeasible:       usize,
}

impl PassSummary {
    fn add(&mut self, batch: &Batch, blank_id: u32) {
        // the image width is the CTC time axis
        let lengths = CtcLengths::from_labels(batch.width, &batch.labels, blank_id);
        self.batches += 1;
        self.samples += batch.batch_size;
        self.label_characters += lengths.label_lengths.iter().sum::<usize>();
        self.infeasible += lengths.infeasible();
    }
}

// ─── AssembleUseCase ─────────────────────────────────────────────────────────
pub struct AssembleUseCase {
    config: DatasetConfig,
}

impl AssembleUseCase {
    pub fn new(config: DatasetConfig) -> Self {
        Self { config }
    }

    /// Run every step with a single checking pass over both splits
    /// and write the manifest. `epochs` is recorded for the model
    /// runtime, which drives the passes itself through `execute_with`.
    pub fn execute(&self) -> Result<RunManifest> {
        self.run(1, |_, _, _| Ok(()))
    }

    /// Run `epochs` passes, handing each batch to `consume` along
    /// with its epoch and whether it belongs to the training split.
    pub fn execute_with<F>(&self, consume: F) -> Result<RunManifest>
    where
        F: FnMut(u64, bool, &Batch) -> Result<()>,
    {
        self.run(self.config.epochs, consume)
    }

    fn run<F>(&self, epochs: usize, mut consume: F) -> Result<RunManifest>
    where
        F: FnMut(u64, bool, &Batch) -> Result<()>,
    {
        let cfg = &self.config;

        // ── Step 1: Validate ─────────────────────────────────────────────────
        cfg.validate().context("Invalid dataset configuration")?;

        // ── Step 2: Build the vocabulary (barrier) ───────────────────────────
        let vocab = VocabularyBuilder::new(&cfg.gt_dir)
            .build()
            .with_context(|| format!("Cannot build vocabulary from '{}'", cfg.gt_dir.display()))?;
        let vocab = Arc::new(vocab);

        // ── Step 3: Persist it next to the dataset ───────────────────────────
        VocabularyStore::new(&cfg.output_dir).save(&vocab)?;

        // ── Step 4: Discover samples ─────────────────────────────────────────
        let (samples, report) = SampleLoader::new(&cfg.images_dir, &cfg.gt_dir)
            .strict_alignment(cfg.strict_alignment)
            .load()
            .context("Sample discovery failed")?;

        // ── Step 5: Split ────────────────────────────────────────────────────
        let (train, val) = split_train_val(samples, cfg.train_ratio, cfg.seed);
        tracing::info!("Split: {} train, {} validation", train.len(), val.len());
        if train.is_empty() {
            return Err(PipelineError::data(format!(
                "train_ratio {} leaves no training samples out of {}",
                cfg.train_ratio,
                val.len()
            ))
            .into());
        }

        // ── Step 6: Assemble ─────────────────────────────────────────────────
        let transform = SampleTransform::new(cfg.target_height, cfg.target_width, vocab.clone());
        let train = DatasetAssembler::new(LineDataset::new(train), transform.clone(), cfg.assembler_options())?;
        let val   = DatasetAssembler::new(LineDataset::new(val), transform, cfg.assembler_options())?;

        let mut skipped_samples   = 0;
        let mut infeasible_labels = 0;
        for epoch in 0..epochs as u64 {
            for (is_train, assembler) in [(true, &train), (false, &val)] {
                let mut summary = PassSummary::default();
                let mut batches = assembler.batches(epoch);
                for batch in batches.by_ref() {
                    let batch = batch.with_context(|| format!("Epoch {epoch} aborted"))?;
                    tracing::debug!(
                        "Epoch {} batch {}: {} samples, max label length {}",
                        epoch, summary.batches, batch.batch_size, batch.max_label_len
                    );
                    consume(epoch, is_train, &batch)?;
                    summary.add(&batch, vocab.blank_id());
                }
                summary.skipped = batches.skipped();
                skipped_samples += summary.skipped;
                infeasible_labels += summary.infeasible;
                if summary.infeasible > 0 {
                    tracing::warn!(
                        "{} samples have labels longer than {} time steps; widen target_width",
                        summary.infeasible, cfg.target_width
                    );
                }

                tracing::info!(
                    "Epoch {} {}: {} batches, {} samples, {} label characters, {} skipped",
                    epoch,
                    if is_train { "train" } else { "validation" },
                    summary.batches, summary.samples, summary.label_characters, summary.skipped
                );
            }
        }

        // ── Step 7: Manifest ─────────────────────────────────────────────────
        let manifest = RunManifest {
            config:          cfg.clone(),
            report,
            vocabulary_size: vocab.size(),
            blank_id:        vocab.blank_id(),
            train_samples:   train.sample_count(),
            val_samples:     val.sample_count(),
            train_batches:   train.batch_count(),
            val_batches:     val.batch_count(),
            skipped_samples,
            infeasible_labels,
        };
        ManifestStore::new(&cfg.output_dir).save(&manifest)?;

        tracing::info!(
            "Dataset assembled in '{}': {} train / {} validation samples",
            cfg.output_dir.display(), manifest.train_samples, manifest.val_samples
        );
        Ok(manifest)
    }
}
