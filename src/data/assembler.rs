// ============================================================
// Layer 4 — Dataset Assembler
// ============================================================
// Turns a Dataset<Sample> into a lazy, finite stream of padded
// batches.
//
//   Dataset<Sample>  (paths + labels, sorted discovery order)
//       │
//       ▼
//   ShuffleBuffer    bounded approximate shuffle, seed + epoch
//       │  take batch_size samples
//       ▼
//   rayon pool       SampleTransform on each sample in parallel
//       │            (decode, normalise, resize, transpose, encode)
//       ▼
//   LineBatcher      pad labels with blank_id
//       │
//       ▼
//   Batch
//
// Only one batch worth of images is decoded ahead of the
// consumer. Every call to `batches(epoch)` starts a fresh pass
// over the same sample list, so the stream can be restarted for
// each epoch.
//
// Decode failures follow the FailurePolicy: Abort ends the pass
// with the error, Skip logs the sample and counts it. The count
// is reported when the pass finishes.

use burn::data::dataset::Dataset;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::data::batcher::{Batch, LineBatcher};
use crate::data::shuffle::ShuffleBuffer;
use crate::data::transform::SampleTransform;
use crate::domain::error::{PipelineError, Result};
use crate::domain::sample::{EncodedSample, Sample};

pub const DEFAULT_BATCH_SIZE: usize = 32;
pub const DEFAULT_SHUFFLE_BUFFER: usize = 1000;

/// What to do when one sample cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the pass and return the error
    Abort,
    /// Log, count and continue
    #[default]
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerOptions {
    pub batch_size:     usize,
    pub shuffle_buffer: usize,
    pub seed:           u64,
    pub num_workers:    usize,
    pub failure_policy: FailurePolicy,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            batch_size:     DEFAULT_BATCH_SIZE,
            shuffle_buffer: DEFAULT_SHUFFLE_BUFFER,
            seed:           42,
            num_workers:    4,
            failure_policy: FailurePolicy::Skip,
        }
    }
}

pub struct DatasetAssembler<D> {
    dataset:   D,
    transform: SampleTransform,
    batcher:   LineBatcher,
    options:   AssemblerOptions,
    pool:      Arc<rayon::ThreadPool>,
}

impl<D: Dataset<Sample>> DatasetAssembler<D> {
    pub fn new(dataset: D, transform: SampleTransform, options: AssemblerOptions) -> Result<Self> {
        if options.batch_size == 0 {
            return Err(PipelineError::config("batch_size must be positive"));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.num_workers.max(1))
            .build()
            .map_err(|e| PipelineError::config(format!("cannot start worker pool: {e}")))?;
        let batcher = LineBatcher::new(transform.vocabulary().blank_id());

        Ok(Self {
            dataset,
            transform,
            batcher,
            options,
            pool: Arc::new(pool),
        })
    }

    pub fn sample_count(&self) -> usize {
        self.dataset.len()
    }

    /// Number of batches in one full pass, assuming nothing is skipped.
    pub fn batch_count(&self) -> usize {
        self.dataset.len().div_ceil(self.options.batch_size)
    }

    /// A fresh pass over the dataset. The shuffle seed is
    /// `seed + epoch`, so each epoch has its own fixed order.
    pub fn batches(&self, epoch: u64) -> BatchIter<'_, D> {
        let dataset = &self.dataset;
        let source: Box<dyn Iterator<Item = Sample> + '_> =
            Box::new((0..dataset.len()).filter_map(move |i| dataset.get(i)));
        BatchIter {
            assembler: self,
            samples:   ShuffleBuffer::new(
                source,
                self.options.shuffle_buffer,
                self.options.seed.wrapping_add(epoch),
            ),
            epoch,
            emitted:   0,
            skipped:   0,
            finished:  false,
        }
    }

    fn encode_chunk(&self, chunk: &[Sample]) -> Vec<Result<EncodedSample>> {
        let transform = &self.transform;
        self.pool
            .install(|| chunk.par_iter().map(|s| transform.apply(s)).collect())
    }
}

/// One pass over the dataset; yields `Result<Batch>`.
pub struct BatchIter<'a, D> {
    assembler: &'a DatasetAssembler<D>,
    samples:   ShuffleBuffer<Box<dyn Iterator<Item = Sample> + 'a>>,
    epoch:     u64,
    emitted:   usize,
    skipped:   usize,
    finished:  bool,
}

impl<D> BatchIter<'_, D> {
    /// Samples encoded into batches so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Samples dropped by the skip policy so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            tracing::info!(
                "Epoch {} pass complete: {} samples batched, {} skipped",
                self.epoch, self.emitted, self.skipped
            );
        }
    }
}

impl<D: Dataset<Sample>> Iterator for BatchIter<'_, D> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let batch_size = self.assembler.options.batch_size;

        loop {
            let chunk: Vec<Sample> = self.samples.by_ref().take(batch_size).collect();
            if chunk.is_empty() {
                self.finish();
                return None;
            }

            let mut encoded = Vec::with_capacity(chunk.len());
            for (sample, result) in chunk.iter().zip(self.assembler.encode_chunk(&chunk)) {
                match result {
                    Ok(e) => encoded.push(e),
                    Err(e)
                        if e.is_recoverable()
                            && self.assembler.options.failure_policy == FailurePolicy::Skip =>
                    {
                        tracing::warn!("Skipping '{}': {}", sample.image_path.display(), e);
                        self.skipped += 1;
                    }
                    Err(e) => {
                        tracing::error!("Aborting pass at '{}': {}", sample.image_path.display(), e);
                        self.finish();
                        return Some(Err(e));
                    }
                }
            }

            // every sample of this chunk failed; try the next one
            if encoded.is_empty() {
                continue;
            }
            self.emitted += encoded.len();
            return Some(Ok(self.assembler.batcher.batch(encoded)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::LineDataset;
    use crate::domain::vocabulary::Vocabulary;
    use image::{GrayImage, Luma};
    use std::path::Path;

    const LABELS: [&str; 7] = ["a", "ab", "abc", "ba", "cab", "c", "bb"];

    fn write_lines(dir: &Path, broken: &[usize]) -> Vec<Sample> {
        LABELS
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let path = dir.join(format!("line_{}.png", i + 1));
                if broken.contains(&i) {
                    std::fs::write(&path, b"not an image").unwrap();
                } else {
                    GrayImage::from_pixel(20 + i as u32, 8, Luma([200])).save(&path).unwrap();
                }
                Sample::new(path, label).unwrap()
            })
            .collect()
    }

    fn assembler(samples: Vec<Sample>, options: AssemblerOptions) -> DatasetAssembler<LineDataset> {
        let vocab = Arc::new(Vocabulary::from_texts(LABELS));
        let transform = SampleTransform::new(8, 16, vocab);
        DatasetAssembler::new(LineDataset::new(samples), transform, options).unwrap()
    }

    fn options(batch_size: usize, policy: FailurePolicy) -> AssemblerOptions {
        AssemblerOptions {
            batch_size,
            shuffle_buffer: 4,
            seed: 11,
            num_workers: 2,
            failure_policy: policy,
        }
    }

    #[test]
    fn test_all_samples_batched_once() {
        let dir = tempfile::tempdir().unwrap();
        let asm = assembler(write_lines(dir.path(), &[]), options(3, FailurePolicy::Skip));
        let batches: Vec<Batch> = asm.batches(0).map(|b| b.unwrap()).collect();

        assert_eq!(batches.len(), 3);
        assert_eq!(batches.len(), asm.batch_count());
        assert_eq!(batches.iter().map(|b| b.batch_size).collect::<Vec<_>>(), vec![3, 3, 1]);

        let mut lengths: Vec<usize> = batches.iter().flat_map(|b| b.label_lengths.clone()).collect();
        lengths.sort();
        let mut expected: Vec<usize> = LABELS.iter().map(|l| l.len()).collect();
        expected.sort();
        assert_eq!(lengths, expected);
    }

    #[test]
    fn test_padding_invariant_in_every_batch() {
        let dir = tempfile::tempdir().unwrap();
        let asm = assembler(write_lines(dir.path(), &[]), options(4, FailurePolicy::Skip));
        let blank = 3; // a, b, c
        for batch in asm.batches(0) {
            let batch = batch.unwrap();
            let lmax = *batch.label_lengths.iter().max().unwrap();
            assert_eq!(batch.max_label_len, lmax);
            for (row, &len) in batch.labels.iter().zip(&batch.label_lengths) {
                assert!(len > 0);
                assert_eq!(row.len(), lmax);
                assert!(row[..len].iter().all(|&id| id != blank));
                assert!(row[len..].iter().all(|&id| id == blank));
            }
            assert_eq!(batch.image_shape(), [batch.batch_size, 16, 8, 1]);
        }
    }

    #[test]
    fn test_restart_with_same_epoch_is_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let asm = assembler(write_lines(dir.path(), &[]), options(2, FailurePolicy::Skip));
        let a: Vec<Batch> = asm.batches(3).map(|b| b.unwrap()).collect();
        let b: Vec<Batch> = asm.batches(3).map(|b| b.unwrap()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_skip_policy_counts_failures() {
        let dir = tempfile::tempdir().unwrap();
        let asm = assembler(write_lines(dir.path(), &[1, 4]), options(3, FailurePolicy::Skip));
        let mut iter = asm.batches(0);
        let total: usize = iter.by_ref().map(|b| b.unwrap().batch_size).sum();
        assert_eq!(total, 5);
        assert_eq!(iter.skipped(), 2);
        assert_eq!(iter.emitted(), 5);
    }

    #[test]
    fn test_abort_policy_stops_pass() {
        let dir = tempfile::tempdir().unwrap();
        let asm = assembler(write_lines(dir.path(), &[2]), options(3, FailurePolicy::Abort));
        let results: Vec<Result<Batch>> = asm.batches(0).collect();
        assert!(results.last().unwrap().is_err());
        assert!(results.iter().filter(|r| r.is_err()).count() == 1);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let vocab = Arc::new(Vocabulary::from_texts(["a"]));
        let transform = SampleTransform::new(8, 8, vocab);
        let err = DatasetAssembler::new(LineDataset::default(), transform, options(0, FailurePolicy::Skip))
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
