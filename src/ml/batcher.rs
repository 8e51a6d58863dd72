// ============================================================
// Layer 5 — CTC Tensor Batcher
// ============================================================
// Implements Burn's Batcher trait so encoded line samples can be
// fed to a Burn model runtime.
//
//   Vec<EncodedSample>
//       │  LineBatcher (pad labels with blank_id)
//       ▼
//   CtcBatch
//       images  Tensor<B, 4>       [batch, W, H, 1]
//       labels  Tensor<B, 2, Int>  [batch, Lmax]
//
// B is the Burn Backend (NdArray, Wgpu, ...) so the same batcher
// works on any device.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    tensor::{backend::Backend, Int, Tensor, TensorData},
};

use crate::data::batcher::{Batch, LineBatcher};
use crate::domain::sample::EncodedSample;

#[derive(Debug, Clone)]
pub struct CtcBatch<B: Backend> {
    pub images: Tensor<B, 4>,
    pub labels: Tensor<B, 2, Int>,
}

impl<B: Backend> CtcBatch<B> {
    /// Move an assembled Batch onto `device`.
    pub fn from_batch(batch: &Batch, device: &B::Device) -> Self {
        let images = Tensor::<B, 4>::from_data(
            TensorData::new(batch.images.clone(), batch.image_shape()),
            device,
        );
        let label_data: Vec<i64> = batch.labels_flat().into_iter().map(i64::from).collect();
        let labels = Tensor::<B, 2, Int>::from_data(
            TensorData::new(label_data, [batch.batch_size, batch.max_label_len]),
            device,
        );
        Self { images, labels }
    }
}

#[derive(Clone, Debug)]
pub struct CtcBatcher<B: Backend> {
    batcher: LineBatcher,
    device:  B::Device,
}

impl<B: Backend> CtcBatcher<B> {
    pub fn new(blank_id: u32, device: B::Device) -> Self {
        Self { batcher: LineBatcher::new(blank_id), device }
    }
}

impl<B: Backend> Batcher<EncodedSample, CtcBatch<B>> for CtcBatcher<B> {
    fn batch(&self, items: Vec<EncodedSample>) -> CtcBatch<B> {
        CtcBatch::from_batch(&self.batcher.batch(items), &self.device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use image::{GrayImage, Luma};
    use std::sync::Arc;

    use crate::data::assembler::{AssemblerOptions, DatasetAssembler};
    use crate::data::dataset::LineDataset;
    use crate::data::transform::SampleTransform;
    use crate::domain::sample::Sample;
    use crate::domain::vocabulary::Vocabulary;
    use crate::ml::ctc::derive_lengths;

    type TestBackend = NdArray;

    #[test]
    fn test_tensor_shapes_and_padding() {
        let blank = 4;
        let batcher = CtcBatcher::<TestBackend>::new(blank, Default::default());
        let items = vec![
            EncodedSample { image: vec![0.5; 6], width: 3, height: 2, label: vec![0, 1, 2] },
            EncodedSample { image: vec![1.0; 6], width: 3, height: 2, label: vec![3] },
        ];
        let batch = batcher.batch(items);

        assert_eq!(batch.images.dims(), [2, 3, 2, 1]);
        assert_eq!(batch.labels.dims(), [2, 3]);

        let labels: Vec<i64> = batch.labels.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(labels, vec![0, 1, 2, 3, 4, 4]);
    }

    #[test]
    fn test_assembled_batches_feed_ctc_lengths() {
        let dir = tempfile::tempdir().unwrap();
        let labels = ["exam", "line two", "x"];
        let samples: Vec<Sample> = labels
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let path = dir.path().join(format!("line_{}.png", i + 1));
                GrayImage::from_pixel(40, 10, Luma([90])).save(&path).unwrap();
                Sample::new(&path, text).unwrap()
            })
            .collect();

        let vocab     = Arc::new(Vocabulary::from_texts(labels));
        let transform = SampleTransform::new(8, 20, vocab.clone());
        let options   = AssemblerOptions { batch_size: 3, num_workers: 1, ..Default::default() };
        let assembler = DatasetAssembler::new(LineDataset::new(samples.clone()), transform.clone(), options)
            .unwrap();

        let device  = Default::default();
        let batch   = assembler.batches(0).next().unwrap().unwrap();
        let tensors = CtcBatch::<TestBackend>::from_batch(&batch, &device);
        assert_eq!(tensors.images.dims(), [3, 20, 8, 1]);

        // stand-in for model output: one step per image column
        let probs = Tensor::<TestBackend, 3>::zeros([3, 20, vocab.size()], &device);
        let lengths = derive_lengths(&probs, &tensors.labels, vocab.blank_id()).unwrap();
        assert_eq!(lengths.input_lengths, vec![20; 3]);
        assert_eq!(lengths.label_lengths, batch.label_lengths);
        assert_eq!(lengths.infeasible(), 0);

        // the Burn batcher over the same encoded samples agrees
        let encoded = samples.iter().map(|s| transform.apply(s).unwrap()).collect();
        let direct = CtcBatcher::<TestBackend>::new(vocab.blank_id(), device).batch(encoded);
        let mut sorted: Vec<usize> = derive_lengths(&probs, &direct.labels, vocab.blank_id())
            .unwrap()
            .label_lengths;
        sorted.sort();
        assert_eq!(sorted, vec![1, 4, 8]);
    }
}
