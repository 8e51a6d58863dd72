// ============================================================
// Layer 5 — CTC Lengths and Greedy Decoding
// ============================================================
// The CTC loss needs two length vectors per batch besides the
// model output and the padded labels:
//
//   input_length[i] = T
//       every image is resized to the same width, so every
//       sample has the full T output steps
//
//   label_length[i] = count(labels[i] != blank_id)
//       labels are right-padded with blank_id, and the vocabulary
//       never gives a real character the blank id, so counting
//       non-blank entries recovers the true length
//
// These are recomputed for every batch and never cached.
//
// Greedy decoding turns [batch, T, C] output back into text:
// argmax per step → collapse repeats → drop blanks → vocabulary.
//
// Reference: Graves et al. (2006) Connectionist Temporal Classification

use burn::tensor::{backend::Backend, Int, Tensor, TensorData};

use crate::domain::error::{PipelineError, Result};
use crate::domain::vocabulary::Vocabulary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtcLengths {
    pub input_lengths: Vec<usize>,
    pub label_lengths: Vec<usize>,
}

impl CtcLengths {
    /// Lengths for padded label rows when every sample has `steps`
    /// output steps.
    pub fn from_labels(steps: usize, labels: &[Vec<u32>], blank_id: u32) -> Self {
        Self {
            input_lengths: vec![steps; labels.len()],
            label_lengths: label_lengths(labels, blank_id),
        }
    }

    /// Samples whose label is longer than their output sequence.
    /// CTC cannot align these at all; repeated characters need even
    /// more steps, so this is a lower bound.
    pub fn infeasible(&self) -> usize {
        self.input_lengths
            .iter()
            .zip(&self.label_lengths)
            .filter(|(input, label)| label > input)
            .count()
    }

    /// Both vectors as `[batch]` Int tensors.
    pub fn to_tensors<B: Backend>(&self, device: &B::Device) -> (Tensor<B, 1, Int>, Tensor<B, 1, Int>) {
        let to_tensor = |v: &[usize]| {
            let data: Vec<i64> = v.iter().map(|&x| x as i64).collect();
            let len = data.len();
            Tensor::<B, 1, Int>::from_data(TensorData::new(data, [len]), device)
        };
        (to_tensor(&self.input_lengths), to_tensor(&self.label_lengths))
    }
}

/// Count non-blank entries of each padded row.
pub fn label_lengths(labels: &[Vec<u32>], blank_id: u32) -> Vec<usize> {
    labels
        .iter()
        .map(|row| row.iter().filter(|&&id| id != blank_id).count())
        .collect()
}

/// Derive CTC lengths from model output `[batch, T, C]` and padded
/// labels `[batch, Lmax]`.
pub fn derive_lengths<B: Backend>(
    probs:    &Tensor<B, 3>,
    labels:   &Tensor<B, 2, Int>,
    blank_id: u32,
) -> Result<CtcLengths> {
    let [batch, steps, _] = probs.dims();
    let [label_batch, lmax] = labels.dims();
    if batch != label_batch {
        return Err(PipelineError::data(format!(
            "output batch {batch} does not match label batch {label_batch}"
        )));
    }

    let flat = int_values(labels)?;
    let rows: Vec<Vec<u32>> = if lmax == 0 {
        vec![Vec::new(); batch]
    } else {
        flat.chunks(lmax)
            .map(|row| row.iter().map(|&v| v as u32).collect())
            .collect()
    };

    Ok(CtcLengths::from_labels(steps, &rows, blank_id))
}

/// Collapse repeated ids, then remove blanks.
pub fn collapse(ids: &[u32], blank_id: u32) -> Vec<u32> {
    let mut out = Vec::with_capacity(ids.len());
    let mut prev = None;
    for &id in ids {
        if Some(id) != prev && id != blank_id {
            out.push(id);
        }
        prev = Some(id);
    }
    out
}

/// Best-path decoding of `[batch, T, C]` output into one string
/// per sample. C must equal the vocabulary size.
pub fn greedy_decode<B: Backend>(probs: &Tensor<B, 3>, vocab: &Vocabulary) -> Result<Vec<String>> {
    let [batch, steps, classes] = probs.dims();
    if classes != vocab.size() {
        return Err(PipelineError::data(format!(
            "model emits {classes} classes but the vocabulary has {}",
            vocab.size()
        )));
    }

    let best = int_values(&probs.clone().argmax(2))?;
    if steps == 0 {
        return Ok(vec![String::new(); batch]);
    }
    Ok(best
        .chunks(steps)
        .map(|row| {
            let ids: Vec<u32> = row.iter().map(|&v| v as u32).collect();
            vocab.decode(&collapse(&ids, vocab.blank_id()))
        })
        .collect())
}

fn int_values<B: Backend, const D: usize>(tensor: &Tensor<B, D, Int>) -> Result<Vec<i64>> {
    tensor
        .clone()
        .into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .map_err(|e| PipelineError::data(format!("cannot read tensor values: {e:?}")))
}
