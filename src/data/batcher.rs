// ============================================================
// Layer 4 — Pair Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<PairSample>
// into tensors for one siamese forward pass.
//
// How batching works here:
//   Input:  Vec of N PairSamples, each side padded to length S
//   Output: PairBatch with
//             left   [N, S]  Int
//             right  [N, S]  Int
//             labels [N, 1]  Float
//
//   We flatten each side into one long Vec, then reshape:
//   [p1_t1, p1_t2, ..., p1_tS, p2_t1, ..., pN_tS] → [N, S]
//
// The labels get a trailing dimension of 1 so they line up with
// the model's [N, 1] similarity output inside the loss.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::PairSample;

// ─── PairBatch ────────────────────────────────────────────────────────────────
/// A batch of pairs ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct PairBatch<B: Backend> {
    /// Left-branch token ids — shape: [batch_size, seq_len]
    pub left: Tensor<B, 2, Int>,

    /// Right-branch token ids — shape: [batch_size, seq_len]
    pub right: Tensor<B, 2, Int>,

    /// Ground-truth similarity (1.0 / 0.0) — shape: [batch_size, 1]
    pub labels: Tensor<B, 2>,
}

// ─── PairBatcher ──────────────────────────────────────────────────────────────
/// Holds the target device so tensors land on the right GPU/CPU.
#[derive(Clone, Debug)]
pub struct PairBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> PairBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    fn ids_tensor(&self, rows: Vec<i32>, batch_size: usize, seq_len: usize) -> Tensor<B, 2, Int> {
        Tensor::<B, 1, Int>::from_ints(rows.as_slice(), &self.device)
            .reshape([batch_size, seq_len])
    }
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
impl<B: Backend> Batcher<PairSample, PairBatch<B>> for PairBatcher<B> {
    fn batch(&self, items: Vec<PairSample>) -> PairBatch<B> {
        let batch_size = items.len();
        // All sequences share the same length (pre-padded)
        let seq_len = items.first().map(PairSample::seq_len).unwrap_or(0);

        let left_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.left.iter().map(|&x| x as i32))
            .collect();

        let right_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.right.iter().map(|&x| x as i32))
            .collect();

        let labels: Vec<f32> = items.iter().map(|s| s.label).collect();

        let left  = self.ids_tensor(left_flat, batch_size, seq_len);
        let right = self.ids_tensor(right_flat, batch_size, seq_len);
        let labels = Tensor::<B, 1>::from_floats(labels.as_slice(), &self.device)
            .reshape([batch_size, 1]);

        PairBatch { left, right, labels }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_batch_shapes_and_order() {
        let batcher = PairBatcher::<TestBackend>::new(Default::default());
        let items = vec![
            PairSample { left: vec![0, 1, 2], right: vec![0, 0, 3], label: 1.0 },
            PairSample { left: vec![4, 5, 6], right: vec![7, 8, 9], label: 0.0 },
        ];

        let batch = batcher.batch(items);
        assert_eq!(batch.left.dims(), [2, 3]);
        assert_eq!(batch.right.dims(), [2, 3]);
        assert_eq!(batch.labels.dims(), [2, 1]);

        let right: Vec<i64> = batch
            .right
            .into_data()
            .convert::<i64>()
            .to_vec::<i64>()
            .unwrap();
        assert_eq!(right, vec![0, 0, 3, 7, 8, 9]);

        let labels: Vec<f32> = batch.labels.into_data().to_vec::<f32>().unwrap();
        assert_eq!(labels, vec![1.0, 0.0]);
    }
}
