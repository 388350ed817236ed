// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Scores padded pairs with a trained siamese model.
//
//   pairs ──► PairSample (padded) ──► chunks of batch_size
//                                          │
//                                          ▼
//                               PairBatcher → model.forward
//                                          │
//                                          ▼
//                               [batch, 1] scores, appended
//                               in input order
//
// The model is rebuilt from model_config.json, its embedding is
// checked against the vocabulary built for this run, then the
// latest weights are loaded.

use anyhow::{anyhow, bail, Result};
use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::{batcher::PairBatcher, dataset::PairSample, embedding_matrix::EmbeddingMatrix, padder::pad_sequences};
use crate::domain::traits::PairScorer;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::SiameseLstm;
use crate::ml::{ComputeDevice, CpuBackend, GpuBackend};

/// Load the trained scorer onto the chosen device.
pub fn load_scorer(
    device:       ComputeDevice,
    ckpt_manager: &CheckpointManager,
    matrix:       &EmbeddingMatrix,
    batch_size:   usize,
) -> Result<Box<dyn PairScorer>> {
    let scorer: Box<dyn PairScorer> = match device {
        ComputeDevice::Cpu => {
            let device = ComputeDevice::cpu_device();
            tracing::info!("Using NdArray device: {:?}", device);
            Box::new(SimilarityScorer::<CpuBackend>::from_checkpoint(ckpt_manager, matrix, batch_size, &device)?)
        }
        ComputeDevice::Gpu => {
            let device = ComputeDevice::gpu_device();
            tracing::info!("Using WGPU device: {:?}", device);
            Box::new(SimilarityScorer::<GpuBackend>::from_checkpoint(ckpt_manager, matrix, batch_size, &device)?)
        }
    };
    Ok(scorer)
}

pub struct SimilarityScorer<B: Backend> {
    model:       SiameseLstm<B>,
    max_seq_len: usize,
    batch_size:  usize,
    batcher:     PairBatcher<B>,
}

impl<B: Backend> SimilarityScorer<B> {
    pub fn new(model: SiameseLstm<B>, max_seq_len: usize, batch_size: usize, device: B::Device) -> Self {
        Self {
            model,
            max_seq_len,
            batch_size: batch_size.max(1),
            batcher: PairBatcher::new(device),
        }
    }

    /// Rebuild the trained model for this run's embedding matrix.
    ///
    /// Fails when the matrix shape differs from the one the
    /// weights were trained with: the token ids would not line up.
    pub fn from_checkpoint(
        ckpt_manager: &CheckpointManager,
        matrix:       &EmbeddingMatrix,
        batch_size:   usize,
        device:       &B::Device,
    ) -> Result<Self> {
        let cfg = ckpt_manager.load_config()?;
        if cfg.vocab_size != matrix.rows() {
            bail!(
                "Checkpoint in '{}' was trained with {} vocabulary rows but this run built {}. \
                 Use the same CSV tables and word vectors as during training.",
                ckpt_manager.dir().display(),
                cfg.vocab_size,
                matrix.rows()
            );
        }

        let model = cfg.init_with_embeddings::<B>(matrix, device)?;
        let model = ckpt_manager.load_model(model, device)?;
        tracing::info!(
            "Model loaded from checkpoint (input length {}, layers {}/{})",
            cfg.max_seq_len,
            cfg.first_layer_units,
            cfg.second_layer_units
        );

        Ok(Self::new(model, cfg.max_seq_len, batch_size, device.clone()))
    }

    /// One score per sample, in input order.
    pub fn score_samples(&self, samples: &[PairSample]) -> Result<Vec<f32>> {
        let mut scores = Vec::with_capacity(samples.len());

        for (n, chunk) in samples.chunks(self.batch_size).enumerate() {
            let batch = self.batcher.batch(chunk.to_vec());
            let out = self.model.forward(batch.left, batch.right);
            let values = out
                .into_data()
                .to_vec::<f32>()
                .map_err(|e| anyhow!("Cannot read scores of batch {}: {:?}", n, e))?;
            scores.extend(values);
            tracing::debug!("Scored batch {} ({} pairs)", n, chunk.len());
        }

        Ok(scores)
    }
}

impl<B: Backend> PairScorer for SimilarityScorer<B> {
    fn input_len(&self) -> usize {
        self.max_seq_len
    }

    fn score(&self, left: &[Vec<u32>], right: &[Vec<u32>]) -> Result<Vec<f32>> {
        if left.len() != right.len() {
            bail!("Got {} left sequences but {} right sequences", left.len(), right.len());
        }

        let samples: Vec<PairSample> = pad_sequences(left, self.max_seq_len)
            .into_iter()
            .zip(pad_sequences(right, self.max_seq_len))
            .map(|(left, right)| PairSample { left, right, label: 0.0 })
            .collect();

        self.score_samples(&samples)
    }
}
