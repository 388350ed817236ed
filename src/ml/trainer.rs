// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + validation loop using Burn's DataLoader and Adam.
//
// Key Burn insight:
//   - Training uses Autodiff<backend> for gradients
//   - model.valid() returns the model on the inner backend
//   - Validation batcher must also use the inner backend
//   - The embedding is frozen, so Adam only ever sees LSTM
//     parameters
//
// Per epoch:
//   train batches → MSE(score, label) → backward → Adam step
//   val batches   → MSE + accuracy (score > 0.5 vs label)
//   → println, metrics.csv row, checkpoint
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    backend::Autodiff,
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::{batcher::PairBatcher, dataset::PairDataset, embedding_matrix::EmbeddingMatrix};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::model::SiameseLstmConfig;
use crate::ml::{ComputeDevice, CpuBackend, GpuBackend};

#[derive(Config, Debug)]
pub struct TrainerConfig {
    #[config(default = 10)]
    pub epochs: usize,
    #[config(default = 64)]
    pub batch_size: usize,
    #[config(default = 1e-3)]
    pub lr: f64,
    #[config(default = 42)]
    pub seed: u64,
}

/// Everything the loop consumes, grouped so backends can be swapped.
pub struct TrainingRun<'a> {
    pub model:         SiameseLstmConfig,
    pub trainer:       TrainerConfig,
    pub embeddings:    &'a EmbeddingMatrix,
    pub train_dataset: PairDataset,
    pub val_dataset:   PairDataset,
    pub checkpoints:   &'a CheckpointManager,
    pub metrics:       &'a MetricsLogger,
}

/// Train on the chosen device; returns one metrics row per epoch.
pub fn run_training(device: ComputeDevice, run: TrainingRun<'_>) -> Result<Vec<EpochMetrics>> {
    match device {
        ComputeDevice::Cpu => {
            let device = ComputeDevice::cpu_device();
            tracing::info!("Using NdArray device: {:?}", device);
            train_loop::<Autodiff<CpuBackend>>(run, device)
        }
        ComputeDevice::Gpu => {
            let device = ComputeDevice::gpu_device();
            tracing::info!("Using WGPU device: {:?}", device);
            train_loop::<Autodiff<GpuBackend>>(run, device)
        }
    }
}

fn train_loop<B: AutodiffBackend>(run: TrainingRun<'_>, device: B::Device) -> Result<Vec<EpochMetrics>> {
    let cfg = &run.trainer;
    B::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model = run.model.init_with_embeddings::<B>(run.embeddings, &device)?;
    tracing::info!(
        "Model ready: embedding {}x{} (frozen), LSTM {} → {}",
        run.model.vocab_size,
        run.model.embedding_dim,
        run.model.first_layer_units,
        run.model.second_layer_units,
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_loader = DataLoaderBuilder::new(PairBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(run.train_dataset);

    // ── Validation data loader (InnerBackend — no autodiff overhead) ──────────
    let val_loader = DataLoaderBuilder::new(PairBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(run.val_dataset);

    let mut history       = Vec::with_capacity(cfg.epochs);
    let mut best_val_loss = f64::INFINITY;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.left, batch.right, batch.labels);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else {
            f64::NAN
        };

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();

        let mut val_loss_sum  = 0.0f64;
        let mut val_batches   = 0usize;
        let mut correct       = 0usize;
        let mut total_samples = 0usize;

        for batch in val_loader.iter() {
            total_samples += batch.labels.dims()[0];

            let (loss, scores) =
                model_valid.forward_loss(batch.left, batch.right, batch.labels.clone());
            val_loss_sum += loss.into_scalar().elem::<f64>();
            val_batches  += 1;

            let hits: i64 = scores
                .greater_elem(0.5)
                .equal(batch.labels.greater_elem(0.5))
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>();
            correct += hits as usize;
        }

        let avg_val_loss = if val_batches   > 0 { val_loss_sum / val_batches as f64 } else { f64::NAN };
        let val_accuracy = if total_samples > 0 { correct as f64 / total_samples as f64 } else { 0.0 };

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_acc={:.1}%",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss, val_accuracy * 100.0,
        );

        let metrics = EpochMetrics::new(epoch, avg_train_loss, avg_val_loss, val_accuracy);
        if metrics.is_improvement(best_val_loss) {
            best_val_loss = metrics.val_loss;
            tracing::info!("Epoch {}: best validation loss so far ({:.4})", epoch, best_val_loss);
        }
        run.metrics.log(&metrics)?;
        history.push(metrics);

        run.checkpoints.save_model(&model_valid, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
    }

    tracing::info!("Training complete!");
    Ok(history)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{dataset::PairSample, vocabulary::build_vocabulary};
    use crate::domain::block_pair::CodeBlockPair;
    use crate::infra::word_vectors::WordVectors;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_training_writes_metrics_and_checkpoints() {
        let dir = tempfile::tempdir().unwrap();
        let source = WordVectors::from_entries(
            2,
            vec![
                ("MOV".to_string(), vec![1.0, 0.0]),
                ("ADD".to_string(), vec![0.0, 1.0]),
            ],
        )
        .unwrap();
        let rows = [CodeBlockPair::new("mov add", "add")];
        let corpus = build_vocabulary(&[&rows[..]], &source);
        let matrix = EmbeddingMatrix::assemble(&corpus.vocabulary, 2, &source, &mut StdRng::seed_from_u64(3)).unwrap();

        let sample = |l: Vec<u32>, r: Vec<u32>, label: f32| PairSample { left: l, right: r, label };
        let train = PairDataset::new(vec![
            sample(vec![0, 1, 2], vec![0, 1, 2], 1.0),
            sample(vec![0, 0, 1], vec![0, 0, 2], 0.0),
            sample(vec![0, 2, 2], vec![0, 2, 2], 1.0),
        ]);
        let val = PairDataset::new(vec![sample(vec![1, 1, 1], vec![2, 2, 2], 0.0)]);

        let checkpoints = CheckpointManager::new(dir.path());
        let metrics = MetricsLogger::new(dir.path()).unwrap();
        let run = TrainingRun {
            model: SiameseLstmConfig::new(matrix.rows())
                .with_embedding_dim(2)
                .with_max_seq_len(3)
                .with_first_layer_units(3)
                .with_second_layer_units(2),
            trainer: TrainerConfig::new().with_epochs(2).with_batch_size(2),
            embeddings: &matrix,
            train_dataset: train,
            val_dataset: val,
            checkpoints: &checkpoints,
            metrics: &metrics,
        };

        let history = run_training(ComputeDevice::Cpu, run).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|m| m.train_loss.is_finite() && m.val_loss.is_finite()));
        assert_eq!(checkpoints.latest_epoch().unwrap(), 2);
        assert!(dir.path().join("model_epoch_2.mpk.gz").exists());

        let csv = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }
}
