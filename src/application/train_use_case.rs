// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Prepare corpus (vectors, tables,  (Layer 2 - corpus)
//           vocabulary, embedding matrix)
//   Step 2: Split train/validation            (Layer 4 - data)
//   Step 3: Pad the pairs                     (Layer 4 - data)
//   Step 4: Build datasets                    (Layer 4 - data)
//   Step 5: Save model config                 (Layer 6 - infra)
//   Step 6: Run training loop                 (Layer 5 - ml)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::application::corpus::{prepare_corpus, CorpusConfig, LabelledTable};
use crate::data::{dataset::PairDataset, splitter::split_train_val};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::{
    model::SiameseLstmConfig,
    trainer::{run_training, TrainerConfig, TrainingRun},
    ComputeDevice,
};

/// Share of the training table used for weight updates
const TRAIN_FRACTION: f64 = 0.8;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so a run can be recorded next to its checkpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub corpus:             CorpusConfig,
    pub checkpoint_dir:     String,
    pub batch_size:         usize,
    pub epochs:             usize,
    pub lr:                 f64,
    pub first_layer_units:  usize,
    pub second_layer_units: usize,
    pub device:             ComputeDevice,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            corpus:             CorpusConfig::default(),
            checkpoint_dir:     "checkpoints".to_string(),
            batch_size:         64,
            epochs:             10,
            lr:                 1e-3,
            first_layer_units:  64,
            second_layer_units: 50,
            device:             ComputeDevice::Gpu,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline; returns per-epoch metrics.
    pub fn execute(&self) -> Result<Vec<EpochMetrics>> {
        let cfg = &self.config;
        if cfg.corpus.max_seq_len == 0 {
            bail!("--max-seq-len must be at least 1");
        }

        // ── Step 1: Shared preparation ───────────────────────────────────────
        let corpus = prepare_corpus(&cfg.corpus, LabelledTable::Train)?;
        if corpus.train.len() < 2 {
            bail!(
                "Training table '{}' has {} rows; at least 2 are needed for a validation split",
                cfg.corpus.train_csv,
                corpus.train.len()
            );
        }

        // ── Step 2: Train / validation split (80/20) ─────────────────────────
        let (train_pairs, val_pairs) = split_train_val(corpus.train, TRAIN_FRACTION, cfg.corpus.seed);

        // ── Steps 3-4: Padded Burn datasets ──────────────────────────────────
        let train_dataset = PairDataset::from_encoded(&train_pairs, cfg.corpus.max_seq_len);
        let val_dataset   = PairDataset::from_encoded(&val_pairs, cfg.corpus.max_seq_len);
        tracing::info!(
            "Split: {} train, {} validation",
            train_dataset.sample_count(),
            val_dataset.sample_count()
        );

        // ── Step 5: Save config for evaluation ───────────────────────────────
        let model_cfg = SiameseLstmConfig::new(corpus.embeddings.rows())
            .with_embedding_dim(cfg.corpus.embedding_dim)
            .with_max_seq_len(cfg.corpus.max_seq_len)
            .with_first_layer_units(cfg.first_layer_units)
            .with_second_layer_units(cfg.second_layer_units);

        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(&model_cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;
        tracing::info!("Per-epoch metrics go to '{}'", metrics.csv_path().display());

        // ── Step 6: Run training loop (Layer 5) ──────────────────────────────
        let run = TrainingRun {
            model:         model_cfg,
            trainer:       TrainerConfig::new()
                .with_epochs(cfg.epochs)
                .with_batch_size(cfg.batch_size.max(1))
                .with_lr(cfg.lr)
                .with_seed(cfg.corpus.seed),
            embeddings:    &corpus.embeddings,
            train_dataset,
            val_dataset,
            checkpoints:   &ckpt_manager,
            metrics:       &metrics,
        };

        run_training(cfg.device, run)
    }
}
