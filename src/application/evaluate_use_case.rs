// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Orchestrates the evaluation pipeline in order:
//
//   Step 1: Prepare corpus (vectors, tables,  (Layer 2 - corpus)
//           vocabulary, embedding matrix)
//   Step 2: Load the trained scorer           (Layer 5 - ml)
//   Step 3: Pad the test pairs                (Layer 4 - data)
//   Step 4: Score every pair                  (Layer 5 - ml)
//   Step 5: ROC curve + AUC                   (Layer 6 - infra)
//   Step 6: Render the ROC chart              (Layer 6 - infra)
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::application::corpus::{prepare_corpus, CorpusConfig, LabelledTable};
use crate::data::{padder::pad_sequences, vocabulary::VocabularyReport};
use crate::domain::{block_pair::EncodedPair, traits::PairScorer};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{roc_curve, RocCurve},
    plot::render_roc_svg,
};
use crate::ml::{inferencer::load_scorer, ComputeDevice};

// ─── Evaluation Configuration ────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    pub corpus:         CorpusConfig,
    pub checkpoint_dir: String,
    pub batch_size:     usize,
    pub device:         ComputeDevice,
    /// Where the ROC chart is written
    pub plot:           String,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            corpus:         CorpusConfig::default(),
            checkpoint_dir: "checkpoints".to_string(),
            batch_size:     64,
            device:         ComputeDevice::Gpu,
            plot:           "roc.svg".to_string(),
        }
    }
}

/// What an evaluation run found.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub pairs:       usize,
    pub positives:   usize,
    pub negatives:   usize,
    pub auc_percent: f64,
    pub roc:         RocCurve,
    pub scores:      Vec<f32>,
    pub vocabulary:  VocabularyReport,
    pub plot:        String,
}

// ─── EvaluateUseCase ──────────────────────────────────────────────────────────
pub struct EvaluateUseCase {
    config: EvalConfig,
}

impl EvaluateUseCase {
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    /// Execute the full evaluation pipeline end to end
    pub fn execute(&self) -> Result<EvaluationReport> {
        let cfg = &self.config;

        // ── Step 1: Shared preparation ───────────────────────────────────────
        let corpus = prepare_corpus(&cfg.corpus, LabelledTable::Test)?;

        // ── Step 2: Trained scorer ───────────────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        let scorer = load_scorer(cfg.device, &ckpt_manager, &corpus.embeddings, cfg.batch_size)?;

        // ── Steps 3-4: Pad and score ─────────────────────────────────────────
        let scores = score_pairs(scorer.as_ref(), &corpus.test, cfg.corpus.max_seq_len)?;

        // ── Step 5: ROC / AUC ────────────────────────────────────────────────
        let labels: Vec<bool> = corpus.test.iter().map(|p| p.label == Some(true)).collect();
        let roc = roc_curve(&scores, &labels)?;
        let auc_percent = roc.auc_percent();
        tracing::info!("AUC over {} test pairs: {:.2}%", labels.len(), auc_percent);

        // ── Step 6: Chart ────────────────────────────────────────────────────
        render_roc_svg(&roc, auc_percent, &cfg.plot)?;

        let positives = labels.iter().filter(|&&l| l).count();
        Ok(EvaluationReport {
            pairs: labels.len(),
            positives,
            negatives: labels.len() - positives,
            auc_percent,
            roc,
            scores,
            vocabulary: corpus.report,
            plot: cfg.plot.clone(),
        })
    }
}

/// Pad both sides to the scorer's input length and score them.
fn score_pairs(scorer: &dyn PairScorer, pairs: &[EncodedPair], max_seq_len: usize) -> Result<Vec<f32>> {
    let input_len = scorer.input_len();
    if input_len != max_seq_len {
        tracing::warn!(
            "Model was trained on sequences of length {}; ignoring --max-seq-len {}",
            input_len,
            max_seq_len
        );
    }

    let left:  Vec<&[u32]> = pairs.iter().map(|p| p.left.as_slice()).collect();
    let right: Vec<&[u32]> = pairs.iter().map(|p| p.right.as_slice()).collect();

    scorer.score(&pad_sequences(&left, input_len), &pad_sequences(&right, input_len))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// Scores a pair by how many trailing positions match.
    struct MatchingTail {
        len: usize,
    }

    impl PairScorer for MatchingTail {
        fn input_len(&self) -> usize {
            self.len
        }

        fn score(&self, left: &[Vec<u32>], right: &[Vec<u32>]) -> Result<Vec<f32>> {
            Ok(left
                .iter()
                .zip(right)
                .map(|(l, r)| {
                    assert_eq!(l.len(), self.len);
                    l.iter().zip(r).filter(|(a, b)| a == b).count() as f32 / self.len as f32
                })
                .collect())
        }
    }

    #[test]
    fn test_pairs_padded_to_scorer_length() {
        let pairs = vec![
            EncodedPair { left: vec![1, 2, 3], right: vec![1, 2, 3], label: Some(true) },
            EncodedPair { left: vec![4, 5, 6, 7], right: vec![9], label: Some(false) },
        ];
        let scores = score_pairs(&MatchingTail { len: 3 }, &pairs, 101).unwrap();
        assert_eq!(scores, vec![1.0, 0.0]);
    }
}
