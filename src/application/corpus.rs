// ============================================================
// Layer 2 — Corpus Preparation (shared by train and evaluate)
// ============================================================
// Both commands must see the SAME token ids, otherwise weights
// trained by one are meaningless to the other. So both run this
// exact sequence:
//
//   Step 1: Load word vectors            (Layer 6 - infra)
//   Step 2: Load train + test tables     (Layer 4 - data)
//   Step 3: Build vocabulary over        (Layer 4 - data)
//           [train rows, test rows]
//   Step 4: Assemble embedding matrix    (Layer 4 - data)
//           with the seeded RNG
//
// Only the table a command scores against needs its label
// column; the other one contributes tokens only.

use anyhow::{bail, Result};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::{
    embedding_matrix::EmbeddingMatrix,
    loader::CsvPairLoader,
    vocabulary::{build_vocabulary, Vocabulary, VocabularyReport},
};
use crate::domain::{block_pair::EncodedPair, traits::PairSource};
use crate::infra::word_vectors::{WordVectorFormat, WordVectors};

// ─── Corpus Configuration ────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub train_csv:      String,
    pub test_csv:       String,
    pub vectors:        String,
    pub vectors_format: WordVectorFormat,
    pub left_column:    String,
    pub right_column:   String,
    pub label_column:   String,
    pub embedding_dim:  usize,
    pub max_seq_len:    usize,
    pub seed:           u64,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            train_csv:      "train_set_O2.csv".to_string(),
            test_csv:       "test_set_O2.csv".to_string(),
            vectors:        "word_vectors.txt".to_string(),
            vectors_format: WordVectorFormat::Auto,
            left_column:    "x86_bb".to_string(),
            right_column:   "arm_bb".to_string(),
            label_column:   "eq".to_string(),
            embedding_dim:  100,
            max_seq_len:    101,
            seed:           42,
        }
    }
}

/// Which table must carry the label column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelledTable {
    Train,
    Test,
}

/// Output of the shared preparation steps.
pub struct PreparedCorpus {
    pub train:      Vec<EncodedPair>,
    pub test:       Vec<EncodedPair>,
    pub vocabulary: Vocabulary,
    pub report:     VocabularyReport,
    pub embeddings: EmbeddingMatrix,
}

pub fn prepare_corpus(cfg: &CorpusConfig, labelled: LabelledTable) -> Result<PreparedCorpus> {
    // ── Step 1: Word vectors ─────────────────────────────────────────────────
    let vectors = WordVectors::load(&cfg.vectors, cfg.vectors_format)?;

    // ── Step 2: Tables ───────────────────────────────────────────────────────
    let train_rows = loader(cfg, &cfg.train_csv, labelled == LabelledTable::Train).load_all()?;
    let test_rows  = loader(cfg, &cfg.test_csv, labelled == LabelledTable::Test).load_all()?;
    tracing::info!(
        "Loaded {} training rows and {} test rows",
        train_rows.len(),
        test_rows.len()
    );

    // ── Step 3: Vocabulary, train rows first ─────────────────────────────────
    let corpus = build_vocabulary(&[&train_rows[..], &test_rows[..]], &vectors);
    if corpus.vocabulary.is_empty() && corpus.report.dropped_tokens > 0 {
        bail!(
            "None of the {} tokens in the tables is known to the word vectors in '{}'",
            corpus.report.dropped_tokens,
            cfg.vectors
        );
    }
    let mut tables = corpus.tables.into_iter();
    let train = tables.next().unwrap_or_default();
    let test  = tables.next().unwrap_or_default();

    // ── Step 4: Embedding matrix ─────────────────────────────────────────────
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let embeddings = EmbeddingMatrix::assemble(&corpus.vocabulary, cfg.embedding_dim, &vectors, &mut rng)?;

    Ok(PreparedCorpus {
        train,
        test,
        vocabulary: corpus.vocabulary,
        report:     corpus.report,
        embeddings,
    })
}

fn loader(cfg: &CorpusConfig, path: &str, with_label: bool) -> CsvPairLoader {
    let loader = CsvPairLoader::new(path, &cfg.left_column, &cfg.right_column);
    if with_label {
        loader.with_label_column(&cfg.label_column)
    } else {
        loader
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::{fs, path::Path};

    /// Writes vectors plus train/test tables into `dir`.
    pub(crate) fn write_fixture(dir: &Path) -> CorpusConfig {
        fs::write(
            dir.join("vectors.txt"),
            "4 2\nMOV 1 0\nEAX, 0 1\nADD 3 3\nR0, -3 -3\n",
        )
        .unwrap();
        fs::write(
            dir.join("train.csv"),
            ",x86_bb,arm_bb,eq\n\
             0,\"mov eax, 1\",\"mov r0, #1\",1\n\
             1,\"add eax, 2\",\"add r0, r0\",0\n",
        )
        .unwrap();
        fs::write(
            dir.join("test.csv"),
            ",x86_bb,arm_bb,eq\n\
             0,\"mov eax, eax\",\"mov eax, eax\",1\n\
             1,\"add add\",\"r0, r0,\",0\n\
             2,,\"mov\",0\n",
        )
        .unwrap();

        CorpusConfig {
            train_csv:     dir.join("train.csv").display().to_string(),
            test_csv:      dir.join("test.csv").display().to_string(),
            vectors:       dir.join("vectors.txt").display().to_string(),
            embedding_dim: 2,
            max_seq_len:   5,
            ..CorpusConfig::default()
        }
    }

    #[test]
    fn test_ids_assigned_train_first() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = write_fixture(dir.path());
        let corpus = prepare_corpus(&cfg, LabelledTable::Test).unwrap();

        // MOV, EAX, from the first train row
        assert_eq!(corpus.vocabulary.get_id("MOV"), Some(1));
        assert_eq!(corpus.vocabulary.get_id("EAX,"), Some(2));
        assert_eq!(corpus.train[0].left, vec![1, 2]);
        assert_eq!(corpus.test[0].left, corpus.test[0].right);
        assert!(corpus.test[2].left.is_empty());

        assert_eq!(corpus.test[1].label, Some(false));
        assert_eq!(corpus.train[0].label, None);
        assert!(corpus.report.dropped_tokens > 0);
    }

    #[test]
    fn test_embedding_rows_match_vectors() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = write_fixture(dir.path());
        let corpus = prepare_corpus(&cfg, LabelledTable::Train).unwrap();

        assert_eq!(corpus.embeddings.rows(), corpus.vocabulary.matrix_rows());
        let add = corpus.vocabulary.get_id("ADD").unwrap() as usize;
        assert_eq!(corpus.embeddings.row(add), &[3.0, 3.0]);
        assert_eq!(corpus.embeddings.row(0), &[0.0, 0.0]);
    }

    #[test]
    fn test_dimension_mismatch_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = CorpusConfig { embedding_dim: 3, ..write_fixture(dir.path()) };
        assert!(prepare_corpus(&cfg, LabelledTable::Test).is_err());
    }
}
