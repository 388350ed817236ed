// ============================================================
// Layer 4 — Embedding Matrix Assembler
// ============================================================
// Builds the lookup table the model's (frozen) embedding layer
// is initialised with:
//
//   row 0        all zeros — padding positions contribute nothing
//   row id ≥ 1   pretrained vector of that token, when the
//                word-vector source has it; otherwise a random
//                standard-normal row
//
// All random rows are drawn in one go when the matrix is
// allocated, then the known rows are overwritten. The random
// rows are never redrawn or trained.

use anyhow::{bail, Result};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::data::vocabulary::Vocabulary;
use crate::domain::traits::WordVectorSource;

/// Dense row-major (vocabulary rows × dim) matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    rows: usize,
    dim:  usize,
    data: Vec<f32>,
}

impl EmbeddingMatrix {
    /// Assemble the matrix for `vocab` from `source`.
    pub fn assemble<S, R>(vocab: &Vocabulary, dim: usize, source: &S, rng: &mut R) -> Result<Self>
    where
        S: WordVectorSource + ?Sized,
        R: Rng,
    {
        if source.dim() != dim {
            bail!(
                "Embedding dimension {} does not match word vectors of dimension {}",
                dim,
                source.dim()
            );
        }

        let rows = vocab.matrix_rows();
        let mut data: Vec<f32> = (0..rows * dim)
            .map(|_| rng.sample::<f32, _>(StandardNormal))
            .collect();

        // Padding row
        data[..dim].fill(0.0);

        let mut copied = 0usize;
        for (id, token) in vocab.iter() {
            if let Some(vector) = source.vector(token) {
                if vector.len() != dim {
                    bail!(
                        "Vector for '{}' has {} values, expected {}",
                        token,
                        vector.len(),
                        dim
                    );
                }
                let start = id as usize * dim;
                data[start..start + dim].copy_from_slice(vector);
                copied += 1;
            }
        }

        tracing::debug!(
            "Embedding matrix {}x{}: {} pretrained rows, {} random rows",
            rows,
            dim,
            copied,
            rows - 1 - copied
        );

        Ok(Self { rows, dim, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    #[cfg(test)]
    pub fn row(&self, id: usize) -> &[f32] {
        &self.data[id * self.dim..(id + 1) * self.dim]
    }

    /// Flat row-major values, ready for a tensor of shape [rows, dim]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}
