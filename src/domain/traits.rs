// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The pipeline talks to its collaborators only through these
// traits, so each one can be swapped without touching the code
// that uses it:
//   - CsvPairLoader implements PairSource
//   - WordVectors   implements WordVectorSource
//   - SimilarityScorer implements PairScorer
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::block_pair::CodeBlockPair;

// ─── PairSource ───────────────────────────────────────────────────────────────
/// Any component that can load rows of code-block pairs.
pub trait PairSource {
    /// Load every row, in file order.
    fn load_all(&self) -> Result<Vec<CodeBlockPair>>;
}

// ─── WordVectorSource ─────────────────────────────────────────────────────────
/// A pretrained word-embedding model queried by exact token.
pub trait WordVectorSource {
    /// Dimension of every vector in the source
    fn dim(&self) -> usize;

    /// Vector for `token`, or None when the token is unknown
    fn vector(&self, token: &str) -> Option<&[f32]>;

    /// True when the source knows `token`
    fn contains(&self, token: &str) -> bool {
        self.vector(token).is_some()
    }
}

// ─── PairScorer ───────────────────────────────────────────────────────────────
/// Any component that scores padded id-sequence pairs.
///
/// Contract: one score per pair, in input order; higher means
/// more similar.
pub trait PairScorer {
    /// Length every sequence is padded to before scoring
    fn input_len(&self) -> usize;

    fn score(&self, left: &[Vec<u32>], right: &[Vec<u32>]) -> Result<Vec<f32>>;
}
