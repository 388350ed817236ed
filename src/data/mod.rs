// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from CSV rows all the way to
// tensor batches.
//
// The pipeline flows in this order:
//
//   train.csv / test.csv
//       │
//       ▼
//   CsvPairLoader      → reads rows, keeps the two code columns
//       │
//       ▼
//   tokenize           → uppercase + whitespace split
//       │
//       ▼
//   VocabularyBuilder  → token → id, drops unknown tokens
//       │
//       ├──► EmbeddingMatrix → id → vector table for the model
//       ▼
//   pad_sequence       → fixed-length, left-padded id sequences
//       │
//       ▼
//   PairDataset        → implements Burn's Dataset trait
//       │
//       ▼
//   PairBatcher        → stacks pairs into tensor batches
//
// Each module is responsible for exactly one step.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads code-block pairs from CSV tables
pub mod loader;

/// Uppercase + whitespace tokenizer
pub mod tokenizer;

/// Token → id assignment over all tables
pub mod vocabulary;

/// Id → vector table for the embedding layer
pub mod embedding_matrix;

/// Left padding / front truncation to a fixed length
pub mod padder;

/// Implements Burn's Dataset trait for padded pairs
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
