// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles all cross-cutting concerns that don't belong in
// any specific business layer:
//
//   checkpoint.rs   — Saving and loading model weights
//                     Uses Burn's CompactRecorder to
//                     serialise model parameters to disk.
//                     Also saves/loads the model config as JSON
//                     so evaluation can rebuild the model.
//
//   word_vectors.rs — Pretrained word2vec model
//                     Reads the text or binary interchange
//                     format and answers token lookups for the
//                     vocabulary and embedding matrix.
//
//   metrics.rs      — ROC/AUC and training metrics
//                     Builds the ROC curve from scores and
//                     labels; writes epoch-level loss and
//                     accuracy to a CSV file.
//
//   plot.rs         — ROC chart
//                     Renders the curve and its AUC to SVG.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// word2vec text/binary loader
pub mod word_vectors;

/// ROC/AUC and training metrics CSV logger
pub mod metrics;

/// ROC curve rendering
pub mod plot;
