// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `evaluate`
// and all their configurable flags.
//
// Flags both commands need (tables, vectors, columns, lengths)
// live in CorpusArgs and are flattened into each subcommand, so
// `train` and `evaluate` always agree on how ids are built.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, enums, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::{
    corpus::CorpusConfig,
    evaluate_use_case::EvalConfig,
    train_use_case::TrainConfig,
};
use crate::infra::word_vectors::WordVectorFormat;
use crate::ml::ComputeDevice;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the siamese model on the labelled training table
    Train(TrainArgs),

    /// Score the test table with a trained checkpoint and plot the ROC curve
    Evaluate(EvalArgs),
}

/// Compute backend
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceArg {
    /// NdArray, pure Rust
    Cpu,
    /// Wgpu (Vulkan / Metal / DX12)
    Gpu,
}

impl From<DeviceArg> for ComputeDevice {
    fn from(d: DeviceArg) -> Self {
        match d {
            DeviceArg::Cpu => ComputeDevice::Cpu,
            DeviceArg::Gpu => ComputeDevice::Gpu,
        }
    }
}

/// Layout of the word-vector file
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorsFormatArg {
    Text,
    Binary,
    /// Binary for .bin files, text otherwise
    Auto,
}

impl From<VectorsFormatArg> for WordVectorFormat {
    fn from(f: VectorsFormatArg) -> Self {
        match f {
            VectorsFormatArg::Text   => WordVectorFormat::Text,
            VectorsFormatArg::Binary => WordVectorFormat::Binary,
            VectorsFormatArg::Auto   => WordVectorFormat::Auto,
        }
    }
}

/// Inputs and encoding settings shared by both commands.
#[derive(Args, Debug)]
pub struct CorpusArgs {
    /// Training table (CSV with a header row)
    #[arg(long, default_value = "train_set_O2.csv")]
    pub train_csv: String,

    /// Test table (CSV with a header row)
    #[arg(long, default_value = "test_set_O2.csv")]
    pub test_csv: String,

    /// Pretrained word2vec vectors
    #[arg(long)]
    pub vectors: String,

    #[arg(long, value_enum, default_value_t = VectorsFormatArg::Auto)]
    pub vectors_format: VectorsFormatArg,

    /// Column holding the left code block
    #[arg(long, default_value = "x86_bb")]
    pub left_column: String,

    /// Column holding the right code block
    #[arg(long, default_value = "arm_bb")]
    pub right_column: String,

    /// Column holding the 0/1 equivalence label
    #[arg(long, default_value = "eq")]
    pub label_column: String,

    /// Dimension of the word vectors
    #[arg(long, default_value_t = 100)]
    pub embedding_dim: usize,

    /// Length every token sequence is padded or truncated to
    #[arg(long, default_value_t = 101, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    pub max_seq_len: usize,

    /// Seed for the random embedding rows and the train/validation split
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Directory holding model checkpoints
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Number of pairs processed together in one forward pass
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    #[arg(long, value_enum, default_value_t = DeviceArg::Gpu)]
    pub device: DeviceArg,
}

impl From<&CorpusArgs> for CorpusConfig {
    fn from(a: &CorpusArgs) -> Self {
        CorpusConfig {
            train_csv:      a.train_csv.clone(),
            test_csv:       a.test_csv.clone(),
            vectors:        a.vectors.clone(),
            vectors_format: a.vectors_format.into(),
            left_column:    a.left_column.clone(),
            right_column:   a.right_column.clone(),
            label_column:   a.label_column.clone(),
            embedding_dim:  a.embedding_dim,
            max_seq_len:    a.max_seq_len,
            seed:           a.seed,
        }
    }
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Units in the first LSTM (returns the full sequence)
    #[arg(long, default_value_t = 64)]
    pub first_layer_units: usize,

    /// Units in the second LSTM (returns its last state)
    #[arg(long, default_value_t = 50)]
    pub second_layer_units: usize,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            corpus:             CorpusConfig::from(&a.corpus),
            checkpoint_dir:     a.corpus.checkpoint_dir,
            batch_size:         a.corpus.batch_size,
            epochs:             a.epochs,
            lr:                 a.lr,
            first_layer_units:  a.first_layer_units,
            second_layer_units: a.second_layer_units,
            device:             a.corpus.device.into(),
        }
    }
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvalArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Output path of the ROC chart (SVG)
    #[arg(long, default_value = "roc.svg")]
    pub plot: String,
}

impl From<EvalArgs> for EvalConfig {
    fn from(a: EvalArgs) -> Self {
        EvalConfig {
            corpus:         CorpusConfig::from(&a.corpus),
            checkpoint_dir: a.corpus.checkpoint_dir,
            batch_size:     a.corpus.batch_size,
            device:         a.corpus.device.into(),
            plot:           a.plot,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_evaluate_defaults() {
        let cli = Cli::try_parse_from(["code-siamese", "evaluate", "--vectors", "w2v.bin"]).unwrap();
        let Commands::Evaluate(args) = cli.command else {
            panic!("expected evaluate");
        };
        let cfg = EvalConfig::from(args);
        assert_eq!(cfg.corpus.train_csv, "train_set_O2.csv");
        assert_eq!(cfg.corpus.left_column, "x86_bb");
        assert_eq!(cfg.corpus.max_seq_len, 101);
        assert_eq!(cfg.corpus.vectors_format, WordVectorFormat::Auto);
        assert_eq!(cfg.device, ComputeDevice::Gpu);
        assert_eq!(cfg.plot, "roc.svg");
    }

    #[test]
    fn test_train_flags() {
        let cli = Cli::try_parse_from([
            "code-siamese", "train", "--vectors", "v.txt", "--device", "cpu",
            "--epochs", "3", "--second-layer-units", "20", "--vectors-format", "text",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else {
            panic!("expected train");
        };
        let cfg = TrainConfig::from(args);
        assert_eq!(cfg.epochs, 3);
        assert_eq!(cfg.second_layer_units, 20);
        assert_eq!(cfg.first_layer_units, 64);
        assert_eq!(cfg.device, ComputeDevice::Cpu);
        assert_eq!(cfg.corpus.vectors_format, WordVectorFormat::Text);
    }

    #[test]
    fn test_vectors_required_and_zero_length_rejected() {
        assert!(Cli::try_parse_from(["code-siamese", "evaluate"]).is_err());
        assert!(Cli::try_parse_from([
            "code-siamese", "evaluate", "--vectors", "v", "--max-seq-len", "0",
        ])
        .is_err());
    }
}
