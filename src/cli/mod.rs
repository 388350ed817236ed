// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`    — fits the siamese model and writes checkpoints
//   2. `evaluate` — scores the test table, prints the AUC and
//                   writes the ROC chart
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvalArgs, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "code-siamese",
    version,
    about = "Score code-block pairs with a siamese LSTM and plot the ROC curve."
)]
pub struct Cli {
    /// The subcommand to run (train or evaluate)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
        }
    }
}

/// Handles the `train` subcommand.
fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on '{}'", args.corpus.train_csv);

    let use_case = TrainUseCase::new(args.into());
    let history  = use_case.execute()?;

    if let Some(last) = history.last() {
        println!(
            "Training complete after {} epochs (val_loss={:.4}, val_acc={:.1}%). Checkpoint saved.",
            last.epoch,
            last.val_loss,
            last.val_accuracy * 100.0
        );
    }
    Ok(())
}

/// Handles the `evaluate` subcommand.
fn run_evaluate(args: EvalArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    tracing::info!("Evaluating pairs from '{}'", args.corpus.test_csv);

    let report = EvaluateUseCase::new(args.into()).execute()?;

    println!(
        "\nPairs: {} ({} equivalent, {} not)",
        report.pairs, report.positives, report.negatives
    );
    if report.vocabulary.dropped_tokens > 0 {
        println!(
            "Unknown tokens dropped: {} ({:.2}%)",
            report.vocabulary.dropped_tokens,
            report.vocabulary.drop_rate() * 100.0
        );
    }
    println!("AUC: {:.2}%", report.auc_percent);
    println!("ROC curve: {} ({} thresholds)", report.plot, report.roc.thresholds.len());
    Ok(())
}
