// ============================================================
// Layer 6 — Metrics
// ============================================================
// Two kinds of numbers leave the pipeline:
//
//   1. Evaluation: ROC curve + AUC over (score, label) pairs
//   2. Training:   one CSV row per epoch
//
// ROC curve construction:
//   Sort pairs by score, highest first. Walking down the list,
//   every distinct score is a threshold: everything at or above
//   it is predicted "equivalent". Pairs sharing a score cross the
//   threshold together, so ties collapse into a single point.
//
//   score  label        threshold  fpr   tpr
//   0.9    1            +inf       0.0   0.0
//   0.8    0      →     0.9        0.0   0.5
//   0.8    1            0.8        0.5   1.0
//   0.1    0            0.1        1.0   1.0
//
// AUC is the trapezoid-rule area under the (fpr, tpr) points and
// is reported as a percentage.
//
// Output file for training: checkpoints/metrics.csv
//
//   epoch,train_loss,val_loss,val_accuracy
//   1,0.241300,0.236800,0.612000
//   2,0.198100,0.204400,0.683000
//
// How to read the training metrics:
//   - Loss should decrease each epoch (model is learning)
//   - If val_loss increases while train_loss decreases → overfitting
//   - val_accuracy counts score > 0.5 as "equivalent"
//
// Reference: Fawcett (2006) An introduction to ROC analysis
//            Rust Book §12 (I/O and File Handling)

use anyhow::{bail, Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

// ─── ROC Curve ────────────────────────────────────────────────────────────────
/// Receiver operating characteristic: parallel vectors, one entry
/// per threshold, starting at (0, 0) with threshold +inf.
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    pub fpr:        Vec<f64>,
    pub tpr:        Vec<f64>,
    pub thresholds: Vec<f64>,
}

impl RocCurve {
    /// Area under the curve in [0, 1], trapezoid rule.
    pub fn auc(&self) -> f64 {
        self.fpr
            .windows(2)
            .zip(self.tpr.windows(2))
            .map(|(x, y)| (x[1] - x[0]) * (y[1] + y[0]) / 2.0)
            .sum()
    }

    /// Area under the curve as a percentage.
    pub fn auc_percent(&self) -> f64 {
        self.auc() * 100.0
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.fpr.iter().copied().zip(self.tpr.iter().copied())
    }
}

/// Build the ROC curve for `scores` against `labels` (true = positive).
///
/// Fails when the inputs differ in length, contain a NaN score, or
/// hold only one class (the curve is undefined then).
pub fn roc_curve(scores: &[f32], labels: &[bool]) -> Result<RocCurve> {
    if scores.len() != labels.len() {
        bail!(
            "Got {} scores but {} labels",
            scores.len(),
            labels.len()
        );
    }
    if scores.iter().any(|s| s.is_nan()) {
        bail!("Scores contain NaN; the model output is unusable");
    }

    let positives = labels.iter().filter(|&&l| l).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        bail!(
            "ROC is undefined for a single class ({} positive, {} negative labels)",
            positives,
            negatives
        );
    }

    // Highest score first
    let mut ranked: Vec<(f64, bool)> = scores
        .iter()
        .zip(labels)
        .map(|(&s, &l)| (s as f64, l))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut curve = RocCurve {
        fpr:        vec![0.0],
        tpr:        vec![0.0],
        thresholds: vec![f64::INFINITY],
    };

    let (mut tp, mut fp) = (0usize, 0usize);
    for (i, &(score, is_positive)) in ranked.iter().enumerate() {
        if is_positive {
            tp += 1;
        } else {
            fp += 1;
        }
        // Emit a point only at the last pair of each tie group
        let tie_continues = ranked.get(i + 1).is_some_and(|next| next.0 == score);
        if !tie_continues {
            curve.fpr.push(fp as f64 / negatives as f64);
            curve.tpr.push(tp as f64 / positives as f64);
            curve.thresholds.push(score);
        }
    }

    Ok(curve)
}

// ─── Training Metrics ─────────────────────────────────────────────────────────
/// One row of metrics data for a single training epoch
#[derive(Debug, Clone)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Mean squared error averaged over training batches
    pub train_loss: f64,

    /// Mean squared error on the validation set
    /// Should track train_loss — divergence indicates overfitting
    pub val_loss: f64,

    /// Fraction of validation pairs whose thresholded score
    /// matches the label. Range: [0.0, 1.0]
    pub val_accuracy: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, val_accuracy: f64) -> Self {
        Self { epoch, train_loss, val_loss, val_accuracy }
    }

    /// Returns true if this epoch improved over the previous best val_loss
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    /// Full path to the CSV file
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");

        // Header only for a new file; later runs append
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,val_loss,val_accuracy")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot append to '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch, m.train_loss, m.val_loss, m.val_accuracy,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );

        Ok(())
    }

    /// Return the path to the metrics CSV file
    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_ranking_is_100_percent() {
        let scores = [0.9, 0.8, 0.3, 0.2];
        let labels = [true, true, false, false];
        let roc = roc_curve(&scores, &labels).unwrap();
        assert!((roc.auc_percent() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_inverted_ranking_is_zero() {
        let roc = roc_curve(&[0.1, 0.2, 0.8, 0.9], &[true, true, false, false]).unwrap();
        assert!(roc.auc().abs() < 1e-9);
    }

    #[test]
    fn test_curve_endpoints() {
        let roc = roc_curve(&[0.7, 0.4, 0.6], &[true, false, false]).unwrap();
        assert_eq!(roc.points().next(), Some((0.0, 0.0)));
        assert_eq!(roc.points().last(), Some((1.0, 1.0)));
        assert_eq!(roc.thresholds[0], f64::INFINITY);
    }

    #[test]
    fn test_ties_collapse_into_one_threshold() {
        let scores = [0.9, 0.8, 0.8, 0.1];
        let labels = [true, false, true, false];
        let roc = roc_curve(&scores, &labels).unwrap();

        assert_eq!(roc.thresholds.len(), 4);
        assert_eq!(roc.fpr, vec![0.0, 0.0, 0.5, 1.0]);
        assert_eq!(roc.tpr, vec![0.0, 0.5, 1.0, 1.0]);
        // 0.5 * 0.75 + 0.5 * 1.0
        assert!((roc.auc() - 0.875).abs() < 1e-9);
    }

    #[test]
    fn test_all_equal_scores_is_chance() {
        let roc = roc_curve(&[0.5; 4], &[true, false, true, false]).unwrap();
        assert!((roc.auc() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_single_class_rejected() {
        assert!(roc_curve(&[0.2, 0.9], &[true, true]).is_err());
        assert!(roc_curve(&[0.2, 0.9], &[false, false]).is_err());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        assert!(roc_curve(&[0.2], &[true, false]).is_err());
    }

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics::new(2, 0.25, 0.23, 0.7);
        assert!(m.is_improvement(0.3));
        assert!(!m.is_improvement(0.2));
    }

    #[test]
    fn test_logger_appends_rows() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EpochMetrics::new(1, 0.5, 0.4, 0.6)).unwrap();
        logger.log(&EpochMetrics::new(2, 0.3, 0.35, 0.7)).unwrap();

        let text = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "epoch,train_loss,val_loss,val_accuracy");
        assert_eq!(lines[2], "2,0.300000,0.350000,0.700000");
        assert_eq!(lines.len(), 3);
    }
}
