// ============================================================
// Layer 6 — ROC Plot
// ============================================================
// Renders a RocCurve to an SVG file with plotters.
//
//   1.05 ┤        ┌──────────  red: model curve
//        │      ┌─┘       .·
//        │    ┌─┘     .·       silver: chance diagonal
//        │  ┌─┘   .·
//        │ ─┘ .·
//      0 ┼·──────────────── 1
//          False Positive Rate
//
// Reference: plotters crate documentation (ChartBuilder, SVGBackend)

use anyhow::{Context, Result};
use plotters::prelude::*;
use std::path::Path;

use crate::infra::metrics::RocCurve;

const SIZE:   (u32, u32) = (800, 600);
const SILVER: RGBColor   = RGBColor(192, 192, 192);

/// Draw `curve` with its AUC (percent) in the legend and write it to `path`.
pub fn render_roc_svg(curve: &RocCurve, auc_percent: f64, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    draw(curve, auc_percent, path)
        .with_context(|| format!("Cannot render ROC plot to '{}'", path.display()))?;

    tracing::info!("ROC curve written to '{}'", path.display());
    Ok(())
}

fn draw(curve: &RocCurve, auc_percent: f64, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Receiver Operating Characteristic (ROC)", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(0f64..1f64, 0f64..1.05f64)?;

    chart
        .configure_mesh()
        .x_desc("False Positive Rate")
        .y_desc("True Positive Rate")
        .draw()?;

    chart
        .draw_series(LineSeries::new(curve.points(), RED.stroke_width(2)))?
        .label(format!("Siamese Model (AUC = {:.2}%)", auc_percent))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

    chart.draw_series(LineSeries::new(vec![(0.0, 0.0), (1.0, 1.0)], SILVER))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::metrics::roc_curve;

    #[test]
    fn test_writes_svg_with_legend() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("roc.svg");
        let roc  = roc_curve(&[0.9, 0.7, 0.4, 0.2], &[true, false, true, false]).unwrap();

        render_roc_svg(&roc, roc.auc_percent(), &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Siamese Model (AUC = 75.00%)"));
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let roc = roc_curve(&[0.9, 0.1], &[true, false]).unwrap();
        let result = render_roc_svg(&roc, 100.0, "/nonexistent-dir/roc.svg");
        assert!(result.is_err());
    }
}
