use std::fmt::Display;
use std::path::Path;

use log::debug;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_svg::SVGBackend;

use crate::constants::{CONFUSION_LABEL_THRESHOLD, NUM_CLASSES};
use crate::output::report::ConfusionMatrix;
use crate::types::{MncrError, RnaType};

const CELL: i32 = 90;
const LEFT: i32 = 130;
const TOP: i32 = 60;
const BOTTOM: i32 = 100;
const RIGHT: i32 = 40;

fn render_error<E: Display>(e: E) -> MncrError {
    MncrError::Render(e.to_string())
}

/// White to dark blue
fn heatmap_color(value: f64) -> RGBColor {
    let t = value.clamp(0.0, 1.0);
    let channel = |low: f64| (255.0 - (255.0 - low) * t).round() as u8;
    RGBColor(channel(8.0), channel(48.0), channel(107.0))
}

fn cell_label(value: f64) -> Option<String> {
    (value >= CONFUSION_LABEL_THRESHOLD).then(|| format!("{value:.2}"))
}

/// Renders the row-normalized confusion matrix as an SVG heatmap.
///
/// True labels run down the y axis and predicted labels along the x axis,
/// both in canonical order. Cells below 0.005 are left unlabeled.
pub fn render_confusion_matrix<P: AsRef<Path>>(
    path: P,
    matrix: &ConfusionMatrix,
) -> Result<(), MncrError> {
    let path = path.as_ref();
    let side = CELL * NUM_CLASSES as i32;
    let size = ((LEFT + side + RIGHT) as u32, (TOP + side + BOTTOM) as u32);

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;

    let centered = Pos::new(HPos::Center, VPos::Center);
    root.draw(&Text::new(
        "Normalized confusion matrix",
        (LEFT + side / 2, TOP / 2),
        ("sans-serif", 20).into_font().color(&BLACK).pos(centered),
    ))
    .map_err(render_error)?;

    let normalized = matrix.normalized();
    for (row, values) in normalized.iter().enumerate() {
        for (column, &value) in values.iter().enumerate() {
            let x = LEFT + CELL * column as i32;
            let y = TOP + CELL * row as i32;
            root.draw(&Rectangle::new(
                [(x, y), (x + CELL, y + CELL)],
                heatmap_color(value).filled(),
            ))
            .map_err(render_error)?;

            if let Some(label) = cell_label(value) {
                let ink = if value > 0.5 { WHITE } else { BLACK };
                root.draw(&Text::new(
                    label,
                    (x + CELL / 2, y + CELL / 2),
                    ("sans-serif", 16).into_font().color(&ink).pos(centered),
                ))
                .map_err(render_error)?;
            }
        }
    }

    root.draw(&Rectangle::new(
        [(LEFT, TOP), (LEFT + side, TOP + side)],
        BLACK.stroke_width(1),
    ))
    .map_err(render_error)?;

    let tick_style = ("sans-serif", 14).into_font().color(&BLACK);
    for (index, rna_type) in RnaType::ALL.iter().enumerate() {
        let middle = CELL * index as i32 + CELL / 2;
        root.draw(&Text::new(
            rna_type.as_str(),
            (LEFT - 10, TOP + middle),
            tick_style.pos(Pos::new(HPos::Right, VPos::Center)),
        ))
        .map_err(render_error)?;
        root.draw(&Text::new(
            rna_type.as_str(),
            (LEFT + middle, TOP + side + 10),
            tick_style.pos(Pos::new(HPos::Center, VPos::Top)),
        ))
        .map_err(render_error)?;
    }

    let axis_style = ("sans-serif", 16).into_font().color(&BLACK);
    root.draw(&Text::new(
        "Predicted label",
        (LEFT + side / 2, TOP + side + 50),
        axis_style.pos(centered),
    ))
    .map_err(render_error)?;
    root.draw(&Text::new(
        "True label",
        (20, TOP - 20),
        axis_style.pos(Pos::new(HPos::Left, VPos::Center)),
    ))
    .map_err(render_error)?;

    root.present().map_err(render_error)?;
    debug!("Wrote confusion matrix to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use RnaType::*;
    use tempfile::TempDir;

    #[test]
    fn test_heatmap_color() {
        assert_eq!(heatmap_color(0.0), RGBColor(255, 255, 255));
        assert_eq!(heatmap_color(1.0), RGBColor(8, 48, 107));
        let mid = heatmap_color(0.5);
        assert!(mid.2 > mid.0);
    }

    #[test]
    fn test_cell_label_threshold() {
        assert_eq!(cell_label(0.0), None);
        assert_eq!(cell_label(0.004), None);
        assert_eq!(cell_label(0.005), Some("0.01".to_string()));
        assert_eq!(cell_label(2.0 / 3.0), Some("0.67".to_string()));
    }

    #[test]
    fn test_render_confusion_matrix() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("confusion_matrix.svg");
        let matrix =
            ConfusionMatrix::from_labels(&[TRna, TRna, MiRna], &[TRna, SnRna, MiRna]).unwrap();

        render_confusion_matrix(&path, &matrix).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Predicted label"));
        assert!(svg.contains("0.50"));
        assert!(svg.contains("snoRNA"));
    }
}
