//! Annotated lower-triangle correlation heatmap (SVG).

use std::path::Path;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::analysis::CorrelationMatrix;
use crate::plot::{DrawResult, segment_end, segment_key};

const CELL_PX: u32 = 70;

/// Render the strictly-lower triangle of `matrix`, one annotated cell per pair.
pub fn render_correlation_heatmap(path: &Path, matrix: &CorrelationMatrix) -> DrawResult {
    let n = matrix.len();
    if n < 2 {
        return Err(format!("need at least two numeric fields for a correlation matrix, found {n}").into());
    }

    let keys: Vec<&str> = matrix.fields.iter().map(|f| f.column_name()).collect();
    let last = n as i32 - 1;
    // Row 0 is drawn at the bottom, so the first field sits on the top row.
    let row_of = |i: usize| last - i as i32;
    let x_label = |v: &SegmentValue<i32>| segment_key(&keys, v, |k| k);
    let y_label = |v: &SegmentValue<i32>| segment_key(&keys, v, |k| last - k);

    let side = CELL_PX * n as u32;
    let root = SVGBackend::new(path, (side + 260, side + 160)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation Matrix (with distance metrics)", ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(170)
        .build_cartesian_2d((0..last).into_segmented(), (0..last).into_segmented())?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n + 1)
        .y_labels(n + 1)
        .x_label_style(("sans-serif", 11).into_font())
        .y_label_style(("sans-serif", 12).into_font())
        .x_label_formatter(&x_label)
        .y_label_formatter(&y_label)
        .draw()?;

    let centered = TextStyle::from(("sans-serif", 13).into_font()).pos(Pos::new(HPos::Center, VPos::Center));

    for i in 1..n {
        let row = row_of(i);
        for j in 0..i {
            let col = j as i32;
            let value = matrix.values[i][j];
            let fill = value.map_or(RGBColor(220, 220, 220), diverging_color);
            chart.draw_series(std::iter::once(Rectangle::new(
                [
                    (SegmentValue::Exact(col), SegmentValue::Exact(row)),
                    (segment_end(col, last), segment_end(row, last)),
                ],
                fill.filled(),
            )))?;

            let text = value.map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}"));
            chart.draw_series(std::iter::once(Text::new(
                text,
                (SegmentValue::CenterOf(col), SegmentValue::CenterOf(row)),
                centered.clone(),
            )))?;
        }
    }

    root.present()?;
    Ok(())
}

/// Blue (-1) through white (0) to red (+1).
pub(crate) fn diverging_color(r: f64) -> RGBColor {
    const NEG: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const POS: (f64, f64, f64) = (180.0, 4.0, 38.0);
    let t = r.clamp(-1.0, 1.0);
    let (target, w) = if t < 0.0 { (NEG, -t) } else { (POS, t) };
    let mix = |end: f64| (255.0 + (end - 255.0) * w).round().clamp(0.0, 255.0) as u8;
    RGBColor(mix(target.0), mix(target.1), mix(target.2))
}
