//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed (distance, RSSI) pairs: `o`
//! - fitted log-distance curve: `-`
//! - theoretical free-space curve: `.`

use crate::config::AnalysisConfig;
use crate::derive::Observation;
use crate::fit::SignalModelOutcome;
use crate::models::theoretical_rssi;

/// Render RSSI vs distance with the fitted and theoretical curves.
pub fn render_ascii_plot(
    observations: &[Observation],
    outcome: &SignalModelOutcome,
    config: &AnalysisConfig,
    width: usize,
    height: usize,
) -> String {
    let points: Vec<(f64, f64)> = observations
        .iter()
        .filter_map(|o| Some((o.record.distance?, o.record.rssi?)))
        .collect();

    let (d_min, d_max) = x_range(&points).unwrap_or((0.0, 10.0));
    let n = width.max(2);

    let mut curves = Vec::new();
    if let Some(pl) = outcome.fitted().and_then(|m| m.path_loss) {
        let log = pl.model;
        curves.push(('-', sample_curve(d_min, d_max, n, |d| log.predict(d, config.distance_floor_m))));
    }
    curves.push(('.', sample_curve(d_min, d_max, n, |d| theoretical_rssi(d, config))));

    render_plot(&points, &curves, d_min, d_max, width, height)
}

fn render_plot(
    points: &[(f64, f64)],
    curves: &[(char, Vec<(f64, f64)>)],
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    // Determine y-range from observed points and curve points.
    let all_y = points
        .iter()
        .map(|p| p.1)
        .chain(curves.iter().flat_map(|(_, c)| c.iter().map(|p| p.1)));
    let (y_min, y_max) = y_range(all_y).unwrap_or((-100.0, 0.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curves first (so points can overlay).
    for (ch, curve) in curves {
        draw_curve(&mut grid, curve, *ch, x_min, x_max, y_min, y_max);
    }

    for &(x, y) in points {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: distance=[{x_min:.2}, {x_max:.2}] m | rssi=[{y_min:.2}, {y_max:.2}] dBm\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn x_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for &(x, _) in points {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn sample_curve(x_min: f64, x_max: f64, n: usize, f: impl Fn(f64) -> f64) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let x = x_min + u * (x_max - x_min);
            (x, f(x))
        })
        .collect()
}

fn y_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for y in values.filter(|v| v.is_finite()) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], ch: char, x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve.iter().filter(|p| p.1.is_finite()) {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, ch);
        } else if grid[row][col] == ' ' {
            grid[row][col] = ch;
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive_all;
    use crate::fit::fit_signal_distance;
    use crate::io::ingest::load_records_from_reader;

    #[test]
    fn plot_golden_snapshot_small() {
        let points = [(1.0, -50.0), (10.0, -40.0)];
        let curves = vec![('-', vec![(1.0, -50.0), (10.0, -50.0)])];

        let txt = render_plot(&points, &curves, 1.0, 10.0, 10, 5);
        let expected = concat!(
            "Plot: distance=[1.00, 10.00] m | rssi=[-50.50, -39.50] dBm\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o---------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn plot_draws_points_and_both_curves() {
        let csv = "rssi,distanceInMeter\n-45,0.5\n-58,1.5\n-66,3.0\n-74,6.0\n-80,9.0\n";
        let cfg = AnalysisConfig::default();
        let data = load_records_from_reader(csv.as_bytes(), "plot.csv").unwrap();
        let obs = derive_all(&data.records, &data.columns, &cfg);
        let outcome = fit_signal_distance(&obs, true, &cfg);

        let txt = render_ascii_plot(&obs, &outcome, &cfg, 40, 12);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 13);
        assert!(lines[0].starts_with("Plot: distance=[0.50, 9.00] m"));
        assert!(lines[1..].iter().all(|l| l.chars().count() == 40));
        let body: String = lines[1..].concat();
        assert_eq!(body.matches('o').count(), 5);
        assert!(body.contains('-'));
        assert!(body.contains('.'));
    }
}
