//! Multi-panel distance analysis figure (3×3, SVG).
//!
//! Every panel reads values already computed by the analysis; the only curves
//! evaluated here are model predictions, and those go through `crate::models`
//! so the drawn theoretical curve is the same function the report numbers use.

use std::path::Path;

use log::debug;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::analysis::{AnalysisResult, DistanceGroup};
use crate::config::{AnalysisConfig, DISTANCE_BAND_EDGES};
use crate::derive::Observation;
use crate::domain::Field;
use crate::models::{log_distance, theoretical_rssi};
use crate::plot::{DrawResult, padded_range, segment_end, segment_key};

type Panel<'a> = DrawingArea<SVGBackend<'a>, Shift>;

const FIGURE_SIZE: (u32, u32) = (1800, 1500);
const CAPTION_FONT: (&str, i32) = ("sans-serif", 18);
const HISTOGRAM_BINS: usize = 20;
const CURVE_SAMPLES: usize = 120;

/// Render the 3×3 analysis figure to `path`.
pub fn render_distance_plots(
    path: &Path,
    observations: &[Observation],
    groups: &[DistanceGroup],
    result: &AnalysisResult,
) -> DrawResult {
    let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Contact Tracing Distance Analysis", ("sans-serif", 28).into_font())?;
    let panels = root.split_evenly((3, 3));
    let cfg = &result.config;

    draw_rssi_vs_distance(&panels[0], observations, result)?;
    draw_distance_histogram(&panels[1], observations)?;
    draw_band_boxplot(&panels[2], observations, groups, Field::Rssi, "RSSI by Distance Group")?;
    draw_scatter(
        &panels[3],
        &Scatter::new("Contact Duration vs Distance", Field::Distance, Field::ContactDuration)
            .points(pairs(observations, Field::Distance, Field::ContactDuration)),
    )?;
    draw_exposure_rates(&panels[4], result)?;
    draw_scatter(&panels[5], &path_loss_scatter(observations, result, cfg))?;
    draw_scatter(
        &panels[6],
        &Scatter::new("RSSI Error vs Distance", Field::Distance, Field::RssiError)
            .points(pairs(observations, Field::Distance, Field::RssiError))
            .zero_line(),
    )?;
    draw_band_boxplot(
        &panels[7],
        observations,
        groups,
        Field::UploadDuration,
        "Upload Duration by Distance Group",
    )?;
    draw_scatter(
        &panels[8],
        &Scatter::new("Contact Efficiency vs Distance", Field::Distance, Field::ContactEfficiency)
            .points(pairs(observations, Field::Distance, Field::ContactEfficiency)),
    )?;

    root.present()?;
    Ok(())
}

/// A scatter panel with optional overlay lines.
struct Scatter {
    title: &'static str,
    x: Field,
    y: Field,
    x_desc: Option<&'static str>,
    points: Vec<(f64, f64)>,
    lines: Vec<Overlay>,
    zero_line: bool,
}

struct Overlay {
    label: &'static str,
    color: RGBColor,
    points: Vec<(f64, f64)>,
}

impl Scatter {
    fn new(title: &'static str, x: Field, y: Field) -> Self {
        Self {
            title,
            x,
            y,
            x_desc: None,
            points: Vec::new(),
            lines: Vec::new(),
            zero_line: false,
        }
    }

    fn points(mut self, points: Vec<(f64, f64)>) -> Self {
        self.points = points;
        self
    }

    fn x_desc(mut self, desc: &'static str) -> Self {
        self.x_desc = Some(desc);
        self
    }

    fn line(mut self, label: &'static str, color: RGBColor, points: Vec<(f64, f64)>) -> Self {
        self.lines.push(Overlay { label, color, points });
        self
    }

    /// Add a `y = 0` reference line across the x range.
    fn zero_line(mut self) -> Self {
        self.zero_line = true;
        self
    }
}

fn draw_scatter(area: &Panel, s: &Scatter) -> DrawResult {
    let Some((x0, x1)) = padded_range(s.points.iter().map(|p| p.0), 0.05) else {
        return draw_unavailable(area, s.title);
    };

    let mut lines: Vec<Overlay> = s
        .lines
        .iter()
        .map(|l| Overlay {
            label: l.label,
            color: l.color,
            points: l.points.iter().copied().filter(|(x, _)| *x >= x0 && *x <= x1).collect(),
        })
        .collect();
    if s.zero_line {
        lines.push(Overlay {
            label: "Zero error",
            color: BLACK,
            points: vec![(x0, 0.0), (x1, 0.0)],
        });
    }

    let y_values = s
        .points
        .iter()
        .map(|p| p.1)
        .chain(lines.iter().flat_map(|l| l.points.iter().map(|p| p.1)));
    let Some((y0, y1)) = padded_range(y_values, 0.05) else {
        return draw_unavailable(area, s.title);
    };

    let mut chart = ChartBuilder::on(area)
        .caption(s.title, CAPTION_FONT)
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc(s.x_desc.unwrap_or_else(|| s.x.display_name()))
        .y_desc(s.y.display_name())
        .draw()?;

    chart.draw_series(
        s.points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 3, BLUE.mix(0.5).filled())),
    )?;

    let mut has_legend = false;
    for line in lines.iter().filter(|l| l.points.len() >= 2) {
        let color = line.color;
        chart
            .draw_series(LineSeries::new(line.points.iter().copied(), color.stroke_width(2)))?
            .label(line.label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        has_legend = true;
    }
    if has_legend {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    Ok(())
}

/// RSSI vs distance with the theoretical free-space curve and the linear fit.
fn draw_rssi_vs_distance(area: &Panel, observations: &[Observation], result: &AnalysisResult) -> DrawResult {
    let cfg = &result.config;
    let points = pairs(observations, Field::Distance, Field::Rssi);
    let mut scatter = Scatter::new("RSSI vs Distance", Field::Distance, Field::Rssi).points(points);

    if let Some((lo, hi)) = padded_range(scatter.points.iter().map(|p| p.0), 0.05) {
        let lo = lo.max(0.0);
        let theoretical = sample_curve(lo, hi, |d| theoretical_rssi(d, cfg));
        scatter = scatter.line("Theoretical (FSPL)", RED, theoretical);
        if let Some(model) = result.signal_model.fitted() {
            let linear = model.linear;
            let fitted = sample_curve(lo, hi, |d| linear.predict(d, cfg.distance_floor_m));
            scatter = scatter.line("Linear fit", GREEN, fitted);
        }
    }

    draw_scatter(area, &scatter)
}

/// Path loss against `log10(distance)`, with the path-loss line implied by the log model.
fn path_loss_scatter(observations: &[Observation], result: &AnalysisResult, cfg: &AnalysisConfig) -> Scatter {
    let points: Vec<(f64, f64)> = observations
        .iter()
        .filter_map(|o| {
            let d = o.record.distance.filter(|d| *d > 0.0)?;
            Some((log_distance(d, cfg.distance_floor_m), o.derived.path_loss?))
        })
        .collect();

    let mut scatter = Scatter::new("Path Loss vs log10(Distance)", Field::Distance, Field::PathLoss)
        .x_desc("log10(Distance)")
        .points(points);

    if let (Some(pl), Some((lo, hi))) = (
        result.signal_model.fitted().and_then(|m| m.path_loss),
        padded_range(scatter.points.iter().map(|p| p.0), 0.05),
    ) {
        // path_loss = P0 - rssi = -slope·x + (P0 - intercept)
        let log = pl.model;
        let line = sample_curve(lo, hi, |x| cfg.tx_power_dbm - (log.slope * x + log.intercept));
        scatter = scatter.line("Log-distance fit", RED, line);
    }
    scatter
}

fn draw_distance_histogram(area: &Panel, observations: &[Observation]) -> DrawResult {
    const TITLE: &str = "Distance Distribution";
    let distances: Vec<f64> = observations.iter().filter_map(|o| o.record.distance).collect();
    let Some(bins) = histogram(&distances, HISTOGRAM_BINS) else {
        return draw_unavailable(area, TITLE);
    };

    let x0 = bins.first().map_or(0.0, |b| b.0);
    let x1 = bins.last().map_or(1.0, |b| b.1);
    let max_count = bins.iter().map(|b| b.2).max().unwrap_or(0).max(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(TITLE, CAPTION_FONT)
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(x0..x1, 0.0..max_count * 1.1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(Field::Distance.display_name())
        .y_desc("Frequency")
        .draw()?;

    chart.draw_series(bins.iter().map(|&(lo, hi, count)| {
        Rectangle::new([(lo, 0.0), (hi, count as f64)], BLUE.mix(0.6).filled())
    }))?;

    for edge in DISTANCE_BAND_EDGES.iter().copied().filter(|e| *e > x0 && *e < x1) {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(edge, 0.0), (edge, max_count * 1.1)],
            RED.mix(0.6),
        )))?;
    }

    Ok(())
}

/// Boxplot of `field` for each non-empty distance band.
fn draw_band_boxplot(
    area: &Panel,
    observations: &[Observation],
    groups: &[DistanceGroup],
    field: Field,
    title: &str,
) -> DrawResult {
    let labels: Vec<String> = groups.iter().map(|g| g.band.label()).collect();
    let boxes: Vec<(i32, Quartiles)> = groups
        .iter()
        .enumerate()
        .filter_map(|(i, g)| {
            let values: Vec<f64> = g.observations(observations).filter_map(|o| o.value(field)).collect();
            // Quartiles::new panics on an empty slice.
            (!values.is_empty()).then(|| (i as i32, Quartiles::new(&values)))
        })
        .collect();

    let range = padded_range(
        boxes.iter().flat_map(|(_, q)| q.values().into_iter().map(f64::from)),
        0.1,
    );
    let (Some((y0, y1)), Some(last)) = (range, last_index(&labels)) else {
        return draw_unavailable(area, title);
    };
    let x_label = |v: &SegmentValue<i32>| segment_key(&labels, v, |k| k);

    let mut chart = ChartBuilder::on(area)
        .caption(title, CAPTION_FONT)
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d((0..last).into_segmented(), y0 as f32..y1 as f32)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Distance Group")
        .y_desc(field.display_name())
        .x_label_formatter(&x_label)
        .draw()?;

    chart.draw_series(boxes.iter().map(|(i, q)| {
        Boxplot::new_vertical(SegmentValue::CenterOf(*i), q)
            .width(30)
            .whisker_width(0.5)
            .style(BLUE)
    }))?;

    Ok(())
}

fn draw_exposure_rates(area: &Panel, result: &AnalysisResult) -> DrawResult {
    const TITLE: &str = "Exposure Rate by Distance Group";
    let labels: Vec<String> = result.groups.iter().map(|g| g.label.clone()).collect();
    let bars: Vec<(i32, f64, usize)> = result
        .groups
        .iter()
        .enumerate()
        .filter_map(|(i, g)| g.exposure_rate.map(|r| (i as i32, r, g.sample_count)))
        .collect();
    let Some(last) = last_index(&labels).filter(|_| !bars.is_empty()) else {
        return draw_unavailable(area, TITLE);
    };
    let x_label = |v: &SegmentValue<i32>| segment_key(&labels, v, |k| k);

    let top = bars.iter().map(|b| b.1).fold(0.0_f64, f64::max).max(1.0) * 1.2;

    let mut chart = ChartBuilder::on(area)
        .caption(TITLE, CAPTION_FONT)
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d((0..last).into_segmented(), 0.0..top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Distance Group")
        .y_desc("Exposure Rate (%)")
        .x_label_formatter(&x_label)
        .draw()?;

    chart.draw_series(bars.iter().map(|&(i, rate, _)| {
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (segment_end(i, last), rate)],
            RED.mix(0.7).filled(),
        );
        bar.set_margin(0, 0, 12, 12);
        bar
    }))?;

    chart.draw_series(bars.iter().map(|&(i, rate, n)| {
        Text::new(
            format!("{rate:.1}% (n={n})"),
            (SegmentValue::CenterOf(i), rate + top * 0.03),
            ("sans-serif", 13).into_font(),
        )
    }))?;

    Ok(())
}

/// Index of the last segment for one segment per label.
fn last_index<T>(labels: &[T]) -> Option<i32> {
    labels.len().checked_sub(1).and_then(|i| i32::try_from(i).ok())
}

fn draw_unavailable(area: &Panel, title: &str) -> DrawResult {
    debug!("figure panel '{title}' has no data");
    let (w, h) = area.dim_in_pixel();
    area.draw_text(
        &format!("{title}: N/A"),
        &("sans-serif", 18).into_font().color(&BLACK.mix(0.6)),
        (w as i32 / 6, h as i32 / 2),
    )?;
    Ok(())
}

/// `(x, y)` for every observation that has both fields.
fn pairs(observations: &[Observation], x: Field, y: Field) -> Vec<(f64, f64)> {
    observations
        .iter()
        .filter_map(|o| Some((o.value(x)?, o.value(y)?)))
        .collect()
}

fn sample_curve(lo: f64, hi: f64, f: impl Fn(f64) -> f64) -> Vec<(f64, f64)> {
    let n = CURVE_SAMPLES;
    (0..n)
        .map(|i| {
            let x = lo + (hi - lo) * i as f64 / (n - 1) as f64;
            (x, f(x))
        })
        .filter(|(_, y)| y.is_finite())
        .collect()
}

/// Equal-width bins `(lo, hi, count)` over the data range.
pub(crate) fn histogram(values: &[f64], bins: usize) -> Option<Vec<(f64, f64, usize)>> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return None;
    }
    let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, width) = if hi > lo {
        (lo, (hi - lo) / bins as f64)
    } else {
        (lo - 0.5, 1.0 / bins as f64)
    };

    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Some(
        counts
            .into_iter()
            .enumerate()
            .map(|(i, c)| (lo + i as f64 * width, lo + (i + 1) as f64 * width, c))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, partition};
    use crate::derive::derive_all;
    use crate::io::ingest::load_records_from_reader;

    #[test]
    fn histogram_counts_every_value() {
        let values = [0.0, 0.5, 1.0, 1.5, 2.0, 9.0, 10.0];
        let bins = histogram(&values, 5).unwrap();
        assert_eq!(bins.len(), 5);
        assert_eq!(bins.iter().map(|b| b.2).sum::<usize>(), values.len());
        assert_eq!(bins[0].0, 0.0);
        assert!((bins[4].1 - 10.0).abs() < 1e-12);
        // The maximum lands in the last bin.
        assert_eq!(bins[4].2, 2);
    }

    #[test]
    fn histogram_single_value_and_empty() {
        let bins = histogram(&[3.0, 3.0], 4).unwrap();
        assert_eq!(bins.iter().map(|b| b.2).sum::<usize>(), 2);
        assert!(histogram(&[], 4).is_none());
    }

    #[test]
    fn exposure_panel_skips_empty_bands() {
        let csv = "rssi,exposureStatus,distanceInMeter\n-45,NORMAL,0.5\n-55,EXPOSURE,1.5\n";
        let cfg = AnalysisConfig::default();
        let data = load_records_from_reader(csv.as_bytes(), "bands.csv").unwrap();
        let obs = derive_all(&data.records, &data.columns, &cfg);
        let groups = partition(&obs);
        let result = analyze(&data, &obs, &groups, &cfg);
        assert_eq!(result.groups[2].sample_count, 0);

        let mut svg = String::new();
        {
            let area = SVGBackend::with_string(&mut svg, (600, 400)).into_drawing_area();
            area.fill(&WHITE).unwrap();
            draw_exposure_rates(&area, &result).unwrap();
            area.present().unwrap();
        }
        assert!(svg.contains("0.0% (n=1)"));
        assert!(svg.contains("100.0% (n=1)"));
        assert!(svg.contains("0-1m") && svg.contains("5m+"));
        assert!(!svg.contains("(n=0)"));
    }

    #[test]
    fn renders_svg_with_sparse_data() {
        let csv = "timeStamp,rssi,uploadDuration,contactDuration,closeContactDuration,exposureStatus,distanceInMeter\n\
                   1700000000,-40,100,120,60,NORMAL,0.5\n\
                   1700000060,-55,120,60,30,EXPOSURE,1.5\n\
                   1700000120,-65,90,30,0,NORMAL,3.0\n\
                   1700000180,-75,80,10,0,NORMAL,6.0\n";
        let cfg = AnalysisConfig::default();
        let data = load_records_from_reader(csv.as_bytes(), "fig.csv").unwrap();
        let obs = derive_all(&data.records, &data.columns, &cfg);
        let groups = partition(&obs);
        let result = analyze(&data, &obs, &groups, &cfg);

        let dir = std::env::temp_dir().join(format!("proxi-figures-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(crate::plot::PLOTS_FILE_NAME);
        render_distance_plots(&path, &obs, &groups, &result).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("RSSI vs Distance"));
        assert!(svg.contains("Exposure Rate by Distance Group"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
