//! Plot rendering.
//!
//! - multi-panel SVG figure (`figures`)
//! - correlation heatmap SVG (`heatmap`)
//! - terminal scatter (`ascii`)
//!
//! Figure failures are never fatal: callers turn them into a `RenderWarning`
//! and carry on with the remaining outputs.

pub mod ascii;
pub mod figures;
pub mod heatmap;

pub use ascii::*;
pub use figures::*;
pub use heatmap::*;

use std::fmt;

use plotters::prelude::SegmentValue;

pub const PLOTS_FILE_NAME: &str = "distance_analysis_plots.svg";
pub const HEATMAP_FILE_NAME: &str = "enhanced_correlation_heatmap.svg";

/// Error type for the plotters-based renderers.
pub type DrawResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// An output that could not be produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderWarning {
    pub output: String,
    pub message: String,
}

impl RenderWarning {
    pub fn new(output: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Warning: could not write {}: {}", self.output, self.message)
    }
}

/// Label of the segment centred on `v`, looked up in `keys` after `index` maps
/// the axis position to a key index. Segment edges get no label.
pub(crate) fn segment_key<K: AsRef<str>>(keys: &[K], v: &SegmentValue<i32>, index: impl Fn(i32) -> i32) -> String {
    match v {
        SegmentValue::CenterOf(k) => usize::try_from(index(*k))
            .ok()
            .and_then(|i| keys.get(i))
            .map_or_else(String::new, |key| key.as_ref().to_string()),
        SegmentValue::Exact(_) | SegmentValue::Last => String::new(),
    }
}

/// Right edge of segment `i` on an axis whose last segment is `last`.
pub(crate) fn segment_end(i: i32, last: i32) -> SegmentValue<i32> {
    if i >= last { SegmentValue::Last } else { SegmentValue::Exact(i + 1) }
}

/// Expand `(min, max)` of `values` by `frac` of the span on each side.
///
/// A degenerate span is widened to `±1` so charts always get a valid range.
pub(crate) fn padded_range(values: impl IntoIterator<Item = f64>, frac: f64) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    let span = hi - lo;
    if span <= f64::EPSILON * lo.abs().max(1.0) {
        return Some((lo - 1.0, hi + 1.0));
    }
    let pad = span * frac;
    Some((lo - pad, hi + pad))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_range_handles_degenerate_and_empty() {
        assert_eq!(padded_range([], 0.05), None);
        assert_eq!(padded_range([f64::NAN], 0.05), None);
        assert_eq!(padded_range([3.0, 3.0], 0.05), Some((2.0, 4.0)));
        let (lo, hi) = padded_range([0.0, 10.0], 0.1).unwrap();
        assert!((lo + 1.0).abs() < 1e-12 && (hi - 11.0).abs() < 1e-12);
    }

    #[test]
    fn segment_keys_label_centres_only() {
        let keys = ["rssi", "distanceInMeter", "pathLoss"];
        assert_eq!(segment_key(&keys, &SegmentValue::CenterOf(1), |k| k), "distanceInMeter");
        assert_eq!(segment_key(&keys, &SegmentValue::CenterOf(0), |k| 2 - k), "pathLoss");
        assert_eq!(segment_key(&keys, &SegmentValue::CenterOf(3), |k| k), "");
        assert_eq!(segment_key(&keys, &SegmentValue::CenterOf(-1), |k| k), "");
        assert_eq!(segment_key(&keys, &SegmentValue::Exact(1), |k| k), "");
        assert!(matches!(segment_end(1, 3), SegmentValue::Exact(2)));
        assert!(matches!(segment_end(3, 3), SegmentValue::Last));
    }

    #[test]
    fn warning_display() {
        let w = RenderWarning::new(PLOTS_FILE_NAME, "disk full");
        assert_eq!(w.to_string(), "Warning: could not write distance_analysis_plots.svg: disk full");
    }
}
