//! Shared domain types.
//!
//! These types are kept small and serializable so they can be used in-memory
//! during analysis and exported alongside the report.

use serde::{Deserialize, Serialize};

use crate::config::{DISTANCE_BAND_EDGES, SIGNAL_CATEGORY_EDGES};

/// One proximity observation as logged by a device.
///
/// Numeric fields are `None` when the cell was empty or failed to parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactRecord {
    /// 1-based line number in the source file (header is line 1).
    pub line: usize,
    /// Seconds since the Unix epoch.
    pub timestamp: Option<f64>,
    pub peer_id: Option<String>,
    pub device_id: Option<String>,
    /// Received signal strength (dBm).
    pub rssi: Option<f64>,
    pub upload_duration: Option<f64>,
    pub contact_duration: Option<f64>,
    pub close_contact_duration: Option<f64>,
    /// Estimated distance in meters (never negative).
    pub distance: Option<f64>,
    pub exposure_status: Option<String>,
}

impl ContactRecord {
    /// Whether the record's status equals the distinguished exposure value.
    pub fn is_exposure(&self, exposure_label: &str) -> bool {
        self.exposure_status
            .as_deref()
            .is_some_and(|s| s == exposure_label)
    }
}

/// Numeric fields known to the analysis (raw and derived).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Timestamp,
    Rssi,
    UploadDuration,
    ContactDuration,
    CloseContactDuration,
    Distance,
    ContactEfficiency,
    TheoreticalRssi,
    RssiError,
    PathLoss,
    ExposureRisk,
}

impl Field {
    /// Raw columns read from the input file, in the order they are reported.
    pub const RAW: [Field; 6] = [
        Field::Timestamp,
        Field::Rssi,
        Field::UploadDuration,
        Field::ContactDuration,
        Field::CloseContactDuration,
        Field::Distance,
    ];

    /// Every numeric field, in correlation-matrix order.
    pub const ALL: [Field; 11] = [
        Field::Timestamp,
        Field::Rssi,
        Field::UploadDuration,
        Field::ContactDuration,
        Field::CloseContactDuration,
        Field::Distance,
        Field::ContactEfficiency,
        Field::TheoreticalRssi,
        Field::RssiError,
        Field::PathLoss,
        Field::ExposureRisk,
    ];

    /// Observation fields summarized per distance group.
    pub const GROUP_STATS: [Field; 4] = [
        Field::Rssi,
        Field::ContactDuration,
        Field::CloseContactDuration,
        Field::UploadDuration,
    ];

    /// Column name as written by the device firmware.
    pub fn column_name(self) -> &'static str {
        match self {
            Field::Timestamp => "timeStamp",
            Field::Rssi => "rssi",
            Field::UploadDuration => "uploadDuration",
            Field::ContactDuration => "contactDuration",
            Field::CloseContactDuration => "closeContactDuration",
            Field::Distance => "distanceInMeter",
            Field::ContactEfficiency => "contact_efficiency",
            Field::TheoreticalRssi => "theoretical_rssi",
            Field::RssiError => "rssi_error",
            Field::PathLoss => "path_loss",
            Field::ExposureRisk => "exposure_risk",
        }
    }

    /// Short label for figure axes and tables.
    pub fn display_name(self) -> &'static str {
        match self {
            Field::Timestamp => "Timestamp",
            Field::Rssi => "RSSI (dBm)",
            Field::UploadDuration => "Upload Duration (ms)",
            Field::ContactDuration => "Contact Duration (s)",
            Field::CloseContactDuration => "Close Contact Duration (s)",
            Field::Distance => "Distance (m)",
            Field::ContactEfficiency => "Contact Efficiency",
            Field::TheoreticalRssi => "Theoretical RSSI (dBm)",
            Field::RssiError => "RSSI Error (dBm)",
            Field::PathLoss => "Path Loss (dB)",
            Field::ExposureRisk => "Exposure Risk",
        }
    }
}

/// Fixed, non-overlapping distance partition.
///
/// All bands are half-open `[lo, hi)` except the last, which is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceBand {
    UnderOne,
    OneToTwo,
    TwoToFive,
    FivePlus,
}

impl DistanceBand {
    pub const ALL: [DistanceBand; 4] = [
        DistanceBand::UnderOne,
        DistanceBand::OneToTwo,
        DistanceBand::TwoToFive,
        DistanceBand::FivePlus,
    ];

    /// Map a distance to its band.
    ///
    /// Returns `None` for negative or non-finite distances. A distance exactly
    /// on an edge belongs to the band whose lower bound it is.
    pub fn of(distance: f64) -> Option<DistanceBand> {
        if !distance.is_finite() || distance < 0.0 {
            return None;
        }
        let [one, two, five] = DISTANCE_BAND_EDGES;
        let band = if distance < one {
            DistanceBand::UnderOne
        } else if distance < two {
            DistanceBand::OneToTwo
        } else if distance < five {
            DistanceBand::TwoToFive
        } else {
            DistanceBand::FivePlus
        };
        Some(band)
    }

    /// `[lower, upper)` in meters; the last band's upper bound is infinite.
    pub fn bounds(self) -> (f64, f64) {
        let [one, two, five] = DISTANCE_BAND_EDGES;
        match self {
            DistanceBand::UnderOne => (0.0, one),
            DistanceBand::OneToTwo => (one, two),
            DistanceBand::TwoToFive => (two, five),
            DistanceBand::FivePlus => (five, f64::INFINITY),
        }
    }

    pub fn label(self) -> String {
        match self.bounds() {
            (lo, hi) if hi.is_infinite() => format!("{lo}m+"),
            (lo, hi) => format!("{lo}-{hi}m"),
        }
    }
}

/// Ordinal bucket over RSSI (right-closed bins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    VeryWeak,
    Weak,
    Good,
    Strong,
}

impl SignalCategory {
    pub fn of(rssi: f64) -> Option<SignalCategory> {
        if !rssi.is_finite() {
            return None;
        }
        let [very_weak, weak, good] = SIGNAL_CATEGORY_EDGES;
        let cat = if rssi <= very_weak {
            SignalCategory::VeryWeak
        } else if rssi <= weak {
            SignalCategory::Weak
        } else if rssi <= good {
            SignalCategory::Good
        } else {
            SignalCategory::Strong
        };
        Some(cat)
    }

    pub fn label(self) -> &'static str {
        match self {
            SignalCategory::VeryWeak => "Very Weak",
            SignalCategory::Weak => "Weak",
            SignalCategory::Good => "Good",
            SignalCategory::Strong => "Strong",
        }
    }
}

/// Ordinal display bucket over distance (right-closed, lowest edge included).
///
/// Unlike [`DistanceBand`], a distance of exactly 1.0 m is "Very Close".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceCategory {
    VeryClose,
    Close,
    Moderate,
    Far,
}

impl DistanceCategory {
    pub fn of(distance: f64) -> Option<DistanceCategory> {
        if !distance.is_finite() || distance < 0.0 {
            return None;
        }
        let [one, two, five] = DISTANCE_BAND_EDGES;
        let cat = if distance <= one {
            DistanceCategory::VeryClose
        } else if distance <= two {
            DistanceCategory::Close
        } else if distance <= five {
            DistanceCategory::Moderate
        } else {
            DistanceCategory::Far
        };
        Some(cat)
    }

    pub fn label(self) -> &'static str {
        match self {
            DistanceCategory::VeryClose => "Very Close (<1m)",
            DistanceCategory::Close => "Close (1-2m)",
            DistanceCategory::Moderate => "Moderate (2-5m)",
            DistanceCategory::Far => "Far (>5m)",
        }
    }
}

/// Shape of a fitted signal-vs-distance model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// `rssi = slope · d + intercept`
    Linear,
    /// `rssi = slope · log10(d) + intercept`
    Logarithmic,
}

impl ModelKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Linear => "Linear",
            ModelKind::Logarithmic => "Path Loss (log10)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges_belong_to_upper_band() {
        assert_eq!(DistanceBand::of(0.0), Some(DistanceBand::UnderOne));
        assert_eq!(DistanceBand::of(0.999), Some(DistanceBand::UnderOne));
        assert_eq!(DistanceBand::of(1.0), Some(DistanceBand::OneToTwo));
        assert_eq!(DistanceBand::of(2.0), Some(DistanceBand::TwoToFive));
        assert_eq!(DistanceBand::of(5.0), Some(DistanceBand::FivePlus));
        assert_eq!(DistanceBand::of(250.0), Some(DistanceBand::FivePlus));
    }

    #[test]
    fn band_rejects_invalid_distances() {
        assert_eq!(DistanceBand::of(-0.5), None);
        assert_eq!(DistanceBand::of(f64::NAN), None);
    }

    #[test]
    fn band_labels() {
        let labels: Vec<String> = DistanceBand::ALL.iter().map(|b| b.label()).collect();
        assert_eq!(labels, vec!["0-1m", "1-2m", "2-5m", "5m+"]);
    }

    #[test]
    fn distance_category_is_right_closed() {
        assert_eq!(DistanceCategory::of(0.0), Some(DistanceCategory::VeryClose));
        assert_eq!(DistanceCategory::of(1.0), Some(DistanceCategory::VeryClose));
        assert_eq!(DistanceCategory::of(1.5), Some(DistanceCategory::Close));
        assert_eq!(DistanceCategory::of(5.0), Some(DistanceCategory::Moderate));
        assert_eq!(DistanceCategory::of(5.1), Some(DistanceCategory::Far));
    }

    #[test]
    fn signal_category_bins() {
        assert_eq!(SignalCategory::of(-95.0), Some(SignalCategory::VeryWeak));
        assert_eq!(SignalCategory::of(-80.0), Some(SignalCategory::VeryWeak));
        assert_eq!(SignalCategory::of(-70.0), Some(SignalCategory::Weak));
        assert_eq!(SignalCategory::of(-45.0), Some(SignalCategory::Good));
        assert_eq!(SignalCategory::of(-30.0), Some(SignalCategory::Strong));
    }

    #[test]
    fn exposure_match_is_exact() {
        let mut r = ContactRecord::default();
        assert!(!r.is_exposure("EXPOSURE"));
        r.exposure_status = Some("NORMAL".to_string());
        assert!(!r.is_exposure("EXPOSURE"));
        r.exposure_status = Some("EXPOSURE".to_string());
        assert!(r.is_exposure("EXPOSURE"));
    }
}
