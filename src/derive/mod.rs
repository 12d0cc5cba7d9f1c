//! Per-record derived metrics.
//!
//! Everything here is a pure function of one record, the dataset's column set
//! and the `AnalysisConfig`. A derived value is `None` when the inputs it needs
//! are absent from the file; per-record gaps are handled field by field.

use chrono::{DateTime, Datelike, Timelike};
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::domain::{ContactRecord, DistanceCategory, Field, SignalCategory};
use crate::io::ingest::Columns;
use crate::models::theoretical_rssi;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub signal_category: Option<SignalCategory>,
    pub distance_category: Option<DistanceCategory>,
    /// `close / (contact + 1)`, clamped to `[0, 1]`.
    pub contact_efficiency: Option<f64>,
    pub theoretical_rssi: Option<f64>,
    /// Observed minus theoretical RSSI.
    pub rssi_error: Option<f64>,
    /// Reference transmit power minus observed RSSI.
    pub path_loss: Option<f64>,
    /// Hour of day (UTC).
    pub hour: Option<u32>,
    /// Day of week, Monday = 0 (UTC).
    pub day_of_week: Option<u32>,
    pub exposure_risk: Option<u8>,
}

/// A record together with its derived metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub record: ContactRecord,
    pub derived: DerivedMetrics,
}

impl Observation {
    /// Value of a numeric field, raw or derived.
    pub fn value(&self, field: Field) -> Option<f64> {
        let r = &self.record;
        let d = &self.derived;
        match field {
            Field::Timestamp => r.timestamp,
            Field::Rssi => r.rssi,
            Field::UploadDuration => r.upload_duration,
            Field::ContactDuration => r.contact_duration,
            Field::CloseContactDuration => r.close_contact_duration,
            Field::Distance => r.distance,
            Field::ContactEfficiency => d.contact_efficiency,
            Field::TheoreticalRssi => d.theoretical_rssi,
            Field::RssiError => d.rssi_error,
            Field::PathLoss => d.path_loss,
            Field::ExposureRisk => d.exposure_risk.map(f64::from),
        }
    }
}

/// Fields available for this dataset: raw columns present plus the derived
/// fields that can be computed from them.
pub fn available_fields(columns: &Columns) -> Vec<Field> {
    Field::ALL
        .iter()
        .copied()
        .filter(|&f| match f {
            Field::ContactEfficiency => {
                columns.has(Field::ContactDuration) && columns.has(Field::CloseContactDuration)
            }
            Field::TheoreticalRssi => columns.has(Field::Distance),
            Field::RssiError | Field::PathLoss => columns.has(Field::Rssi) && columns.has(Field::Distance),
            Field::ExposureRisk => columns.exposure_status,
            raw => columns.has(raw),
        })
        .collect()
}

/// Compute derived metrics for every record.
pub fn derive_all(records: &[ContactRecord], columns: &Columns, config: &AnalysisConfig) -> Vec<Observation> {
    records
        .iter()
        .map(|r| Observation {
            record: r.clone(),
            derived: derive_metrics(r, columns, config),
        })
        .collect()
}

pub fn derive_metrics(record: &ContactRecord, columns: &Columns, config: &AnalysisConfig) -> DerivedMetrics {
    let has_efficiency = columns.has(Field::ContactDuration) && columns.has(Field::CloseContactDuration);
    let has_path_loss = columns.has(Field::Rssi) && columns.has(Field::Distance);

    let theoretical = record.distance.map(|d| theoretical_rssi(d, config));
    let rssi_error = match (record.rssi, theoretical) {
        (Some(obs), Some(th)) => Some(obs - th),
        _ => None,
    };

    let (hour, day_of_week) = record
        .timestamp
        .and_then(time_of_day)
        .map_or((None, None), |(h, d)| (Some(h), Some(d)));

    DerivedMetrics {
        signal_category: record.rssi.and_then(SignalCategory::of),
        distance_category: record.distance.and_then(DistanceCategory::of),
        contact_efficiency: has_efficiency
            .then(|| contact_efficiency(record.close_contact_duration, record.contact_duration)),
        theoretical_rssi: theoretical,
        rssi_error,
        path_loss: if has_path_loss {
            record.rssi.map(|rssi| config.tx_power_dbm - rssi)
        } else {
            None
        },
        hour,
        day_of_week,
        exposure_risk: columns
            .exposure_status
            .then(|| u8::from(record.is_exposure(&config.exposure_label))),
    }
}

/// Share of contact time spent in close contact.
///
/// The denominator is `contact + 1` so a zero-length contact never divides by
/// zero. Missing operands yield 0; the result is clamped to `[0, 1]`.
pub fn contact_efficiency(close: Option<f64>, contact: Option<f64>) -> f64 {
    let (Some(close), Some(contact)) = (close, contact) else {
        return 0.0;
    };
    let denom = contact + 1.0;
    if denom <= 0.0 {
        return 0.0;
    }
    let ratio = close / denom;
    if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 }
}

/// `(hour, day_of_week)` in UTC for a Unix timestamp in seconds.
fn time_of_day(timestamp: f64) -> Option<(u32, u32)> {
    if !timestamp.is_finite() {
        return None;
    }
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9) as u32;
    let dt = DateTime::from_timestamp(secs as i64, nanos)?;
    Some((dt.hour(), dt.weekday().num_days_from_monday()))
}
