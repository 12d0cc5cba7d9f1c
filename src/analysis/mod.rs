//! Statistical analysis of a loaded contact log.
//!
//! `analyze` is the single entry point: it takes the ingested data, the derived
//! observations and the distance partition and produces an `AnalysisResult`,
//! which every renderer (report, figures, terminal summary, JSON export) reads.

pub mod correlation;
pub mod group_stats;
pub mod grouping;
pub mod summary;

pub use correlation::*;
pub use group_stats::*;
pub use grouping::*;
pub use summary::*;

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::derive::{Observation, available_fields};
use crate::domain::Field;
use crate::fit::{SignalModelOutcome, fit_signal_distance};
use crate::io::ingest::IngestedData;

/// Header facts about the input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetInfo {
    pub source_name: String,
    pub total_records: usize,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub row_warnings: usize,
    /// Numeric fields analyzed, raw and derived.
    pub fields: Vec<Field>,
    /// `(min, max)` over non-missing distances.
    pub distance_range: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub dataset: DatasetInfo,
    pub config: AnalysisConfig,
    pub groups: Vec<GroupSummary>,
    pub overall_exposure_rate: Option<f64>,
    pub signal_model: SignalModelOutcome,
    pub summary: DatasetSummary,
    pub correlation: CorrelationMatrix,
}

pub fn analyze(
    ingest: &IngestedData,
    observations: &[Observation],
    groups: &[DistanceGroup],
    config: &AnalysisConfig,
) -> AnalysisResult {
    let columns = &ingest.columns;
    let fields = available_fields(columns);

    let summary = summarize_dataset(ingest, observations);
    let distance_range = summary.distance.map(|d| (d.min, d.max));

    let overall_exposure_rate = if columns.exposure_status {
        exposure_rate(observations.iter().map(|o| &o.record), &config.exposure_label)
    } else {
        None
    };

    let has_model_columns = columns.has(Field::Rssi) && columns.has(Field::Distance);

    AnalysisResult {
        dataset: DatasetInfo {
            source_name: ingest.source_name.clone(),
            total_records: observations.len(),
            rows_read: ingest.rows_read,
            rows_dropped: ingest.rows_dropped,
            row_warnings: ingest.row_errors.len().saturating_sub(ingest.rows_dropped),
            fields: fields.clone(),
            distance_range,
        },
        config: config.clone(),
        groups: summarize_groups(groups, observations, columns.exposure_status, &config.exposure_label),
        overall_exposure_rate,
        signal_model: fit_signal_distance(observations, has_model_columns, config),
        summary,
        correlation: correlation_matrix(observations, &fields),
    }
}
