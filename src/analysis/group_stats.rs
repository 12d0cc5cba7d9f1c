//! Per-band descriptive statistics and exposure rates.

use serde::Serialize;

use crate::analysis::grouping::DistanceGroup;
use crate::derive::Observation;
use crate::domain::{ContactRecord, DistanceBand, Field};
use crate::math::stats;

/// Descriptive statistics for one field over a set of non-missing values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; 0 for a single value.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl FieldStats {
    /// `None` for an empty sample.
    pub fn from_values(values: &[f64]) -> Option<FieldStats> {
        Some(FieldStats {
            count: values.len(),
            mean: stats::mean(values)?,
            median: stats::median(values)?,
            std_dev: stats::sample_std(values)?,
            min: stats::min(values)?,
            max: stats::max(values)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    pub field: Field,
    pub stats: FieldStats,
}

/// Statistics for one distance band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub band: DistanceBand,
    pub label: String,
    /// Records in the band (0 for an empty band).
    pub sample_count: usize,
    /// One entry per field with at least one non-missing value, in `Field::GROUP_STATS` order.
    pub fields: Vec<FieldSummary>,
    /// Percentage of records whose status is the exposure value. `None` when the
    /// band is empty or the dataset has no exposure status column.
    pub exposure_rate: Option<f64>,
}

impl GroupSummary {
    pub fn field(&self, field: Field) -> Option<&FieldStats> {
        self.fields.iter().find(|f| f.field == field).map(|f| &f.stats)
    }
}

/// Summarize every group. Empty groups keep their slot with no statistics.
pub fn summarize_groups(
    groups: &[DistanceGroup],
    observations: &[Observation],
    has_exposure_status: bool,
    exposure_label: &str,
) -> Vec<GroupSummary> {
    groups
        .iter()
        .map(|g| summarize_group(g, observations, has_exposure_status, exposure_label))
        .collect()
}

fn summarize_group(
    group: &DistanceGroup,
    observations: &[Observation],
    has_exposure_status: bool,
    exposure_label: &str,
) -> GroupSummary {
    let members: Vec<&Observation> = group.observations(observations).collect();

    let fields = Field::GROUP_STATS
        .iter()
        .filter_map(|&field| {
            let values: Vec<f64> = members.iter().filter_map(|o| o.value(field)).collect();
            FieldStats::from_values(&values).map(|stats| FieldSummary { field, stats })
        })
        .collect();

    let exposure_rate = if has_exposure_status {
        exposure_rate(members.iter().map(|o| &o.record), exposure_label)
    } else {
        None
    };

    GroupSummary {
        band: group.band,
        label: group.band.label(),
        sample_count: members.len(),
        fields,
        exposure_rate,
    }
}

/// Percentage of records flagged as exposures; `None` for an empty set.
pub fn exposure_rate<'a>(
    records: impl IntoIterator<Item = &'a ContactRecord>,
    exposure_label: &str,
) -> Option<f64> {
    let mut total = 0usize;
    let mut exposed = 0usize;
    for r in records {
        total += 1;
        if r.is_exposure(exposure_label) {
            exposed += 1;
        }
    }
    (total > 0).then(|| exposed as f64 / total as f64 * 100.0)
}
