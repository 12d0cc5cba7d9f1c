//! Whole-dataset summaries for the report's descriptive and quality sections.

use serde::Serialize;

use crate::config::CLOSE_CONTACT_MAX_M;
use crate::derive::Observation;
use crate::domain::{Field, ProximityLevel, QualityRating, SignalQuality};
use crate::io::ingest::IngestedData;
use crate::math::stats;

/// Location and spread of one numeric field, quartiles included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
}

impl Distribution {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        Some(Self {
            count: values.len(),
            mean: stats::mean(values)?,
            std_dev: stats::sample_std(values)?,
            median: stats::median(values)?,
            min: stats::min(values)?,
            max: stats::max(values)?,
            q1: stats::quantile(values, 0.25)?,
            q3: stats::quantile(values, 0.75)?,
        })
    }

    pub fn of_field(observations: &[Observation], field: Field) -> Option<Self> {
        let values: Vec<f64> = observations.iter().filter_map(|o| o.value(field)).collect();
        Self::from_values(&values)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RssiSummary {
    pub distribution: Distribution,
    pub quality: SignalQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProximitySummary {
    /// Records at or below `CLOSE_CONTACT_MAX_M`.
    pub close_contacts: usize,
    /// `close_contacts` as a percentage of all kept records.
    pub close_contact_percentage: f64,
    pub mean_distance: f64,
    pub level: ProximityLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataQuality {
    pub total_cells: usize,
    pub missing_cells: usize,
    pub missing_percentage: f64,
    /// Share of kept records with a usable distance.
    pub distance_completeness: Option<f64>,
    pub zero_distance_count: Option<usize>,
    pub zero_distance_percentage: Option<f64>,
    pub rating: QualityRating,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub distance: Option<Distribution>,
    pub rssi: Option<RssiSummary>,
    pub proximity: Option<ProximitySummary>,
    pub data_quality: DataQuality,
}

pub fn summarize_dataset(ingest: &IngestedData, observations: &[Observation]) -> DatasetSummary {
    let has_distance = ingest.columns.has(Field::Distance);

    let distance = Distribution::of_field(observations, Field::Distance);
    let rssi = Distribution::of_field(observations, Field::Rssi).map(|distribution| RssiSummary {
        distribution,
        quality: SignalQuality::of(distribution.mean),
    });
    let proximity = distance.map(|d| proximity(observations, d.mean));

    DatasetSummary {
        distance,
        rssi,
        proximity,
        data_quality: data_quality(ingest, observations, has_distance),
    }
}

fn proximity(observations: &[Observation], mean_distance: f64) -> ProximitySummary {
    let close_contacts = observations
        .iter()
        .filter(|o| o.record.distance.is_some_and(|d| d <= CLOSE_CONTACT_MAX_M))
        .count();
    ProximitySummary {
        close_contacts,
        close_contact_percentage: percentage(close_contacts, observations.len()),
        mean_distance,
        level: ProximityLevel::of(mean_distance),
    }
}

fn data_quality(ingest: &IngestedData, observations: &[Observation], has_distance: bool) -> DataQuality {
    let missing_percentage = percentage(ingest.missing_cells, ingest.total_cells);
    let total = observations.len();

    let (distance_completeness, zero_distance_count, zero_distance_percentage) = if has_distance {
        let with_distance = observations.iter().filter(|o| o.record.distance.is_some()).count();
        let zero = observations
            .iter()
            .filter(|o| o.record.distance == Some(0.0))
            .count();
        (
            Some(percentage(with_distance, total)),
            Some(zero),
            Some(percentage(zero, total)),
        )
    } else {
        (None, None, None)
    };

    DataQuality {
        total_cells: ingest.total_cells,
        missing_cells: ingest.missing_cells,
        missing_percentage,
        distance_completeness,
        zero_distance_count,
        zero_distance_percentage,
        rating: QualityRating::of(missing_percentage),
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
