//! Signal-vs-distance model fitting.
//!
//! Given every observation with both an RSSI and a positive distance, we:
//! - measure the Pearson correlation between RSSI and raw distance
//! - fit `rssi = a·d + b` (linear) on raw distance
//! - fit `rssi = a·log10(d) + b` (log-distance path loss) on floored distance
//! - derive the path-loss exponent `n = -a / 10` from the log model, matching
//!   `rssi = -10·n·log10(d) + C`
//! - compare observed RSSI with the theoretical free-space curve (RMSE / MAE)
//!
//! Fewer than two usable pairs is not an error: the outcome is `Unavailable`
//! and downstream consumers skip the corresponding sections.

use log::{info, warn};
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::derive::Observation;
use crate::domain::{CorrelationDirection, CorrelationStrength, Environment, ModelAccuracy, ModelKind, Predictability};
use crate::math::{LineFit, correlation_p_value, fit_line, pearson, rmse_mae};
use crate::models::{log_distance, predict};

/// Minimum number of `(distance, rssi)` pairs needed for any fit.
pub const MIN_MODEL_SAMPLES: usize = 2;

/// One fitted signal model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FittedModel {
    pub kind: ModelKind,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Only set for the logarithmic model.
    pub path_loss_exponent: Option<f64>,
}

impl FittedModel {
    fn from_line(kind: ModelKind, fit: LineFit) -> Self {
        let path_loss_exponent = match kind {
            ModelKind::Linear => None,
            ModelKind::Logarithmic => Some(-fit.slope / 10.0),
        };
        Self {
            kind,
            slope: fit.slope,
            intercept: fit.intercept,
            r_squared: fit.r_squared,
            path_loss_exponent,
        }
    }

    /// Predicted RSSI at `distance` (the log model clamps to `floor`).
    pub fn predict(&self, distance: f64, floor: f64) -> f64 {
        predict(self.kind, distance, self.slope, self.intercept, floor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correlation {
    pub r: f64,
    pub p_value: f64,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
}

/// Agreement of observed RSSI with the theoretical free-space curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TheoreticalError {
    pub rmse: f64,
    pub mae: f64,
    pub accuracy: ModelAccuracy,
}

/// The log-distance fit and the labels derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathLossFit {
    pub model: FittedModel,
    pub exponent: f64,
    pub environment: Environment,
    pub predictability: Predictability,
}

impl PathLossFit {
    fn from_line(fit: LineFit) -> Self {
        let model = FittedModel::from_line(ModelKind::Logarithmic, fit);
        let exponent = -model.slope / 10.0;
        Self {
            model,
            exponent,
            environment: Environment::of(exponent),
            predictability: Predictability::of(model.r_squared),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalDistanceModel {
    pub sample_size: usize,
    pub correlation: Correlation,
    pub linear: FittedModel,
    /// `None` when every distance clamps to the same floored value.
    pub path_loss: Option<PathLossFit>,
    pub theoretical_error: Option<TheoreticalError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The file lacks an RSSI or distance column.
    MissingColumns,
    /// Fewer than `MIN_MODEL_SAMPLES` usable pairs.
    InsufficientData,
    /// Every usable pair has the same distance, so no slope is defined.
    ConstantDistance,
}

impl UnavailableReason {
    pub fn describe(self) -> &'static str {
        match self {
            UnavailableReason::MissingColumns => "RSSI or distance data not available",
            UnavailableReason::InsufficientData => "insufficient valid data for RSSI-distance analysis",
            UnavailableReason::ConstantDistance => "all valid records share one distance; no slope can be fitted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignalModelOutcome {
    Fitted(SignalDistanceModel),
    Unavailable { sample_size: usize, reason: UnavailableReason },
}

impl SignalModelOutcome {
    pub fn fitted(&self) -> Option<&SignalDistanceModel> {
        match self {
            SignalModelOutcome::Fitted(m) => Some(m),
            SignalModelOutcome::Unavailable { .. } => None,
        }
    }
}

/// Fit the signal-distance models over all usable observations.
pub fn fit_signal_distance(
    observations: &[Observation],
    has_columns: bool,
    config: &AnalysisConfig,
) -> SignalModelOutcome {
    if !has_columns {
        warn!("RSSI-distance analysis skipped: RSSI or distance column missing");
        return SignalModelOutcome::Unavailable {
            sample_size: 0,
            reason: UnavailableReason::MissingColumns,
        };
    }

    let valid: Vec<&Observation> = observations
        .iter()
        .filter(|o| o.record.rssi.is_some() && o.record.distance.is_some_and(|d| d > 0.0))
        .collect();

    let distance: Vec<f64> = valid.iter().filter_map(|o| o.record.distance).collect();
    let rssi: Vec<f64> = valid.iter().filter_map(|o| o.record.rssi).collect();
    let n = distance.len();

    if n < MIN_MODEL_SAMPLES {
        warn!("RSSI-distance analysis skipped: {n} valid pair(s), need {MIN_MODEL_SAMPLES}");
        return SignalModelOutcome::Unavailable {
            sample_size: n,
            reason: UnavailableReason::InsufficientData,
        };
    }

    let Some(linear) = fit_line(&distance, &rssi) else {
        warn!("RSSI-distance analysis skipped: all {n} valid pairs share one distance");
        return SignalModelOutcome::Unavailable {
            sample_size: n,
            reason: UnavailableReason::ConstantDistance,
        };
    };

    // Constant RSSI has no defined correlation; report it as uncorrelated.
    let r = pearson(&rssi, &distance).unwrap_or(0.0);
    let correlation = Correlation {
        r,
        p_value: correlation_p_value(r, n),
        strength: CorrelationStrength::of(r),
        direction: CorrelationDirection::of(r),
    };

    let linear = FittedModel::from_line(ModelKind::Linear, linear);

    let floor = config.distance_floor_m;
    let log_d: Vec<f64> = distance.iter().map(|&d| log_distance(d, floor)).collect();
    let path_loss = fit_line(&log_d, &rssi).map(PathLossFit::from_line);
    if path_loss.is_none() {
        warn!("Log-distance model skipped: every valid distance is at or below the {floor} m floor");
    }

    let theoretical: Vec<f64> = valid.iter().filter_map(|o| o.derived.theoretical_rssi).collect();
    let theoretical_error = if theoretical.len() == n {
        rmse_mae(&rssi, &theoretical).map(|(rmse, mae)| TheoreticalError {
            rmse,
            mae,
            accuracy: ModelAccuracy::of(rmse),
        })
    } else {
        None
    };

    match &path_loss {
        Some(pl) => info!(
            "Fitted RSSI-distance models on {n} pairs: r={r:.3}, log slope={:.2}, n={:.2}",
            pl.model.slope, pl.exponent
        ),
        None => info!("Fitted linear RSSI-distance model on {n} pairs: r={r:.3}"),
    }

    SignalModelOutcome::Fitted(SignalDistanceModel {
        sample_size: n,
        correlation,
        linear,
        path_loss,
        theoretical_error,
    })
}
