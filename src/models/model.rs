//! Signal propagation model evaluation.
//!
//! The fitter, the derived-metric pass and every figure overlay evaluate the
//! propagation curves through these functions, so reported numbers and drawn
//! curves cannot drift apart.

use crate::config::AnalysisConfig;
use crate::domain::ModelKind;

/// `log10(max(d, floor))`.
pub fn log_distance(distance: f64, floor: f64) -> f64 {
    distance.max(floor).log10()
}

/// Free-space path loss (dB) at `distance` meters.
///
/// `FSPL = K + 20·log10(d)`, with `d` clamped to the configured floor.
pub fn free_space_path_loss(distance: f64, config: &AnalysisConfig) -> f64 {
    config.fspl_constant_db + 20.0 * log_distance(distance, config.distance_floor_m)
}

/// Theoretical RSSI (dBm): `P₀ − FSPL(d)`.
pub fn theoretical_rssi(distance: f64, config: &AnalysisConfig) -> f64 {
    config.tx_power_dbm - free_space_path_loss(distance, config)
}

/// Evaluate a fitted signal model at `distance`.
///
/// The logarithmic model clamps `distance` to `floor`; the linear one uses it raw.
pub fn predict(kind: ModelKind, distance: f64, slope: f64, intercept: f64, floor: f64) -> f64 {
    match kind {
        ModelKind::Linear => slope * distance + intercept,
        ModelKind::Logarithmic => slope * log_distance(distance, floor) + intercept,
    }
}
