//! Analysis constants and run configuration.
//!
//! Every threshold used by the modeling code *and* by the renderers lives here,
//! so the numbers printed in the report and the curves drawn in the figures come
//! from the same place.

use serde::{Deserialize, Serialize};

/// Reference transmit power `P₀` (dBm) for the theoretical signal model.
pub const DEFAULT_TX_POWER_DBM: f64 = 0.0;

/// Free-space path loss at the 1 m reference distance for 2.4 GHz BLE (dB).
pub const DEFAULT_FSPL_CONSTANT_DB: f64 = 40.0;

/// Distances below this floor are clamped before taking `log10`.
pub const DEFAULT_DISTANCE_FLOOR_M: f64 = 0.1;

/// Status value that marks a tracing-relevant exposure.
pub const DEFAULT_EXPOSURE_LABEL: &str = "EXPOSURE";

/// Lower edges (meters) of the distance bands after the first one.
///
/// Bands are `[0, 1)`, `[1, 2)`, `[2, 5)`, `[5, ∞)`.
pub const DISTANCE_BAND_EDGES: [f64; 3] = [1.0, 2.0, 5.0];

/// Contacts at or below this distance (meters) count as close contacts.
pub const CLOSE_CONTACT_MAX_M: f64 = 2.0;

/// Upper edges (dBm, inclusive) of the Very Weak / Weak / Good signal categories.
pub const SIGNAL_CATEGORY_EDGES: [f64; 3] = [-80.0, -60.0, -40.0];

/// `|r|` above these values is "strong" / "moderate".
pub const CORRELATION_STRONG: f64 = 0.7;
pub const CORRELATION_MODERATE: f64 = 0.3;

/// Path-loss exponent edges between the environment labels.
pub const PLE_FREE_SPACE: f64 = 2.0;
pub const PLE_OPEN_AREA: f64 = 2.5;
pub const PLE_LIGHT_OBSTRUCTION: f64 = 3.0;
pub const PLE_INDOOR: f64 = 4.0;

/// Mean RSSI (dBm) above these values is Excellent / Good / Fair.
pub const SIGNAL_QUALITY_EDGES: [f64; 3] = [-50.0, -60.0, -70.0];

/// RMSE (dBm) below these values is High / Moderate accuracy.
pub const ACCURACY_RMSE_EDGES: [f64; 2] = [5.0, 10.0];

/// Log-model R² above these values is Highly / Moderately predictable.
pub const PREDICTABILITY_R2_EDGES: [f64; 2] = [0.7, 0.5];

/// Mean distance (meters) at or below these values is High / Moderate proximity.
pub const PROXIMITY_EDGES: [f64; 2] = [2.0, 5.0];

/// Missing-value percentage below these values is High / Moderate quality.
pub const DATA_QUALITY_EDGES: [f64; 2] = [1.0, 5.0];

/// Tunables of the theoretical propagation model.
///
/// The defaults describe an ESP32 advertising at 0 dBm on 2.4 GHz. Deployments
/// with other radios can override them from the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub tx_power_dbm: f64,
    pub fspl_constant_db: f64,
    pub distance_floor_m: f64,
    pub exposure_label: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tx_power_dbm: DEFAULT_TX_POWER_DBM,
            fspl_constant_db: DEFAULT_FSPL_CONSTANT_DB,
            distance_floor_m: DEFAULT_DISTANCE_FLOOR_M,
            exposure_label: DEFAULT_EXPOSURE_LABEL.to_string(),
        }
    }
}
