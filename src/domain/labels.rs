//! Descriptive labels derived from computed statistics.
//!
//! These are heuristics for the narrative sections of the report. They are
//! labels, not statistical claims.

use serde::{Deserialize, Serialize};

use crate::config::{
    ACCURACY_RMSE_EDGES, CORRELATION_MODERATE, CORRELATION_STRONG, DATA_QUALITY_EDGES, PLE_FREE_SPACE,
    PLE_INDOOR, PLE_LIGHT_OBSTRUCTION, PLE_OPEN_AREA, PREDICTABILITY_R2_EDGES, PROXIMITY_EDGES,
    SIGNAL_QUALITY_EDGES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
}

impl CorrelationStrength {
    pub fn of(r: f64) -> Self {
        let a = r.abs();
        if a > CORRELATION_STRONG {
            CorrelationStrength::Strong
        } else if a > CORRELATION_MODERATE {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CorrelationStrength::Strong => "Strong",
            CorrelationStrength::Moderate => "Moderate",
            CorrelationStrength::Weak => "Weak",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

impl CorrelationDirection {
    pub fn of(r: f64) -> Self {
        if r < 0.0 {
            CorrelationDirection::Negative
        } else {
            CorrelationDirection::Positive
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CorrelationDirection::Positive => "positive",
            CorrelationDirection::Negative => "negative",
        }
    }
}

/// Propagation environment implied by the path-loss exponent `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    BetterThanFreeSpace,
    FreeSpace,
    LightObstruction,
    IndoorModerate,
    HeavyObstruction,
}

impl Environment {
    pub fn of(path_loss_exponent: f64) -> Self {
        let n = path_loss_exponent;
        if n < PLE_FREE_SPACE {
            Environment::BetterThanFreeSpace
        } else if n < PLE_OPEN_AREA {
            Environment::FreeSpace
        } else if n < PLE_LIGHT_OBSTRUCTION {
            Environment::LightObstruction
        } else if n < PLE_INDOOR {
            Environment::IndoorModerate
        } else {
            Environment::HeavyObstruction
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Environment::BetterThanFreeSpace => "better than free space (possible waveguide effect)",
            Environment::FreeSpace => "free space or open area",
            Environment::LightObstruction => "light obstruction environment",
            Environment::IndoorModerate => "indoor or moderate obstruction",
            Environment::HeavyObstruction => "heavy obstruction or indoor with walls",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl SignalQuality {
    pub fn of(mean_rssi: f64) -> Self {
        let [excellent, good, fair] = SIGNAL_QUALITY_EDGES;
        if mean_rssi > excellent {
            SignalQuality::Excellent
        } else if mean_rssi > good {
            SignalQuality::Good
        } else if mean_rssi > fair {
            SignalQuality::Fair
        } else {
            SignalQuality::Poor
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SignalQuality::Excellent => "Excellent",
            SignalQuality::Good => "Good",
            SignalQuality::Fair => "Fair",
            SignalQuality::Poor => "Poor",
        }
    }
}

/// Agreement between observed RSSI and the theoretical model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelAccuracy {
    High,
    Moderate,
    Low,
}

impl ModelAccuracy {
    pub fn of(rmse: f64) -> Self {
        let [high, moderate] = ACCURACY_RMSE_EDGES;
        if rmse < high {
            ModelAccuracy::High
        } else if rmse < moderate {
            ModelAccuracy::Moderate
        } else {
            ModelAccuracy::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ModelAccuracy::High => "High",
            ModelAccuracy::Moderate => "Moderate",
            ModelAccuracy::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Predictability {
    High,
    Moderate,
    Low,
}

impl Predictability {
    pub fn of(log_r_squared: f64) -> Self {
        let [high, moderate] = PREDICTABILITY_R2_EDGES;
        if log_r_squared > high {
            Predictability::High
        } else if log_r_squared > moderate {
            Predictability::Moderate
        } else {
            Predictability::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Predictability::High => "Highly predictable",
            Predictability::Moderate => "Moderately predictable",
            Predictability::Low => "Low predictability",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProximityLevel {
    High,
    Moderate,
    Low,
}

impl ProximityLevel {
    pub fn of(mean_distance: f64) -> Self {
        let [high, moderate] = PROXIMITY_EDGES;
        if mean_distance <= high {
            ProximityLevel::High
        } else if mean_distance <= moderate {
            ProximityLevel::Moderate
        } else {
            ProximityLevel::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProximityLevel::High => "High proximity environment",
            ProximityLevel::Moderate => "Moderate proximity environment",
            ProximityLevel::Low => "Low proximity environment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityRating {
    High,
    Moderate,
    Low,
}

impl QualityRating {
    pub fn of(missing_percentage: f64) -> Self {
        let [high, moderate] = DATA_QUALITY_EDGES;
        if missing_percentage < high {
            QualityRating::High
        } else if missing_percentage < moderate {
            QualityRating::Moderate
        } else {
            QualityRating::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityRating::High => "High",
            QualityRating::Moderate => "Moderate",
            QualityRating::Low => "Low",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_strength_uses_absolute_value() {
        assert_eq!(CorrelationStrength::of(-0.85), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::of(0.71), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::of(0.7), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::of(-0.4), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::of(0.3), CorrelationStrength::Weak);
        assert_eq!(CorrelationDirection::of(-0.1), CorrelationDirection::Negative);
        assert_eq!(CorrelationDirection::of(0.0), CorrelationDirection::Positive);
    }

    #[test]
    fn environment_thresholds_are_lower_inclusive() {
        assert_eq!(Environment::of(1.6), Environment::BetterThanFreeSpace);
        assert_eq!(Environment::of(2.0), Environment::FreeSpace);
        assert_eq!(Environment::of(2.5), Environment::LightObstruction);
        assert_eq!(Environment::of(3.0), Environment::IndoorModerate);
        assert_eq!(Environment::of(3.99), Environment::IndoorModerate);
        assert_eq!(Environment::of(4.0), Environment::HeavyObstruction);
    }

    #[test]
    fn signal_quality_and_accuracy() {
        assert_eq!(SignalQuality::of(-45.0), SignalQuality::Excellent);
        assert_eq!(SignalQuality::of(-50.0), SignalQuality::Good);
        assert_eq!(SignalQuality::of(-65.0), SignalQuality::Fair);
        assert_eq!(SignalQuality::of(-70.0), SignalQuality::Poor);

        assert_eq!(ModelAccuracy::of(4.9), ModelAccuracy::High);
        assert_eq!(ModelAccuracy::of(5.0), ModelAccuracy::Moderate);
        assert_eq!(ModelAccuracy::of(12.0), ModelAccuracy::Low);
    }

    #[test]
    fn proximity_and_quality() {
        assert_eq!(ProximityLevel::of(2.0), ProximityLevel::High);
        assert_eq!(ProximityLevel::of(4.0), ProximityLevel::Moderate);
        assert_eq!(ProximityLevel::of(7.5), ProximityLevel::Low);

        assert_eq!(QualityRating::of(0.0), QualityRating::High);
        assert_eq!(QualityRating::of(2.0), QualityRating::Moderate);
        assert_eq!(QualityRating::of(5.0), QualityRating::Low);

        assert_eq!(Predictability::of(0.9), Predictability::High);
        assert_eq!(Predictability::of(0.6), Predictability::Moderate);
        assert_eq!(Predictability::of(0.5), Predictability::Low);
    }
}
