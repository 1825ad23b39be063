//! RSSI quality bands.

use crate::models::QualityLabel;
use serde::{Deserialize, Serialize};

/// Lower bounds (inclusive, dBm) of each quality band.
///
/// The defaults are product-chosen values, not derived from a propagation
/// model. They can be overridden in the `[quality]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    #[serde(default = "default_excellent")]
    pub excellent: f64,
    #[serde(default = "default_good")]
    pub good: f64,
    #[serde(default = "default_fair")]
    pub fair: f64,
    #[serde(default = "default_weak")]
    pub weak: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            excellent: default_excellent(),
            good: default_good(),
            fair: default_fair(),
            weak: default_weak(),
        }
    }
}

fn default_excellent() -> f64 {
    -50.0
}

fn default_good() -> f64 {
    -60.0
}

fn default_fair() -> f64 {
    -70.0
}

fn default_weak() -> f64 {
    -80.0
}

impl QualityThresholds {
    /// Map a mean RSSI to its band. The most favorable matching band wins.
    pub fn classify(&self, mean_dbm: f64) -> QualityLabel {
        if mean_dbm >= self.excellent {
            QualityLabel::Excellent
        } else if mean_dbm >= self.good {
            QualityLabel::Good
        } else if mean_dbm >= self.fair {
            QualityLabel::Fair
        } else if mean_dbm >= self.weak {
            QualityLabel::Weak
        } else {
            QualityLabel::Unusable
        }
    }

    /// Check that bounds are strictly descending.
    pub fn validate(&self) -> Result<(), String> {
        let bounds = [self.excellent, self.good, self.fair, self.weak];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err("Quality thresholds must be finite numbers".to_string());
        }
        if bounds.windows(2).any(|w| w[0] <= w[1]) {
            return Err(
                "Quality thresholds must be strictly descending: excellent > good > fair > weak"
                    .to_string(),
            );
        }
        Ok(())
    }
}

/// Classify with the default bands.
pub fn quality_label(mean_dbm: f64) -> QualityLabel {
    QualityThresholds::default().classify(mean_dbm)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The band edges below are product constants and may need revisiting
    // against measured propagation data.
    #[test]
    fn test_band_edges() {
        assert_eq!(quality_label(-50.0), QualityLabel::Excellent);
        assert_eq!(quality_label(-50.1), QualityLabel::Good);
        assert_eq!(quality_label(-60.0), QualityLabel::Good);
        assert_eq!(quality_label(-60.1), QualityLabel::Fair);
        assert_eq!(quality_label(-70.0), QualityLabel::Fair);
        assert_eq!(quality_label(-70.1), QualityLabel::Weak);
        assert_eq!(quality_label(-80.0), QualityLabel::Weak);
        assert_eq!(quality_label(-80.1), QualityLabel::Unusable);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(quality_label(-11.0), QualityLabel::Excellent);
        assert_eq!(quality_label(-99.0), QualityLabel::Unusable);
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = QualityThresholds {
            excellent: -40.0,
            good: -55.0,
            fair: -65.0,
            weak: -75.0,
        };
        assert_eq!(strict.classify(-45.0), QualityLabel::Good);
        assert_eq!(strict.classify(-76.0), QualityLabel::Unusable);
    }

    #[test]
    fn test_validate_rejects_unordered() {
        assert!(QualityThresholds::default().validate().is_ok());

        let broken = QualityThresholds {
            good: -45.0,
            ..QualityThresholds::default()
        };
        assert!(broken.validate().is_err());
    }
}
