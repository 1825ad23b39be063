//! Entry validation for new samples.
//!
//! The aggregator accepts anything; this is where implausible readings
//! are rejected before they reach an experiment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Distance must be a positive number, got {0}")]
    NonPositiveDistance(f64),

    #[error("RSSI must be between {min} and {max} dBm (exclusive), got {value}")]
    RssiOutOfRange { value: i32, min: i32, max: i32 },

    #[error("Tx rate must be a non-negative number, got {0}")]
    InvalidTxRate(f64),
}

/// Plausible-range settings for manual and captured entries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Readings at or below this value are rejected.
    #[serde(default = "default_min_rssi")]
    pub min_rssi: i32,

    /// Readings at or above this value are rejected.
    #[serde(default = "default_max_rssi")]
    pub max_rssi: i32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_rssi: default_min_rssi(),
            max_rssi: default_max_rssi(),
        }
    }
}

fn default_min_rssi() -> i32 {
    -100
}

fn default_max_rssi() -> i32 {
    -10
}

impl ValidationConfig {
    /// Check that the bounds leave room for at least one reading.
    pub fn validate(&self) -> Result<(), String> {
        if i64::from(self.max_rssi) - i64::from(self.min_rssi) < 2 {
            return Err(format!(
                "min_rssi ({}) must be at least 2 dBm below max_rssi ({}); \
no reading would be accepted",
                self.min_rssi, self.max_rssi
            ));
        }
        Ok(())
    }

    /// Validate a distance already converted to meters.
    pub fn check_distance(&self, meters: f64) -> Result<(), ValidationError> {
        if !meters.is_finite() || meters <= 0.0 {
            return Err(ValidationError::NonPositiveDistance(meters));
        }
        Ok(())
    }

    pub fn check_rssi(&self, rssi: i32) -> Result<(), ValidationError> {
        if rssi <= self.min_rssi || rssi >= self.max_rssi {
            return Err(ValidationError::RssiOutOfRange {
                value: rssi,
                min: self.min_rssi,
                max: self.max_rssi,
            });
        }
        Ok(())
    }

    pub fn check_tx_rate(&self, tx_rate: Option<f64>) -> Result<(), ValidationError> {
        match tx_rate {
            Some(rate) if !rate.is_finite() || rate < 0.0 => {
                Err(ValidationError::InvalidTxRate(rate))
            }
            _ => Ok(()),
        }
    }

    /// Run every check for a new entry.
    pub fn check_entry(
        &self,
        meters: f64,
        rssi: i32,
        tx_rate: Option<f64>,
    ) -> Result<(), ValidationError> {
        self.check_distance(meters)?;
        self.check_rssi(rssi)?;
        self.check_tx_rate(tx_rate)
    }
}
