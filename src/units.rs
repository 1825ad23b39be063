//! Distance unit conversion.
//!
//! Distances are always stored in meters. Feet only exist at the edges:
//! user entry and display.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of feet in one meter.
pub const M_TO_FT: f64 = 3.28084;

/// Unit used when entering and displaying distances.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum DistanceUnit {
    /// Meters (canonical)
    #[default]
    #[serde(rename = "m")]
    #[value(name = "m")]
    Meters,
    /// Feet
    #[serde(rename = "ft")]
    #[value(name = "ft")]
    Feet,
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceUnit::Meters => write!(f, "m"),
            DistanceUnit::Feet => write!(f, "ft"),
        }
    }
}

impl DistanceUnit {
    /// Convert a value entered in this unit to meters.
    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            DistanceUnit::Meters => value,
            DistanceUnit::Feet => feet_to_meters(value),
        }
    }

    /// Convert a canonical meter value to this unit.
    pub fn from_meters(self, meters: f64) -> f64 {
        match self {
            DistanceUnit::Meters => meters,
            DistanceUnit::Feet => meters_to_feet(meters),
        }
    }
}

pub fn meters_to_feet(m: f64) -> f64 {
    m * M_TO_FT
}

pub fn feet_to_meters(ft: f64) -> f64 {
    ft / M_TO_FT
}

/// Render a meter distance in the given unit with two decimals, e.g. `"3.28 ft"`.
pub fn format_distance(meters: f64, unit: DistanceUnit) -> String {
    format!("{:.2} {}", unit.from_meters(meters), unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meters_to_feet() {
        assert!((meters_to_feet(1.0) - 3.28084).abs() < 1e-12);
        assert!((feet_to_meters(3.28084) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        for x in [0.01, 0.5, 1.0, 2.5, 3.0, 10.0, 123.456, 10_000.0] {
            let back = feet_to_meters(meters_to_feet(x));
            assert!(((back - x) / x).abs() < 1e-6, "round trip drifted for {}", x);
        }
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(1.0, DistanceUnit::Meters), "1.00 m");
        assert_eq!(format_distance(1.0, DistanceUnit::Feet), "3.28 ft");
    }

    #[test]
    fn test_unit_serde_names() {
        assert_eq!(serde_json::to_string(&DistanceUnit::Feet).unwrap(), "\"ft\"");
        let unit: DistanceUnit = serde_json::from_str("\"m\"").unwrap();
        assert_eq!(unit, DistanceUnit::Meters);
    }
}
