//! Data models for the RSSI lab logger.
//!
//! This module contains the core data structures used throughout
//! the application: raw samples, derived distance groups, experiment
//! metadata and the report envelope.

use crate::analysis::{aggregate_with, QualityThresholds};
use crate::units::DistanceUnit;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A single RSSI reading taken at a known distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Opaque unique identifier, preserved across store round-trips.
    pub id: String,
    /// When the reading was taken.
    pub captured_at: DateTime<Utc>,
    /// Distance from the access point in meters.
    pub distance: f64,
    /// Received signal strength in dBm.
    pub signal_strength: i32,
    /// Noise floor in dBm, if the capture source reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise: Option<i32>,
    /// Link transmit rate in Mbps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_rate: Option<f64>,
    /// Free-text annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Sample {
    /// Creates a sample with a fresh id, stamped with the current time.
    pub fn new(distance: f64, signal_strength: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            captured_at: Utc::now(),
            distance,
            signal_strength,
            noise: None,
            tx_rate: None,
            note: None,
        }
    }

    pub fn with_noise(mut self, noise: Option<i32>) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_tx_rate(mut self, tx_rate: Option<f64>) -> Self {
        self.tx_rate = tx_rate;
        self
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note.filter(|n| !n.is_empty());
        self
    }
}

/// Link quality band derived from a mean RSSI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityLabel {
    /// Below the weak threshold; the link is barely usable
    Unusable,
    /// Throughput and latency start to suffer
    Weak,
    /// Usable for browsing, marginal for real-time traffic
    Fair,
    /// Reliable for most workloads
    Good,
    /// Near the access point
    Excellent,
}

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityLabel::Excellent => write!(f, "Excellent"),
            QualityLabel::Good => write!(f, "Good"),
            QualityLabel::Fair => write!(f, "Fair"),
            QualityLabel::Weak => write!(f, "Weak"),
            QualityLabel::Unusable => write!(f, "Unusable"),
        }
    }
}

impl QualityLabel {
    /// Returns an emoji representation of the quality band.
    pub fn emoji(&self) -> &'static str {
        match self {
            QualityLabel::Excellent => "🟢",
            QualityLabel::Good => "🔵",
            QualityLabel::Fair => "🟡",
            QualityLabel::Weak => "🟠",
            QualityLabel::Unusable => "🔴",
        }
    }
}

/// Statistics for all samples recorded at one distance.
///
/// Always derived from the current sample set; never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceGroup {
    /// Grouping key in meters.
    pub distance: f64,
    /// Samples at this distance, in insertion order.
    pub samples: Vec<Sample>,
    pub sample_count: usize,
    /// Mean RSSI, rounded to one decimal.
    pub mean_signal: f64,
    /// Population standard deviation of RSSI, rounded to two decimals.
    pub std_dev_signal: f64,
    pub quality_label: QualityLabel,
    /// Mean difference to the nearest-distance group, rounded to one decimal.
    pub delta_from_baseline: f64,
}

/// Wi-Fi band the experiment was run on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Band {
    #[serde(rename = "2.4GHz")]
    #[value(name = "2.4ghz")]
    Ghz2_4,
    #[serde(rename = "5GHz")]
    #[value(name = "5ghz")]
    Ghz5,
    #[default]
    Unknown,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Ghz2_4 => write!(f, "2.4GHz"),
            Band::Ghz5 => write!(f, "5GHz"),
            Band::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Descriptive metadata for an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMeta {
    /// Experiment title shown in reports.
    #[serde(default = "default_title")]
    pub title: String,
    /// Name of the person running the experiment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Date of the experiment.
    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub band: Band,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Unit used for entry and display.
    #[serde(default)]
    pub unit: DistanceUnit,
}

fn default_title() -> String {
    "RSSI Measurement".to_string()
}

impl Default for ExperimentMeta {
    fn default() -> Self {
        Self {
            title: default_title(),
            name: None,
            date: Utc::now(),
            location: None,
            band: Band::Unknown,
            ssid: None,
            notes: None,
            unit: DistanceUnit::Meters,
        }
    }
}

/// An experiment: metadata plus every sample recorded so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    #[serde(default)]
    pub meta: ExperimentMeta,
    #[serde(default)]
    pub samples: Vec<Sample>,
}

impl Experiment {
    pub fn new(meta: ExperimentMeta) -> Self {
        Self {
            meta,
            samples: Vec::new(),
        }
    }

    /// Appends a sample. Validation happens before this point.
    pub fn add_sample(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Removes the sample with the given id, returning it if it existed.
    pub fn remove_sample(&mut self, id: &str) -> Option<Sample> {
        let index = self.samples.iter().position(|s| s.id == id)?;
        Some(self.samples.remove(index))
    }

    /// Drops all samples and restamps the experiment date.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.meta.date = Utc::now();
    }

    /// Per-distance summary of the current samples.
    pub fn groups(&self, thresholds: &QualityThresholds) -> Vec<DistanceGroup> {
        aggregate_with(&self.samples, thresholds)
    }
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Experiment description.
    pub experiment: ExperimentMeta,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Total samples across all groups.
    pub total_samples: usize,
    /// Number of distinct distances.
    pub distance_count: usize,
}

/// The complete experiment report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// Per-distance statistics, ascending by distance.
    pub groups: Vec<DistanceGroup>,
    /// Generated lab commentary.
    pub commentary: String,
}
