//! rssilab - Wi-Fi RSSI lab logger.
//!
//! Records signal-strength samples at measured distances, aggregates them
//! per distance and renders summaries, CSV exports and reports.

pub mod analysis;
pub mod capture;
pub mod cli;
pub mod config;
pub mod display;
pub mod models;
pub mod report;
pub mod store;
pub mod units;
pub mod validation;

// Re-exports for library users
pub use analysis::{aggregate, aggregate_with, quality_label, QualityThresholds};
pub use models::{DistanceGroup, Experiment, ExperimentMeta, QualityLabel, Sample};
pub use units::{feet_to_meters, format_distance, meters_to_feet, DistanceUnit, M_TO_FT};
