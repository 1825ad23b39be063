//! Analysis modules.
//!
//! Aggregation of raw samples into per-distance statistics, quality
//! classification and generated commentary.

pub mod aggregator;
pub mod commentary;
pub mod quality;

pub use aggregator::*;
pub use commentary::{generate_commentary, CommentarySettings, INSUFFICIENT_DATA_MESSAGE};
pub use quality::{quality_label, QualityThresholds};
