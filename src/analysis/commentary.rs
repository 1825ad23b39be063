//! Lab-report commentary generated from aggregated groups.

use crate::analysis::aggregator::{first_below, total_drop};
use crate::models::{Band, DistanceGroup, ExperimentMeta};
use serde::{Deserialize, Serialize};

/// Message returned when there are too few distances to describe a trend.
pub const INSUFFICIENT_DATA_MESSAGE: &str = "Insufficient data to generate a full commentary. \
Record measurements at several distances (for example 1 m, 3 m and 5 m) to observe the \
signal attenuation trend.";

/// Commentary shorter than this gets an extra paragraph.
const MIN_WORDS: usize = 150;

/// Tunables for commentary generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommentarySettings {
    /// Minimum number of distinct distances before a trend is described.
    #[serde(default = "default_min_distances")]
    pub min_distances: usize,

    /// Mean RSSI (dBm) below which a distance is called out as a weak spot.
    #[serde(default = "default_weak_threshold")]
    pub weak_threshold: f64,
}

impl Default for CommentarySettings {
    fn default() -> Self {
        Self {
            min_distances: default_min_distances(),
            weak_threshold: default_weak_threshold(),
        }
    }
}

fn default_min_distances() -> usize {
    2
}

fn default_weak_threshold() -> f64 {
    -70.0
}

/// Generate a paragraph-style discussion of the attenuation trend.
pub fn generate_commentary(
    groups: &[DistanceGroup],
    meta: &ExperimentMeta,
    settings: &CommentarySettings,
) -> String {
    if groups.len() < settings.min_distances.max(2) {
        return INSUFFICIENT_DATA_MESSAGE.to_string();
    }

    // At least two groups from here on
    let (baseline, farthest) = match (groups.first(), groups.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return INSUFFICIENT_DATA_MESSAGE.to_string(),
    };
    let drop = total_drop(groups).unwrap_or(0.0);
    let band = match meta.band {
        Band::Unknown => "Wi-Fi".to_string(),
        other => other.to_string(),
    };
    let threshold = settings.weak_threshold;

    let intro = format!(
        "In this experiment the Received Signal Strength Indicator (RSSI) of the {} network \
was measured at distances from {} m to {} m. The table and chart show a clear inverse \
relationship between distance and signal strength, which matches the expected behaviour of \
radio propagation indoors.",
        band, baseline.distance, farthest.distance
    );

    let trend = format!(
        "Starting from a baseline of {:.1} dBm at {} m, the signal attenuated by roughly {:.1} dB \
as the distance grew to {} m. The decline is not linear; it follows the logarithmic shape of \
common path loss models, with real-world fluctuations around it. Those deviations are most \
likely multipath fading from reflections off walls, furniture and the floor, together with \
shadowing from obstructions in the line of sight.",
        baseline.mean_signal, baseline.distance, drop, farthest.distance
    );

    let impact = match first_below(groups, threshold) {
        Some(weak) => format!(
            "Once the RSSI fell below {:.0} dBm (first around {} m) the link reached the range \
where throughput typically begins to suffer. Readings between -75 and -80 dBm usually bring \
higher latency, lower data rates and more retransmissions, which makes real-time traffic such \
as voice or video calls unreliable.",
            threshold, weak.distance
        ),
        None => format!(
            "Across the whole measured range the signal stayed above {:.0} dBm, indicating good \
coverage for this test area. Extending the distance further would eventually push the RSSI \
into the -75 to -80 dBm range, where packet loss and retransmissions noticeably degrade \
network performance.",
            threshold
        ),
    };

    let conclusion = "Overall, the data confirms distance as a primary driver of signal \
attenuation. The standard deviation at each point shows that wireless channels vary over time, \
so even a stationary device sees small swings in received power as the environment changes. \
Reliable coverage therefore depends on careful access point placement.";

    let mut text = format!("{} {} {} {}", intro, trend, impact, conclusion);

    if word_count(&text) < MIN_WORDS {
        text.push_str(
            " Interference from nearby electronic devices or overlapping Wi-Fi networks may also \
have raised the noise floor, lowering the signal-to-noise ratio and shifting the exact RSSI \
values recorded during the session.",
        );
    }

    text
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
