//! Per-distance aggregation of RSSI samples.
//!
//! This module groups raw samples by exact distance and computes the
//! summary statistics used by every report: mean, population standard
//! deviation, quality band and delta from the nearest distance.

use crate::analysis::quality::QualityThresholds;
use crate::models::{DistanceGroup, Sample};
use std::collections::HashMap;

/// Aggregate samples with the default quality bands.
pub fn aggregate(samples: &[Sample]) -> Vec<DistanceGroup> {
    aggregate_with(samples, &QualityThresholds::default())
}

/// Aggregate samples, classifying each group with the given bands.
///
/// Returns one group per distinct distance, ascending. Input order only
/// affects the order of samples inside a group.
pub fn aggregate_with(samples: &[Sample], thresholds: &QualityThresholds) -> Vec<DistanceGroup> {
    let mut buckets = group_by_distance(samples);
    buckets.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut baseline_mean: Option<f64> = None;

    buckets
        .into_iter()
        .map(|(distance, group_samples)| {
            let readings: Vec<f64> = group_samples
                .iter()
                .map(|s| f64::from(s.signal_strength))
                .collect();
            let avg = mean(&readings);
            let std_dev = population_std_dev(&readings, avg);
            let baseline = *baseline_mean.get_or_insert(avg);

            DistanceGroup {
                distance,
                sample_count: group_samples.len(),
                samples: group_samples,
                mean_signal: round_to(avg, 1),
                std_dev_signal: round_to(std_dev, 2),
                quality_label: thresholds.classify(avg),
                delta_from_baseline: round_to(avg - baseline, 1),
            }
        })
        .collect()
}

/// Partition samples into buckets keyed by exact distance, keeping the
/// order in which each distance first appeared and the order of samples
/// within it.
fn group_by_distance(samples: &[Sample]) -> Vec<(f64, Vec<Sample>)> {
    let mut index: HashMap<u64, usize> = HashMap::new();
    let mut buckets: Vec<(f64, Vec<Sample>)> = Vec::new();

    for sample in samples {
        // +0.0 folds -0.0 into 0.0 so numerically equal keys share a bucket
        let key = sample.distance + 0.0;
        let slot = *index.entry(key.to_bits()).or_insert_with(|| {
            buckets.push((key, Vec::new()));
            buckets.len() - 1
        });
        buckets[slot].1.push(sample.clone());
    }

    buckets
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation dividing by N, not N - 1.
fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Round to a fixed number of decimals, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    // +0.0 keeps -0.0 out of rendered output
    (value * factor).round() / factor + 0.0
}

/// Total samples across groups.
pub fn total_samples(groups: &[DistanceGroup]) -> usize {
    groups.iter().map(|g| g.sample_count).sum()
}

/// Overall signal drop between the nearest and farthest distance, in dB.
pub fn total_drop(groups: &[DistanceGroup]) -> Option<f64> {
    match (groups.first(), groups.last()) {
        (Some(first), Some(last)) if groups.len() > 1 => {
            Some(round_to((last.mean_signal - first.mean_signal).abs(), 1))
        }
        _ => None,
    }
}

/// First group whose mean falls below the given level.
pub fn first_below(groups: &[DistanceGroup], level_dbm: f64) -> Option<&DistanceGroup> {
    groups.iter().find(|g| g.mean_signal < level_dbm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QualityLabel;

    fn sample(distance: f64, rssi: i32) -> Sample {
        Sample::new(distance, rssi)
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_two_distance_scenario() {
        let samples = vec![sample(1.0, -35), sample(1.0, -38), sample(2.0, -45)];
        let groups = aggregate(&samples);

        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].distance, 1.0);
        assert_eq!(groups[0].sample_count, 2);
        assert_eq!(groups[0].mean_signal, -36.5);
        assert_eq!(groups[0].std_dev_signal, 1.5);
        assert_eq!(groups[0].quality_label, QualityLabel::Excellent);
        assert_eq!(groups[0].delta_from_baseline, 0.0);

        assert_eq!(groups[1].distance, 2.0);
        assert_eq!(groups[1].sample_count, 1);
        assert_eq!(groups[1].mean_signal, -45.0);
        assert_eq!(groups[1].std_dev_signal, 0.0);
        assert_eq!(groups[1].quality_label, QualityLabel::Good);
        assert_eq!(groups[1].delta_from_baseline, -8.5);
    }

    #[test]
    fn test_groups_sorted_ascending() {
        let samples = vec![
            sample(5.0, -70),
            sample(0.5, -30),
            sample(3.0, -60),
            sample(0.5, -32),
        ];
        let groups = aggregate(&samples);
        let distances: Vec<f64> = groups.iter().map(|g| g.distance).collect();
        assert_eq!(distances, vec![0.5, 3.0, 5.0]);
    }

    #[test]
    fn test_exact_equality_grouping() {
        let samples = vec![sample(1.0, -40), sample(1.0, -42), sample(1.01, -41)];
        let groups = aggregate(&samples);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].sample_count, 2);
        assert_eq!(groups[1].distance, 1.01);
    }

    #[test]
    fn test_negative_zero_groups_with_zero() {
        let samples = vec![sample(0.0, -40), sample(-0.0, -42)];
        assert_eq!(aggregate(&samples).len(), 1);
    }

    #[test]
    fn test_intra_group_order_preserved() {
        let first = sample(2.0, -50);
        let second = sample(2.0, -55);
        let groups = aggregate(&[first.clone(), sample(1.0, -40), second.clone()]);
        assert_eq!(groups[1].samples[0].id, first.id);
        assert_eq!(groups[1].samples[1].id, second.id);
    }

    #[test]
    fn test_population_std_dev() {
        // values -40, -44: mean -42, deviations ±2, population sd = 2
        let groups = aggregate(&[sample(1.0, -40), sample(1.0, -44)]);
        assert_eq!(groups[0].std_dev_signal, 2.0);

        let flat = aggregate(&[sample(1.0, -60), sample(1.0, -60), sample(1.0, -60)]);
        assert_eq!(flat[0].std_dev_signal, 0.0);
    }

    #[test]
    fn test_label_uses_unrounded_mean() {
        // mean -50.04 rounds to -50.0 but is still below the Excellent edge
        let samples: Vec<Sample> = std::iter::repeat(-50)
            .take(24)
            .chain(std::iter::once(-51))
            .map(|r| sample(1.0, r))
            .collect();
        let groups = aggregate(&samples);
        assert_eq!(groups[0].mean_signal, -50.0);
        assert_eq!(groups[0].quality_label, QualityLabel::Good);
    }

    #[test]
    fn test_delta_uses_unrounded_means() {
        // baseline mean -40.25, next -45.0 -> delta -4.75 -> -4.8
        let samples = vec![
            sample(1.0, -40),
            sample(1.0, -40),
            sample(1.0, -40),
            sample(1.0, -41),
            sample(2.0, -45),
        ];
        let groups = aggregate(&samples);
        assert_eq!(groups[0].mean_signal, -40.3);
        assert_eq!(groups[1].delta_from_baseline, -4.8);
    }

    #[test]
    fn test_custom_thresholds_flow_through() {
        let strict = QualityThresholds {
            excellent: -30.0,
            good: -40.0,
            fair: -50.0,
            weak: -60.0,
        };
        let groups = aggregate_with(&[sample(1.0, -45)], &strict);
        assert_eq!(groups[0].quality_label, QualityLabel::Fair);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(-36.5, 1), -36.5);
        assert_eq!(round_to(1.234, 2), 1.23);
        assert_eq!(round_to(-8.46, 1), -8.5);
        assert!(round_to(-0.01, 1).is_sign_positive());
    }

    #[test]
    fn test_total_drop_and_first_below() {
        let groups = aggregate(&[sample(1.0, -40), sample(3.0, -65), sample(6.0, -78)]);
        assert_eq!(total_drop(&groups), Some(38.0));
        assert_eq!(first_below(&groups, -70.0).map(|g| g.distance), Some(6.0));
        assert!(first_below(&groups, -90.0).is_none());

        let single = aggregate(&[sample(1.0, -40)]);
        assert_eq!(total_drop(&single), None);
        assert_eq!(total_samples(&groups), 3);
    }
}
