use crate::models::{DistanceGroup, Sample};
use crate::units::{format_distance, DistanceUnit};

/// Print the per-distance summary table.
pub fn display_groups(groups: &[DistanceGroup], unit: DistanceUnit) {
    if groups.is_empty() {
        println!("No readings recorded yet");
        return;
    }

    println!("\n{}", "=".repeat(78));
    println!("{:<12} {:>8} {:>12} {:>10} {:<14} {:>12}",
        "Distance", "Samples", "Mean (dBm)", "Std Dev", "Quality", "Δ Baseline");
    println!("{}", "-".repeat(78));

    for group in groups {
        println!("{:<12} {:>8} {:>12.1} {:>10.2} {} {:<11} {:>12.1}",
            format_distance(group.distance, unit),
            group.sample_count,
            group.mean_signal,
            group.std_dev_signal,
            group.quality_label.emoji(),
            group.quality_label,
            group.delta_from_baseline
        );
    }

    println!("{}", "=".repeat(78));
    let total: usize = groups.iter().map(|g| g.sample_count).sum();
    println!("Distances: {} | Samples: {}", groups.len(), total);
}

/// Print raw samples in insertion order.
pub fn display_samples(samples: &[Sample], unit: DistanceUnit) {
    if samples.is_empty() {
        println!("No readings recorded yet");
        return;
    }

    println!("{:<38} {:<20} {:<12} {:>6} {:>6} {:>8}  Note",
        "ID", "Time", "Distance", "RSSI", "Noise", "Tx Mbps");
    println!("{}", "-".repeat(100));

    for sample in samples {
        println!("{:<38} {:<20} {:<12} {:>6} {:>6} {:>8}  {}",
            sample.id,
            sample.captured_at.format("%Y-%m-%d %H:%M:%S"),
            format_distance(sample.distance, unit),
            sample.signal_strength,
            sample.noise.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
            sample.tx_rate.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string()),
            sample.note.as_deref().unwrap_or("")
        );
    }
}
