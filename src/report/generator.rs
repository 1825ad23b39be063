//! Markdown and JSON report generation.
//!
//! This module renders an experiment report: metadata, the per-distance
//! summary, the raw readings and the generated commentary.

use crate::analysis::{generate_commentary, total_samples, CommentarySettings};
use crate::models::{DistanceGroup, Experiment, ExperimentMeta, Report, ReportMetadata};
use crate::units::{format_distance, DistanceUnit};
use anyhow::Result;
use chrono::Utc;

/// Assemble a report from an experiment and its aggregated groups.
pub fn build_report(
    experiment: &Experiment,
    groups: Vec<DistanceGroup>,
    settings: &CommentarySettings,
) -> Report {
    let commentary = generate_commentary(&groups, &experiment.meta, settings);

    Report {
        metadata: ReportMetadata {
            experiment: experiment.meta.clone(),
            generated_at: Utc::now(),
            total_samples: total_samples(&groups),
            distance_count: groups.len(),
        },
        groups,
        commentary,
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();
    let unit = report.metadata.experiment.unit;

    output.push_str(&format!("# {}\n\n", report.metadata.experiment.title));
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.groups, unit));
    output.push_str(&generate_readings_section(&report.groups, unit));
    output.push_str(&generate_commentary_section(&report.commentary));
    output.push_str(&generate_footer(report));

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let meta: &ExperimentMeta = &metadata.experiment;
    let mut section = String::new();

    section.push_str("## Experiment\n\n");
    if let Some(ref name) = meta.name {
        section.push_str(&format!("- **Name:** {}\n", name));
    }
    section.push_str(&format!("- **Date:** {}\n", meta.date.format("%Y-%m-%d")));
    if let Some(ref location) = meta.location {
        section.push_str(&format!("- **Location:** {}\n", location));
    }
    section.push_str(&format!("- **Band:** {}\n", meta.band));
    if let Some(ref ssid) = meta.ssid {
        section.push_str(&format!("- **SSID:** `{}`\n", ssid));
    }
    section.push_str(&format!("- **Samples:** {}\n", metadata.total_samples));
    section.push_str(&format!("- **Distances:** {}\n", metadata.distance_count));
    if let Some(ref notes) = meta.notes {
        section.push_str(&format!("\n> {}\n", notes.replace('\n', "\n> ")));
    }
    section.push('\n');

    section
}

/// Generate the per-distance summary table.
fn generate_summary_section(groups: &[DistanceGroup], unit: DistanceUnit) -> String {
    let mut section = String::new();

    section.push_str("## Summary by Distance\n\n");

    if groups.is_empty() {
        section.push_str("No readings have been recorded yet.\n\n");
        return section;
    }

    section.push_str("| Distance | Samples | Mean RSSI (dBm) | Std Dev (dB) | Quality | Δ Baseline (dB) |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---|:---:|\n");

    for group in groups {
        section.push_str(&format!(
            "| {} | {} | {:.1} | {:.2} | {} {} | {:+.1} |\n",
            format_distance(group.distance, unit),
            group.sample_count,
            group.mean_signal,
            group.std_dev_signal,
            group.quality_label.emoji(),
            group.quality_label,
            group.delta_from_baseline
        ));
    }
    section.push('\n');

    section
}

/// Generate the raw readings table.
fn generate_readings_section(groups: &[DistanceGroup], unit: DistanceUnit) -> String {
    if groups.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Readings\n\n");
    section.push_str("| Time | Distance | RSSI (dBm) | Noise (dBm) | Tx Rate (Mbps) | Note |\n");
    section.push_str("|:---|:---|:---:|:---:|:---:|:---|\n");

    for sample in groups.iter().flat_map(|g| &g.samples) {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            sample.captured_at.format("%Y-%m-%d %H:%M:%S"),
            format_distance(sample.distance, unit),
            sample.signal_strength,
            sample.noise.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
            sample.tx_rate.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string()),
            sample
                .note
                .as_deref()
                .map(escape_table_cell)
                .unwrap_or_default()
        ));
    }
    section.push('\n');

    section
}

/// Generate the commentary section.
fn generate_commentary_section(commentary: &str) -> String {
    if commentary.is_empty() {
        return String::new();
    }
    format!("## Discussion\n\n{}\n\n", commentary)
}

/// Generate the report footer.
fn generate_footer(report: &Report) -> String {
    format!(
        "---\n\n*Generated by rssilab v{} on {}*\n",
        env!("CARGO_PKG_VERSION"),
        report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Keep free text from breaking a Markdown table row.
fn escape_table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// `(distance in display unit, mean RSSI)` points for plotting.
pub fn chart_series(groups: &[DistanceGroup], unit: DistanceUnit) -> Vec<(f64, f64)> {
    groups
        .iter()
        .map(|g| (unit.from_meters(g.distance), g.mean_signal))
        .collect()
}
