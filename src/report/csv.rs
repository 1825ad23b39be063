//! CSV export and import.
//!
//! Raw samples are written one per row; notes containing commas, quotes or
//! line breaks are quoted by the writer and survive a round trip.

use crate::models::{DistanceGroup, Sample};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

/// Header row for raw sample exports.
pub const SAMPLE_HEADER: [&str; 7] = [
    "ReadingID",
    "Timestamp",
    "Distance_Meters",
    "RSSI_dBm",
    "Noise_dBm",
    "TxRate_Mbps",
    "Note",
];

/// Header row for aggregated group exports.
pub const GROUP_HEADER: [&str; 6] = [
    "Distance_Meters",
    "Samples",
    "Mean_RSSI_dBm",
    "StdDev_dB",
    "Quality",
    "Delta_dB",
];

/// One row of a sample export. Field order matches [`SAMPLE_HEADER`].
#[derive(Debug, Serialize, Deserialize)]
struct SampleRecord {
    #[serde(rename = "ReadingID")]
    id: String,
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Distance_Meters")]
    distance: f64,
    #[serde(rename = "RSSI_dBm")]
    rssi: i32,
    #[serde(rename = "Noise_dBm")]
    noise: Option<i32>,
    #[serde(rename = "TxRate_Mbps")]
    tx_rate: Option<f64>,
    #[serde(rename = "Note")]
    note: Option<String>,
}

impl From<&Sample> for SampleRecord {
    fn from(sample: &Sample) -> Self {
        Self {
            id: sample.id.clone(),
            timestamp: sample
                .captured_at
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            distance: sample.distance,
            rssi: sample.signal_strength,
            noise: sample.noise,
            tx_rate: sample.tx_rate,
            note: sample.note.clone(),
        }
    }
}

impl TryFrom<SampleRecord> for Sample {
    type Error = anyhow::Error;

    fn try_from(record: SampleRecord) -> Result<Self> {
        let captured_at = DateTime::parse_from_rfc3339(&record.timestamp)
            .with_context(|| format!("invalid timestamp {:?}", record.timestamp))?
            .with_timezone(&Utc);

        Ok(Sample {
            id: record.id,
            captured_at,
            distance: record.distance,
            signal_strength: record.rssi,
            noise: record.noise,
            tx_rate: record.tx_rate,
            note: record.note.filter(|n| !n.is_empty()),
        })
    }
}

/// Write samples as CSV to any writer. The header is always written.
pub fn write_samples<W: Write>(samples: &[Sample], out: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(out);
    wtr.write_record(SAMPLE_HEADER)?;
    for sample in samples {
        wtr.serialize(SampleRecord::from(sample))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write aggregated groups as CSV to any writer.
pub fn write_groups<W: Write>(groups: &[DistanceGroup], out: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(out);
    wtr.write_record(GROUP_HEADER)?;
    for group in groups {
        wtr.write_record([
            group.distance.to_string(),
            group.sample_count.to_string(),
            format!("{:.1}", group.mean_signal),
            format!("{:.2}", group.std_dev_signal),
            group.quality_label.to_string(),
            format!("{:.1}", group.delta_from_baseline),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render raw samples as CSV text.
pub fn samples_to_csv(samples: &[Sample]) -> Result<String> {
    let mut buf = Vec::new();
    write_samples(samples, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// Render aggregated groups as CSV text.
pub fn groups_to_csv(groups: &[DistanceGroup]) -> Result<String> {
    let mut buf = Vec::new();
    write_groups(groups, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// Write a sample export to a file.
pub fn write_samples_csv(samples: &[Sample], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to write CSV to {}", path.display()))?;
    write_samples(samples, file)
}

/// Write a group export to a file.
pub fn write_groups_csv(groups: &[DistanceGroup], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to write CSV to {}", path.display()))?;
    write_groups(groups, file)
}

/// Read samples from CSV produced by [`write_samples`].
pub fn read_samples<R: Read>(input: R) -> Result<Vec<Sample>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(input);

    let headers = reader.headers().context("CSV is empty")?.clone();
    if !headers.iter().eq(SAMPLE_HEADER) {
        bail!(
            "Unexpected CSV header: expected {}, got {}",
            SAMPLE_HEADER.join(","),
            headers.iter().collect::<Vec<_>>().join(",")
        );
    }

    reader
        .deserialize::<SampleRecord>()
        .enumerate()
        .map(|(i, row)| {
            row.map_err(anyhow::Error::from)
                .and_then(Sample::try_from)
                .with_context(|| format!("CSV row {}", i + 2))
        })
        .collect()
}

/// Parse CSV text back into samples.
pub fn parse_samples_csv(content: &str) -> Result<Vec<Sample>> {
    read_samples(content.as_bytes())
}

/// Read a sample CSV file.
pub fn read_samples_csv(path: &Path) -> Result<Vec<Sample>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to read CSV file: {}", path.display()))?;
    read_samples(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregate;
    use tempfile::TempDir;

    #[test]
    fn test_header_and_empty_optionals() {
        let sample = Sample::new(2.5, -48);
        let csv = samples_to_csv(&[sample.clone()]).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next(),
            Some("ReadingID,Timestamp,Distance_Meters,RSSI_dBm,Noise_dBm,TxRate_Mbps,Note")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with(&sample.id));
        assert!(row.ends_with(",2.5,-48,,,"));
    }

    #[test]
    fn test_header_written_without_samples() {
        let csv = samples_to_csv(&[]).unwrap();
        assert_eq!(csv.trim_end(), SAMPLE_HEADER.join(","));
        assert!(parse_samples_csv(&csv).unwrap().is_empty());
    }

    #[test]
    fn test_zero_noise_is_not_dropped() {
        let csv = samples_to_csv(&[Sample::new(1.5, -40).with_noise(Some(0))]).unwrap();
        assert!(csv.lines().nth(1).unwrap().ends_with(",1.5,-40,0,,"));
    }

    #[test]
    fn test_round_trip_with_awkward_notes() {
        let samples = vec![
            Sample::new(1.0, -38).with_note(Some("near desk, line of sight".to_string())),
            Sample::new(2.5, -51)
                .with_noise(Some(-92))
                .with_tx_rate(Some(433.3))
                .with_note(Some("said \"hi\"\nthen moved".to_string())),
            Sample::new(0.3048, -35),
        ];

        let csv = samples_to_csv(&samples).unwrap();
        assert!(csv.contains("\"said \"\"hi\"\"\nthen moved\""));

        let parsed = parse_samples_csv(&csv).unwrap();
        assert_eq!(parsed, samples);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("readings.csv");
        let samples = vec![Sample::new(3.0, -60), Sample::new(5.0, -71)];

        write_samples_csv(&samples, &path).unwrap();
        assert_eq!(read_samples_csv(&path).unwrap(), samples);
    }

    #[test]
    fn test_crlf_input() {
        let content = "ReadingID,Timestamp,Distance_Meters,RSSI_dBm,Noise_dBm,TxRate_Mbps,Note\r\n\
a1,2024-03-01T10:00:00Z,1,-40,,,\r\n";
        let parsed = parse_samples_csv(content).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, "a1");
        assert_eq!(parsed[0].distance, 1.0);
        assert_eq!(parsed[0].note, None);
    }

    #[test]
    fn test_bad_header_rejected() {
        let err = parse_samples_csv("id,rssi\n1,-40\n").unwrap_err();
        assert!(err.to_string().contains("Unexpected CSV header"));
    }

    #[test]
    fn test_bad_row_reports_line() {
        let content = "ReadingID,Timestamp,Distance_Meters,RSSI_dBm,Noise_dBm,TxRate_Mbps,Note\n\
a1,2024-03-01T10:00:00Z,1,-40,,,\n\
a2,2024-03-01T10:00:05Z,far,-40,,,\n";
        let err = parse_samples_csv(content).unwrap_err();
        assert!(format!("{:#}", err).contains("CSV row 3"));
    }

    #[test]
    fn test_bad_timestamp_reports_line() {
        let content = "ReadingID,Timestamp,Distance_Meters,RSSI_dBm,Noise_dBm,TxRate_Mbps,Note\n\
a1,yesterday,1,-40,,,\n";
        let err = format!("{:#}", parse_samples_csv(content).unwrap_err());
        assert!(err.contains("CSV row 2"));
        assert!(err.contains("invalid timestamp"));
    }

    #[test]
    fn test_short_row_rejected() {
        let content = "ReadingID,Timestamp,Distance_Meters,RSSI_dBm,Noise_dBm,TxRate_Mbps,Note\n\
a1,2024-03-01T10:00:00Z,1,-40\n";
        assert!(parse_samples_csv(content).is_err());
    }

    #[test]
    fn test_groups_to_csv() {
        let groups = aggregate(&[
            Sample::new(1.0, -35),
            Sample::new(1.0, -38),
            Sample::new(2.0, -45),
        ]);
        let csv = groups_to_csv(&groups).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "Distance_Meters,Samples,Mean_RSSI_dBm,StdDev_dB,Quality,Delta_dB"
        );
        assert_eq!(lines[1], "1,2,-36.5,1.50,Excellent,0.0");
        assert_eq!(lines[2], "2,1,-45.0,0.00,Good,-8.5");
    }
}
