//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::Band;
use crate::units::DistanceUnit;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rssilab - Wi-Fi RSSI lab logger
///
/// Record signal strength at measured distances, summarise the
/// attenuation per distance and export CSV or Markdown reports.
///
/// Examples:
///   rssilab add --distance 1 --rssi -38
///   rssilab capture --distance 3 --samples 5
///   rssilab summary
///   rssilab report --output report.md
///   rssilab export-csv --output readings.csv
///   rssilab init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .rssilab.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Experiment data file (overrides config)
    #[arg(long, value_name = "FILE", env = "RSSILAB_DATA", global = true)]
    pub data: Option<PathBuf>,

    /// Unit for entering and displaying distances (overrides config)
    #[arg(short, long, value_name = "UNIT", global = true)]
    pub unit: Option<DistanceUnit>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Record a reading entered by hand
    Add {
        /// Distance from the access point, in the active unit
        #[arg(short, long)]
        distance: f64,

        /// Signal strength in dBm (e.g. -45)
        #[arg(short, long, allow_hyphen_values = true)]
        rssi: i32,

        /// Noise floor in dBm
        #[arg(long, allow_hyphen_values = true)]
        noise: Option<i32>,

        /// Link transmit rate in Mbps
        #[arg(long)]
        tx_rate: Option<f64>,

        /// Free-text note
        #[arg(long)]
        note: Option<String>,
    },

    /// Read live RSSI from the Wi-Fi adapter and record it
    Capture {
        /// Distance from the access point, in the active unit
        #[arg(short, long)]
        distance: f64,

        /// Number of readings to take
        #[arg(short, long, default_value = "1", value_name = "COUNT")]
        samples: usize,

        /// Pause between readings
        #[arg(long, default_value = "1000", value_name = "MS")]
        interval_ms: u64,

        /// Note attached to every reading
        #[arg(long)]
        note: Option<String>,

        /// Use this fixed reading instead of the adapter (dry run)
        #[arg(long, value_name = "DBM", allow_hyphen_values = true)]
        simulate: Option<i32>,
    },

    /// Delete a reading by id
    Remove {
        /// Reading id as shown by `list`
        id: String,
    },

    /// List all recorded readings
    List,

    /// Show the per-distance summary and commentary
    Summary,

    /// Delete all readings, keeping experiment metadata
    Reset,

    /// Update experiment metadata
    Meta {
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        band: Option<Band>,

        #[arg(long)]
        ssid: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Export readings (or per-distance groups) as CSV
    ExportCsv {
        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Export the per-distance summary instead of raw readings
        #[arg(long)]
        groups: bool,
    },

    /// Append readings from a CSV produced by export-csv
    ImportCsv {
        /// CSV file to read
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Generate a full experiment report
    Report {
        /// Output file path for the report
        #[arg(short, long, default_value = "rssi_report.md", value_name = "FILE")]
        output: PathBuf,

        /// Output format (markdown, json)
        #[arg(long, default_value = "markdown", value_name = "FORMAT")]
        format: OutputFormat,
    },

    /// Generate a default .rssilab.toml configuration file
    InitConfig,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match &self.command {
            Command::Capture {
                samples,
                interval_ms,
                ..
            } => {
                if *samples == 0 {
                    return Err("Samples must be at least 1".to_string());
                }
                if *interval_ms > 60_000 {
                    return Err("Interval must be at most 60000 ms".to_string());
                }
            }
            Command::Remove { id } if id.trim().is_empty() => {
                return Err("Reading id must not be empty".to_string());
            }
            _ => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args(command: Command) -> Args {
        Args {
            command,
            config: None,
            data: None,
            unit: None,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_parse_add_with_negative_rssi() {
        let args = Args::try_parse_from([
            "rssilab", "add", "--distance", "2.5", "--rssi", "-47", "--noise", "-90",
        ])
        .unwrap();

        match args.command {
            Command::Add {
                distance,
                rssi,
                noise,
                ..
            } => {
                assert_eq!(distance, 2.5);
                assert_eq!(rssi, -47);
                assert_eq!(noise, Some(-90));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_unit_flag() {
        let args = Args::try_parse_from(["rssilab", "summary", "--unit", "ft"]).unwrap();
        assert_eq!(args.unit, Some(DistanceUnit::Feet));
    }

    #[test]
    fn test_meta_band_values() {
        let args =
            Args::try_parse_from(["rssilab", "meta", "--band", "2.4ghz", "--title", "Lab"]).unwrap();
        match args.command {
            Command::Meta { band, title, .. } => {
                assert_eq!(band, Some(Band::Ghz2_4));
                assert_eq!(title.as_deref(), Some("Lab"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args(Command::List);
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_samples() {
        let args = make_args(Command::Capture {
            distance: 1.0,
            samples: 0,
            interval_ms: 1000,
            note: None,
            simulate: None,
        });
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args(Command::Summary);
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
