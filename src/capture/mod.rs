//! Live RSSI capture.
//!
//! Reads the current signal strength by running a platform Wi-Fi utility
//! and parsing its output. A failed read is always reported to the caller.

use crate::models::{Experiment, Sample};
use crate::store::DebouncedWriter;
use crate::validation::ValidationConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

const AIRPORT_PATH: &str =
    "/System/Library/PrivateFrameworks/Apple80211.framework/Versions/Current/Resources/airport";

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("No RSSI value found in capture output")]
    NotFound,

    #[error("Could not parse RSSI value: {0}")]
    Parse(String),

    #[error("No capture backend available for this platform; set [capture] backend in the config")]
    Unsupported,
}

/// A source of live RSSI readings.
pub trait SignalSource {
    fn read_rssi(&self) -> impl Future<Output = Result<i32, CaptureError>> + Send;
}

/// Output format of the utility being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// macOS `airport -I`
    Airport,
    /// Linux `iw dev <iface> link`
    Iw,
}

impl Backend {
    /// Backend for the platform we were compiled for, if any.
    pub fn platform_default() -> Option<Self> {
        if cfg!(target_os = "macos") {
            Some(Backend::Airport)
        } else if cfg!(target_os = "linux") {
            Some(Backend::Iw)
        } else {
            None
        }
    }

    pub fn parse(self, stdout: &str) -> Result<i32, CaptureError> {
        match self {
            Backend::Airport => parse_airport_output(stdout),
            Backend::Iw => parse_iw_output(stdout),
        }
    }
}

/// `[capture]` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Output format to expect; defaults to the platform's utility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<Backend>,

    /// Override the utility path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,

    /// Override the utility arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,

    /// Wireless interface for the `iw` backend.
    #[serde(default = "default_interface")]
    pub interface: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            backend: None,
            program: None,
            args: None,
            interface: default_interface(),
        }
    }
}

fn default_interface() -> String {
    "wlan0".to_string()
}

/// Runs a Wi-Fi utility and parses the RSSI from its stdout.
#[derive(Debug, Clone)]
pub struct CommandSource {
    backend: Backend,
    program: String,
    args: Vec<String>,
}

impl CommandSource {
    pub fn new(backend: Backend, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            backend,
            program: program.into(),
            args,
        }
    }

    /// Build a source from config, falling back to the platform defaults.
    pub fn from_config(config: &CaptureConfig) -> Result<Self, CaptureError> {
        let backend = config
            .backend
            .or_else(Backend::platform_default)
            .ok_or(CaptureError::Unsupported)?;

        let (default_program, default_args) = match backend {
            Backend::Airport => (AIRPORT_PATH.to_string(), vec!["-I".to_string()]),
            Backend::Iw => (
                "iw".to_string(),
                vec!["dev".to_string(), config.interface.clone(), "link".to_string()],
            ),
        };

        Ok(Self::new(
            backend,
            config.program.clone().unwrap_or(default_program),
            config.args.clone().unwrap_or(default_args),
        ))
    }
}

impl SignalSource for CommandSource {
    async fn read_rssi(&self) -> Result<i32, CaptureError> {
        debug!("Running {} {:?}", self.program, self.args);

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| CaptureError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CaptureError::CommandFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        self.backend.parse(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Always returns the same reading. Used for dry runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedSource(pub i32);

impl SignalSource for FixedSource {
    async fn read_rssi(&self) -> Result<i32, CaptureError> {
        Ok(self.0)
    }
}

/// What a capture run records: where, how many and how often.
#[derive(Debug, Clone)]
pub struct CapturePlan {
    /// Distance in meters.
    pub distance: f64,
    pub count: usize,
    pub interval: Duration,
    pub note: Option<String>,
}

/// Outcome of a completed capture run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureSummary {
    pub recorded: usize,
    pub rejected: usize,
}

/// Take readings from `source` and record each valid one as it arrives.
///
/// Every recorded sample is appended to `experiment` and scheduled on
/// `writer` before the next reading is taken. Readings outside the
/// validation bounds are skipped. A failed read stops the run; samples
/// recorded before it stay in `experiment` and the writer, so the caller
/// must still flush.
pub async fn record_readings<S, F>(
    source: &S,
    plan: &CapturePlan,
    validation: &ValidationConfig,
    experiment: &mut Experiment,
    writer: &DebouncedWriter,
    mut on_recorded: F,
) -> Result<CaptureSummary>
where
    S: SignalSource,
    F: FnMut(&Sample),
{
    let mut summary = CaptureSummary::default();

    for i in 0..plan.count {
        if i > 0 && !plan.interval.is_zero() {
            tokio::time::sleep(plan.interval).await;
        }

        let rssi = source
            .read_rssi()
            .await
            .with_context(|| format!("Reading {}/{} failed", i + 1, plan.count))?;

        if let Err(e) = validation.check_rssi(rssi) {
            warn!("Skipping reading {}/{}: {}", i + 1, plan.count, e);
            summary.rejected += 1;
            continue;
        }

        info!("Reading {}/{}: {} dBm", i + 1, plan.count, rssi);
        let sample = Sample::new(plan.distance, rssi).with_note(plan.note.clone());
        on_recorded(&sample);
        experiment.add_sample(sample);
        writer.schedule(experiment.clone())?;
        summary.recorded += 1;
    }

    Ok(summary)
}

/// Parse `agrCtlRSSI: -NN` from `airport -I`.
pub fn parse_airport_output(stdout: &str) -> Result<i32, CaptureError> {
    let value = stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("agrCtlRSSI:"))
        .ok_or(CaptureError::NotFound)?;

    parse_dbm(value.trim())
}

/// Parse `signal: -NN dBm` from `iw dev <iface> link`.
pub fn parse_iw_output(stdout: &str) -> Result<i32, CaptureError> {
    let value = stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("signal:"))
        .and_then(|rest| rest.split_whitespace().next())
        .ok_or(CaptureError::NotFound)?;

    parse_dbm(value)
}

fn parse_dbm(value: &str) -> Result<i32, CaptureError> {
    value
        .parse::<i32>()
        .map_err(|e| CaptureError::Parse(format!("{:?}: {}", value, e)))
}
