//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.rssilab.toml` files.

use crate::analysis::{CommentarySettings, QualityThresholds};
use crate::capture::CaptureConfig;
use crate::units::DistanceUnit;
use crate::validation::ValidationConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".rssilab.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Quality band lower bounds.
    #[serde(default)]
    pub quality: QualityThresholds,

    /// Entry validation bounds.
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Commentary tunables.
    #[serde(default)]
    pub commentary: CommentarySettings,

    /// Persistence settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Live capture settings.
    #[serde(default)]
    pub capture: CaptureConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Experiment data file.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Unit for entering and displaying distances.
    #[serde(default)]
    pub unit: DistanceUnit,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            unit: DistanceUnit::Meters,
        }
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("rssi_experiment.json")
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Delay before a scheduled write hits disk.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    600
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .quality
            .validate()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Invalid [quality] section in {}", path.display()))?;

        config
            .validation
            .validate()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Invalid [validation] section in {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.general.data_file = data.clone();
        }

        if let Some(unit) = args.unit {
            self.general.unit = unit;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
