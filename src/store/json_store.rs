//! JSON file store.

use super::ExperimentStore;
use crate::models::Experiment;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Stores an experiment as pretty-printed JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl ExperimentStore for JsonStore {
    fn load(&self) -> Result<Experiment> {
        if !self.path.exists() {
            debug!("No data file at {}, starting fresh", self.path.display());
            return Ok(Experiment::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read data file: {}", self.path.display()))?;

        let experiment: Experiment = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse data file: {}", self.path.display()))?;

        debug!(
            "Loaded {} samples from {}",
            experiment.samples.len(),
            self.path.display()
        );
        Ok(experiment)
    }

    fn save(&self, experiment: &Experiment) -> Result<()> {
        let dir = self.parent_dir();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let content = serde_json::to_string_pretty(experiment)?;

        // Write next to the target and rename so readers never see a partial file
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to write data file: {}", self.path.display()))?;

        debug!(
            "Saved {} samples to {}",
            experiment.samples.len(),
            self.path.display()
        );
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove data file: {}", self.path.display()))?;
        }
        Ok(())
    }
}
