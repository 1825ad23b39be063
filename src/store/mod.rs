//! Experiment persistence.
//!
//! This module provides the local JSON experiment store and a debounced
//! writer that coalesces bursts of saves.

pub mod debounce;
pub mod json_store;

pub use debounce::DebouncedWriter;
pub use json_store::JsonStore;

use crate::models::Experiment;
use anyhow::Result;

/// Anything that can hold one experiment.
pub trait ExperimentStore {
    /// Load the stored experiment, or a fresh default one if nothing is stored.
    fn load(&self) -> Result<Experiment>;

    /// Replace the stored experiment.
    fn save(&self, experiment: &Experiment) -> Result<()>;

    /// Remove any stored experiment.
    fn clear(&self) -> Result<()>;
}
