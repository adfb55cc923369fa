use std::path::{Path, PathBuf};

use tandem_core::Engine;
use tracing::debug;

use crate::{CheckpointSettings, Error};

/// When the next checkpoint is due.
///
/// The schedule is a fixed grid of `save_interval` spacing starting one
/// interval after the initial time. At most one checkpoint is written per
/// major step: if a step jumps over several grid points the schedule advances
/// by a single interval and the skipped saves are not made up.
///
/// Times within `tolerance` below a grid point count as reaching it, so
/// rounding in the accumulated time never delays a save by a major step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckpointSchedule {
    next_save_time: f64,
    save_interval: f64,
    tolerance: f64,
}

impl CheckpointSchedule {
    #[must_use]
    pub fn new(initial_time: f64, save_interval: f64, tolerance: f64) -> Self {
        Self {
            next_save_time: initial_time + save_interval,
            save_interval,
            tolerance,
        }
    }

    #[must_use]
    pub fn next_save_time(&self) -> f64 {
        self.next_save_time
    }

    /// Returns `true` if a save is due at `time`; the end time always is.
    #[must_use]
    pub fn is_due(&self, time: f64, end_time: f64) -> bool {
        time >= self.next_save_time - self.tolerance || time >= end_time - self.tolerance
    }

    /// Moves the schedule one interval forward.
    pub fn advance(&mut self) {
        self.next_save_time += self.save_interval;
    }
}

/// Issues save requests to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointManager {
    directory: PathBuf,
    prefix: String,
}

impl CheckpointManager {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
        }
    }

    /// Creates a manager from settings, defaulting to the engine's session
    /// directory.
    #[must_use]
    pub fn from_settings<E: Engine>(settings: &CheckpointSettings, engine: &E) -> Self {
        let directory = settings
            .directory
            .clone()
            .unwrap_or_else(|| engine.session_dir());
        Self::new(directory, settings.prefix.clone())
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the state file path for `time`, stamped to two decimals.
    #[must_use]
    pub fn path_for(&self, time: f64) -> PathBuf {
        self.directory
            .join(format!("{}_t{time:.2}.sim", self.prefix))
    }

    /// Saves the engine state for `time` and returns the path written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Engine`] if the engine fails to write. Saves are not
    /// retried.
    pub fn save<E: Engine>(&self, engine: &mut E, time: f64) -> Result<PathBuf, Error> {
        let path = self.path_for(time);
        debug!(time, path = %path.display(), "saving simulation");
        engine.save_state(&path).map_err(Error::engine)?;
        Ok(path)
    }
}
