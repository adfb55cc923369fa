use std::path::PathBuf;

use tandem_core::Observer;
use tandem_coupling::{Event, Shortfall};

/// State of the run at the end of one major step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    pub step: u64,
    pub time: f64,
    pub total_fluid_iterations: u64,
    pub total_solid_steps: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointRecord {
    pub step: u64,
    pub time: f64,
    pub path: PathBuf,
}

/// Records the progress of a run for later inspection.
///
/// One [`StepRecord`] is kept per completed major step, plus every
/// checkpoint written and every interrupted phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepHistory {
    steps: Vec<StepRecord>,
    checkpoints: Vec<CheckpointRecord>,
    soft_stops: Vec<(u64, Shortfall)>,
}

impl StepHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    #[must_use]
    pub fn checkpoints(&self) -> &[CheckpointRecord] {
        &self.checkpoints
    }

    /// Interrupted phases, keyed by the major step they occurred in.
    #[must_use]
    pub fn soft_stops(&self) -> &[(u64, Shortfall)] {
        &self.soft_stops
    }

    /// Returns the last completed major step, if any.
    #[must_use]
    pub fn last(&self) -> Option<&StepRecord> {
        self.steps.last()
    }

    /// Returns the checkpoint times, in order.
    pub fn checkpoint_times(&self) -> impl Iterator<Item = f64> + '_ {
        self.checkpoints.iter().map(|c| c.time)
    }
}

impl<'e> Observer<Event<'e>> for StepHistory {
    fn observe(&mut self, event: &Event<'e>) {
        match *event {
            Event::MajorStepCompleted {
                step,
                time,
                counters,
                ..
            } => self.steps.push(StepRecord {
                step,
                time,
                total_fluid_iterations: counters.total_fluid_iterations(),
                total_solid_steps: counters.total_solid_steps(),
            }),
            Event::Checkpoint { step, time, path } => self.checkpoints.push(CheckpointRecord {
                step,
                time,
                path: path.to_path_buf(),
            }),
            Event::SoftStop {
                step, shortfall, ..
            } => self.soft_stops.push((step, shortfall)),
            _ => {}
        }
    }
}

/// Allows `&mut StepHistory` to be passed where an observer is taken by value.
impl<'e> Observer<Event<'e>> for &mut StepHistory {
    fn observe(&mut self, event: &Event<'e>) {
        (**self).observe(event);
    }
}
