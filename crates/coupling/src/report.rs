use std::fmt;

use crate::RunState;

/// Monotonic progress counters of a run.
///
/// Only the scheduler increments these, after a phase completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    total_fluid_iterations: u64,
    total_solid_steps: u64,
    major_step_index: u64,
}

impl RunCounters {
    /// Returns the steady fluid iterations actually completed.
    #[must_use]
    pub fn total_fluid_iterations(&self) -> u64 {
        self.total_fluid_iterations
    }

    /// Returns the number of solid phases run.
    #[must_use]
    pub fn total_solid_steps(&self) -> u64 {
        self.total_solid_steps
    }

    /// Returns the index of the current major step (1-based, 0 before the first).
    #[must_use]
    pub fn major_step_index(&self) -> u64 {
        self.major_step_index
    }

    pub(crate) fn add_fluid_iterations(&mut self, n: u64) {
        self.total_fluid_iterations += n;
    }

    pub(crate) fn add_solid_step(&mut self) {
        self.total_solid_steps += 1;
    }

    pub(crate) fn next_major_step(&mut self) -> u64 {
        self.major_step_index += 1;
        self.major_step_index
    }
}

/// Builds summaries from scheduler state without modifying it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunReporter {
    solid_time_step: f64,
    reference_time_step: f64,
}

impl RunReporter {
    /// Creates a reporter comparing `solid_time_step` against the step a fully
    /// coupled solve would need.
    #[must_use]
    pub fn new(solid_time_step: f64, reference_time_step: f64) -> Self {
        Self {
            solid_time_step,
            reference_time_step,
        }
    }

    /// Returns how many times larger the partitioned step is.
    #[must_use]
    pub fn speedup(&self) -> f64 {
        self.solid_time_step / self.reference_time_step
    }

    #[must_use]
    pub fn summarize(&self, state: &RunState) -> RunSummary {
        RunSummary {
            initial_time: state.initial_time(),
            final_time: state.clock().time(),
            counters: *state.counters(),
            checkpoints: state.checkpoints(),
            soft_stops: state.soft_stops(),
            solid_time_step: self.solid_time_step,
            reference_time_step: self.reference_time_step,
        }
    }
}

/// Final (or partial) report of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    initial_time: f64,
    final_time: f64,
    counters: RunCounters,
    checkpoints: u64,
    soft_stops: u64,
    solid_time_step: f64,
    reference_time_step: f64,
}

impl RunSummary {
    #[must_use]
    pub fn initial_time(&self) -> f64 {
        self.initial_time
    }

    #[must_use]
    pub fn final_time(&self) -> f64 {
        self.final_time
    }

    /// Returns the physical time covered by the run.
    #[must_use]
    pub fn total_simulated_time(&self) -> f64 {
        self.final_time - self.initial_time
    }

    #[must_use]
    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }

    #[must_use]
    pub fn checkpoints(&self) -> u64 {
        self.checkpoints
    }

    #[must_use]
    pub fn soft_stops(&self) -> u64 {
        self.soft_stops
    }

    #[must_use]
    pub fn solid_time_step(&self) -> f64 {
        self.solid_time_step
    }

    /// Returns how many times larger the partitioned step is than the fully
    /// coupled reference step.
    #[must_use]
    pub fn speedup(&self) -> f64 {
        self.solid_time_step / self.reference_time_step
    }

    /// Estimates the fully coupled timesteps this run did not have to take.
    #[must_use]
    pub fn avoided_coupled_iterations(&self) -> u64 {
        let estimate = (self.total_simulated_time() / self.reference_time_step).round();
        if estimate.is_finite() && estimate > 0.0 {
            estimate as u64
        } else {
            0
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary:")?;
        writeln!(
            f,
            "  - Total simulated time: {} s",
            self.total_simulated_time()
        )?;
        writeln!(
            f,
            "  - Total fluid iterations: {}",
            self.counters.total_fluid_iterations
        )?;
        writeln!(
            f,
            "  - Total solid timesteps: {}",
            self.counters.total_solid_steps
        )?;
        writeln!(f, "  - Major steps: {}", self.counters.major_step_index)?;
        writeln!(f, "  - Checkpoints written: {}", self.checkpoints)?;
        if self.soft_stops > 0 {
            writeln!(f, "  - Interrupted phases: {}", self.soft_stops)?;
        }
        writeln!(
            f,
            "  - Effective timestep used: {} s",
            self.solid_time_step
        )?;
        writeln!(
            f,
            "  - Computational savings vs fully coupled: ~{}x faster",
            self.speedup().round() as u64
        )?;
        write!(
            f,
            "  - Equivalent fully-coupled iterations avoided: {}",
            self.avoided_coupled_iterations()
        )
    }
}
