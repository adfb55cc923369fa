use thiserror::Error;

/// The immutable time-advancement policy of a coupled run.
///
/// A policy is validated once, when the run starts, and is never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouplingPolicy {
    solid_time_step: f64,
    fluid_iterations_per_phase: u64,
    subcycles_per_major_step: u32,
    save_interval: f64,
    end_time: f64,
}

/// Errors that can occur when validating a run configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("solid_time_step must be finite and positive")]
    SolidTimeStep,

    #[error("fluid_iterations_per_phase must be positive")]
    FluidIterations,

    #[error("subcycles_per_major_step must be at least 1")]
    Subcycles,

    #[error("save_interval must be finite and positive")]
    SaveInterval,

    #[error("end_time must be finite and positive")]
    EndTime,

    #[error("reference_time_step must be finite and positive")]
    ReferenceTimeStep,

    #[error("at least one solid continuum is required")]
    NoSolids,

    #[error("continuum name must not be empty")]
    EmptyName,

    #[error("continuum `{0}` is listed more than once")]
    DuplicateContinuum(String),
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl Default for CouplingPolicy {
    fn default() -> Self {
        Self {
            solid_time_step: 1e-4,
            fluid_iterations_per_phase: 25,
            subcycles_per_major_step: 2,
            save_interval: 0.1,
            end_time: 2.0,
        }
    }
}

impl CouplingPolicy {
    /// Creates a new policy with validated values.
    ///
    /// # Errors
    ///
    /// Returns an error if a time value is non-finite or not positive, or if
    /// an iteration or subcycle count is zero.
    pub fn new(
        solid_time_step: f64,
        fluid_iterations_per_phase: u64,
        subcycles_per_major_step: u32,
        save_interval: f64,
        end_time: f64,
    ) -> Result<Self, ConfigError> {
        if !is_positive(solid_time_step) {
            return Err(ConfigError::SolidTimeStep);
        }
        if fluid_iterations_per_phase == 0 {
            return Err(ConfigError::FluidIterations);
        }
        if subcycles_per_major_step == 0 {
            return Err(ConfigError::Subcycles);
        }
        if !is_positive(save_interval) {
            return Err(ConfigError::SaveInterval);
        }
        if !is_positive(end_time) {
            return Err(ConfigError::EndTime);
        }

        Ok(Self {
            solid_time_step,
            fluid_iterations_per_phase,
            subcycles_per_major_step,
            save_interval,
            end_time,
        })
    }

    /// Returns the physical time the solids advance per subcycle, in seconds.
    #[must_use]
    pub fn solid_time_step(&self) -> f64 {
        self.solid_time_step
    }

    /// Returns the steady iterations granted to each fluid phase.
    #[must_use]
    pub fn fluid_iterations_per_phase(&self) -> u64 {
        self.fluid_iterations_per_phase
    }

    /// Returns the number of subcycles in one major step.
    #[must_use]
    pub fn subcycles_per_major_step(&self) -> u32 {
        self.subcycles_per_major_step
    }

    /// Returns the physical time between checkpoints, in seconds.
    #[must_use]
    pub fn save_interval(&self) -> f64 {
        self.save_interval
    }

    /// Returns the physical time at which the run ends, in seconds.
    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Returns the physical time spanned by one full major step.
    #[must_use]
    pub fn major_step_duration(&self) -> f64 {
        f64::from(self.subcycles_per_major_step) * self.solid_time_step
    }

    /// Returns the number of solid steps an uninterrupted run from
    /// `initial_time` takes to reach the end time.
    #[must_use]
    pub fn planned_solid_steps(&self, initial_time: f64) -> u64 {
        let span = self.end_time - initial_time;
        if span <= 0.0 {
            return 0;
        }

        // The last step is snapped onto the end time, so a remainder within
        // the snap tolerance does not add a step.
        let steps = span / self.solid_time_step;
        let whole = steps.round();
        if (steps - whole).abs() <= crate::subcycle::TIME_EPSILON {
            whole as u64
        } else {
            steps.ceil() as u64
        }
    }
}
