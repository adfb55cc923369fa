//! The partitioned coupling scheduler.
//!
//! # Algorithm
//!
//! The fluid field relaxes orders of magnitude faster than the solids
//! conduct heat, so instead of one globally coupled timestep the scheduler
//! alternates between the two fields, each solved with the other frozen:
//!
//! ```text
//! while t < end_time:
//!     major step k:
//!         repeat subcycles_per_major_step times (stop once t >= end_time):
//!             fluid only:  run fluid_iterations_per_phase steady iterations
//!             solids only: advance to min(t + solid_time_step, end_time)
//!         if t >= next_save_time or t >= end_time:
//!             save, next_save_time += save_interval
//! ```
//!
//! Reaching the end time is the only way a run finishes. There is no
//! iteration cap and no convergence-based exit. An operator interrupt inside
//! the engine surfaces as a short phase, which is recorded and tolerated.
//!
//! # Checkpoint policy
//!
//! At most one checkpoint is written per major step. If a single major step
//! crosses several `save_interval` boundaries, the schedule advances by one
//! interval and the other boundaries are not saved.
//!
//! # Observer Events
//!
//! See [`Event`] for the events emitted and their order.


use tandem_core::{Engine, Observer};
use tracing::{debug, info};

use crate::{
    CheckpointManager, CheckpointSchedule, ContinuumSet, CouplingPolicy, Error, Event,
    PhaseRunner, RunConfig, RunReporter, RunState, RunSummary, SubcycleController, TIME_EPSILON,
};

/// Lifecycle of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Resolved against the engine; no phase has run.
    Initializing,

    /// Advancing major steps.
    Running,

    /// Writing a checkpoint inside a major step.
    Checkpointing,

    /// The end time has been reached.
    Completed,

    /// A step failed. The scheduler will not call the engine again.
    Aborted,
}

impl Status {
    /// Returns `true` once no further step will run.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }
}

/// Drives a coupled run from its initial time to the end time.
pub struct CouplingScheduler<'a, E: Engine> {
    engine: &'a mut E,
    config: &'a RunConfig,
    policy: CouplingPolicy,
    continua: ContinuumSet<E::Continuum>,
    runner: PhaseRunner<E>,
    checkpoints: CheckpointManager,
    schedule: CheckpointSchedule,
    reporter: RunReporter,
    state: RunState,
    status: Status,
}

impl<'a, E: Engine> CouplingScheduler<'a, E> {
    /// Validates the configuration and resolves everything it names.
    ///
    /// No engine run happens here; if this fails the engine has only been
    /// queried.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid values,
    /// [`Error::ContinuumNotFound`] or [`Error::CriterionNotFound`] for
    /// unresolvable names, or [`Error::Engine`] if a lookup fails.
    pub fn initialize(engine: &'a mut E, config: &'a RunConfig) -> Result<Self, Error> {
        let policy = config.validate()?;
        let runner = PhaseRunner::resolve(engine, &config.criteria, policy.end_time())?;
        let continua = ContinuumSet::resolve(engine, &config.continua)?;

        let initial_time = engine.current_physical_time().map_err(Error::engine)?;
        let checkpoints = CheckpointManager::from_settings(&config.checkpoint, engine);
        let schedule = CheckpointSchedule::new(
            initial_time,
            policy.save_interval(),
            TIME_EPSILON * policy.solid_time_step(),
        );
        let reporter = RunReporter::new(
            policy.solid_time_step(),
            config.report.reference_time_step,
        );

        debug!(
            initial_time,
            end_time = policy.end_time(),
            solids = continua.solids().len(),
            "coupling scheduler initialized"
        );

        Ok(Self {
            engine,
            config,
            policy,
            continua,
            runner,
            checkpoints,
            schedule,
            reporter,
            state: RunState::new(initial_time, policy.end_time()),
            status: Status::Initializing,
        })
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn policy(&self) -> &CouplingPolicy {
        &self.policy
    }

    #[must_use]
    pub fn state(&self) -> &RunState {
        &self.state
    }

    #[must_use]
    pub fn continua(&self) -> &ContinuumSet<E::Continuum> {
        &self.continua
    }

    #[must_use]
    pub fn schedule(&self) -> &CheckpointSchedule {
        &self.schedule
    }

    /// Returns a summary of the progress so far.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        self.reporter.summarize(&self.state)
    }

    /// Runs one major step and returns the resulting status.
    ///
    /// The first call also emits [`Event::Initialized`]. Once the status is
    /// terminal further calls return it without touching the engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Aborted`], carrying the partial summary, if anything
    /// fails during the step. The status becomes [`Status::Aborted`].
    pub fn step<Obs>(&mut self, observer: &mut Obs) -> Result<Status, Error>
    where
        Obs: for<'e> Observer<Event<'e>>,
    {
        if self.status == Status::Initializing {
            self.start(observer);
        }
        if self.status != Status::Running {
            return Ok(self.status);
        }

        if let Err(err) = self.major_step(observer) {
            self.status = Status::Aborted;
            return Err(err.aborted(self.summary()));
        }
        Ok(self.status)
    }

    /// Runs major steps until the end time and returns the final summary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Aborted`], carrying the partial summary, on the first
    /// failure. No full summary is emitted in that case.
    pub fn run_to_end<Obs>(mut self, mut observer: Obs) -> Result<RunSummary, Error>
    where
        Obs: for<'e> Observer<Event<'e>>,
    {
        let status = loop {
            let status = self.step(&mut observer)?;
            if status.is_terminal() {
                break status;
            }
        };
        if status == Status::Aborted {
            return Err(Error::AlreadyAborted.aborted(self.summary()));
        }

        let summary = self.summary();
        info!(
            simulated = summary.total_simulated_time(),
            solid_steps = summary.counters().total_solid_steps(),
            "coupled run complete"
        );
        observer.observe(&Event::Completed { summary: &summary });
        Ok(summary)
    }

    fn start<Obs>(&mut self, observer: &mut Obs)
    where
        Obs: for<'e> Observer<Event<'e>>,
    {
        let initial_time = self.state.initial_time();
        observer.observe(&Event::Initialized {
            config: self.config,
            policy: &self.policy,
            initial_time,
            planned_solid_steps: self.policy.planned_solid_steps(initial_time),
        });

        self.status = if self.state.clock.is_finished() {
            Status::Completed
        } else {
            Status::Running
        };
    }

    fn major_step<Obs>(&mut self, observer: &mut Obs) -> Result<(), Error>
    where
        Obs: for<'e> Observer<Event<'e>>,
    {
        let end_time = self.policy.end_time();
        let step = self.state.counters.next_major_step();
        let start_time = self.state.clock.time();
        let target_time = (start_time + self.policy.major_step_duration()).min(end_time);

        observer.observe(&Event::MajorStepStarted {
            step,
            start_time,
            target_time,
        });

        let controller = SubcycleController::new(&self.policy, &self.runner);
        for subcycle in 1..=self.policy.subcycles_per_major_step() {
            controller.run_one_subcycle(
                &mut *self.engine,
                &mut self.continua,
                &mut self.state,
                subcycle,
                observer,
            )?;
            if self.state.clock.is_finished() {
                break;
            }
        }

        let time = self.state.clock.time();
        if self.schedule.is_due(time, end_time) {
            self.status = Status::Checkpointing;
            let path = self.checkpoints.save(&mut *self.engine, time)?;
            self.state.checkpoints += 1;
            self.schedule.advance();
            observer.observe(&Event::Checkpoint {
                step,
                time,
                path: &path,
            });
            self.status = Status::Running;
        }

        observer.observe(&Event::MajorStepCompleted {
            step,
            time,
            counters: &self.state.counters,
            next_save_time: self.schedule.next_save_time(),
        });

        if self.state.clock.is_finished() {
            self.status = Status::Completed;
        }
        Ok(())
    }
}

/// Runs a coupled simulation from the engine's current time to the end time.
///
/// # Errors
///
/// Returns an error if initialization fails (before any engine run) or if the
/// run aborts (see [`Error::Aborted`]).
pub fn run<E, Obs>(engine: &mut E, config: &RunConfig, observer: Obs) -> Result<RunSummary, Error>
where
    E: Engine,
    Obs: for<'e> Observer<Event<'e>>,
{
    CouplingScheduler::initialize(engine, config)?.run_to_end(observer)
}

/// Runs a coupled simulation without observation.
///
/// This is a convenience wrapper around [`run`] that discards events.
///
/// # Errors
///
/// Returns the same errors as [`run`].
pub fn run_unobserved<E: Engine>(engine: &mut E, config: &RunConfig) -> Result<RunSummary, Error> {
    run(engine, config, ())
}
