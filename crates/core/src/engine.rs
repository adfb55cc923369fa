use std::path::{Path, PathBuf};

/// The narrow interface to an external numerical simulation engine.
///
/// The engine owns the physics: flow iterations, transient conduction, mesh,
/// boundary conditions, and the saved-state format. A coupling scheduler only
/// toggles which continua are active, moves the engine's stopping criteria,
/// and asks it to run.
///
/// Lookups by name happen once, at initialization, and produce typed handles
/// (`Continuum`, `StepCriterion`, `TimeCriterion`) that every later call
/// takes by reference. A lookup that finds nothing returns `Ok(None)`; an
/// `Err` is reserved for the engine itself failing.
///
/// Every method that advances the simulation blocks until the engine has
/// finished. An operator interrupt during [`Engine::run`] is not an error: it
/// shows up as a smaller [`Engine::iteration`] delta or an earlier
/// [`Engine::current_physical_time`] than requested.
pub trait Engine {
    /// Handle to one resolved physics continuum.
    type Continuum;

    /// Handle to the stopping criterion that bounds steady iterations.
    type StepCriterion;

    /// Handle to the stopping criterion that bounds physical time.
    type TimeCriterion;

    type Error: std::error::Error + Send + Sync + 'static;

    /// Looks up a continuum by its stable name.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the engine fails while searching.
    fn resolve_continuum(&self, name: &str) -> Result<Option<Self::Continuum>, Self::Error>;

    /// Looks up the iteration-count stopping criterion by name.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the engine fails while searching.
    fn resolve_step_criterion(&self, name: &str)
    -> Result<Option<Self::StepCriterion>, Self::Error>;

    /// Looks up the physical-time stopping criterion by name.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the engine fails while searching.
    fn resolve_time_criterion(&self, name: &str)
    -> Result<Option<Self::TimeCriterion>, Self::Error>;

    /// Enables or disables one continuum for subsequent runs.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the engine rejects the change.
    fn set_active(&mut self, continuum: &Self::Continuum, active: bool) -> Result<(), Self::Error>;

    /// Returns the current simulated physical time in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the time cannot be read.
    fn current_physical_time(&self) -> Result<f64, Self::Error>;

    /// Returns the engine's cumulative iteration counter.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the counter cannot be read.
    fn iteration(&self) -> Result<u64, Self::Error>;

    /// Raises the steady-iteration limit of `criterion` by `n` iterations.
    ///
    /// The limit is cumulative. Iterations an interrupted run left unused
    /// stay owed and are spent by whichever run comes next.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the limit cannot be changed.
    fn increase_steady_iteration_budget(
        &mut self,
        criterion: &Self::StepCriterion,
        n: u64,
    ) -> Result<(), Self::Error>;

    /// Sets the physical time at which `criterion` stops the next run.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the limit cannot be changed.
    fn set_time_advance_limit(
        &mut self,
        criterion: &Self::TimeCriterion,
        time: f64,
    ) -> Result<(), Self::Error>;

    /// Runs the active continua until the first stopping criterion is met.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the solve fails. The resulting engine state
    /// is ambiguous and callers should not resume from it.
    fn run(&mut self) -> Result<(), Self::Error>;

    /// Returns the directory the engine considers its working session.
    fn session_dir(&self) -> PathBuf;

    /// Persists the full simulation state to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the state cannot be written.
    fn save_state(&mut self, path: &Path) -> Result<(), Self::Error>;
}
