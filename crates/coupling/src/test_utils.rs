use std::path::{Path, PathBuf};

use tandem_core::Engine;
use thiserror::Error;

use crate::RunConfig;

#[derive(Debug, Error)]
pub(crate) enum MockError {
    #[error("solver diverged on run {0}")]
    Diverged(usize),

    #[error("disk full")]
    DiskFull,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct StepLimit;

#[derive(Debug, Clone, Copy)]
pub(crate) struct TimeLimit;

/// Engine state seen at the start of one `run()` call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RunRecord {
    /// Flags in registration order; the first continuum is the fluid.
    pub(crate) active: Vec<bool>,
    pub(crate) time: f64,
    pub(crate) iteration: u64,
}

impl RunRecord {
    pub(crate) fn fluid_active(&self) -> bool {
        self.active[0]
    }

    pub(crate) fn any_solid_active(&self) -> bool {
        self.active[1..].iter().any(|a| *a)
    }

    pub(crate) fn all_solids_active(&self) -> bool {
        self.active[1..].iter().all(|a| *a)
    }
}

/// A scriptable in-memory engine that records every interaction.
///
/// A run consumes iterations up to the step limit if any remain (a fluid
/// run), otherwise advances time to the time limit (a solid run).
#[derive(Debug)]
pub(crate) struct MockEngine {
    names: Vec<String>,
    active: Vec<bool>,
    time: f64,
    iteration: u64,
    iteration_limit: u64,
    time_limit: f64,
    fluid_runs: usize,
    solid_runs: usize,
    runs: Vec<RunRecord>,
    saved: Vec<PathBuf>,
    fluid_interrupt: Option<(usize, u64)>,
    solid_interrupt: Option<(usize, f64)>,
    regress_on_solid_run: Option<usize>,
    fail_on_run: Option<usize>,
    fail_saves: bool,
}

impl MockEngine {
    pub(crate) fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        Self {
            active: vec![false; names.len()],
            names,
            time: 0.0,
            iteration: 0,
            iteration_limit: 0,
            time_limit: 0.0,
            fluid_runs: 0,
            solid_runs: 0,
            runs: Vec::new(),
            saved: Vec::new(),
            fluid_interrupt: None,
            solid_interrupt: None,
            regress_on_solid_run: None,
            fail_on_run: None,
            fail_saves: false,
        }
    }

    /// Registers the fluid first, then the solids, as named in `config`.
    pub(crate) fn for_config(config: &RunConfig) -> Self {
        let continua = &config.continua;
        Self::new(std::iter::once(&continua.fluid).chain(&continua.solids).cloned())
    }

    pub(crate) fn starting_at(mut self, time: f64) -> Self {
        self.time = time;
        self.time_limit = time;
        self
    }

    /// The `n`th fluid run (1-based) completes only `completed` iterations.
    pub(crate) fn interrupt_fluid_run(mut self, n: usize, completed: u64) -> Self {
        self.fluid_interrupt = Some((n, completed));
        self
    }

    /// The `n`th solid run (1-based) covers only `fraction` of its interval.
    pub(crate) fn interrupt_solid_run(mut self, n: usize, fraction: f64) -> Self {
        self.solid_interrupt = Some((n, fraction));
        self
    }

    /// The `n`th solid run (1-based) reports a time earlier than it started.
    pub(crate) fn regress_on_solid_run(mut self, n: usize) -> Self {
        self.regress_on_solid_run = Some(n);
        self
    }

    /// The `n`th run (1-based, any kind) fails.
    pub(crate) fn fail_on_run(mut self, n: usize) -> Self {
        self.fail_on_run = Some(n);
        self
    }

    pub(crate) fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    pub(crate) fn active_flags(&self) -> Vec<bool> {
        self.active.clone()
    }

    /// Every `run()` call made, including one that failed.
    pub(crate) fn runs(&self) -> &[RunRecord] {
        &self.runs
    }

    pub(crate) fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    pub(crate) fn time(&self) -> f64 {
        self.time
    }
}

impl Engine for MockEngine {
    type Continuum = usize;
    type StepCriterion = StepLimit;
    type TimeCriterion = TimeLimit;
    type Error = MockError;

    fn resolve_continuum(&self, name: &str) -> Result<Option<usize>, MockError> {
        Ok(self.names.iter().position(|n| n == name))
    }

    fn resolve_step_criterion(&self, name: &str) -> Result<Option<StepLimit>, MockError> {
        Ok((name == "Maximum Steps").then_some(StepLimit))
    }

    fn resolve_time_criterion(&self, name: &str) -> Result<Option<TimeLimit>, MockError> {
        Ok((name == "Maximum Physical Time").then_some(TimeLimit))
    }

    fn set_active(&mut self, continuum: &usize, active: bool) -> Result<(), MockError> {
        self.active[*continuum] = active;
        Ok(())
    }

    fn current_physical_time(&self) -> Result<f64, MockError> {
        Ok(self.time)
    }

    fn iteration(&self) -> Result<u64, MockError> {
        Ok(self.iteration)
    }

    fn increase_steady_iteration_budget(
        &mut self,
        _criterion: &StepLimit,
        n: u64,
    ) -> Result<(), MockError> {
        self.iteration_limit += n;
        Ok(())
    }

    fn set_time_advance_limit(&mut self, _criterion: &TimeLimit, time: f64) -> Result<(), MockError> {
        self.time_limit = time;
        Ok(())
    }

    fn run(&mut self) -> Result<(), MockError> {
        self.runs.push(RunRecord {
            active: self.active.clone(),
            time: self.time,
            iteration: self.iteration,
        });

        let n = self.runs.len();
        if self.fail_on_run == Some(n) {
            return Err(MockError::Diverged(n));
        }

        if self.iteration < self.iteration_limit {
            self.fluid_runs += 1;
            let remaining = self.iteration_limit - self.iteration;
            self.iteration += match self.fluid_interrupt {
                Some((k, completed)) if k == self.fluid_runs => completed.min(remaining),
                _ => remaining,
            };
        } else if self.time < self.time_limit {
            self.solid_runs += 1;
            if self.regress_on_solid_run == Some(self.solid_runs) {
                self.time -= 1e-3;
                return Ok(());
            }
            self.time = match self.solid_interrupt {
                Some((k, fraction)) if k == self.solid_runs => {
                    self.time + fraction * (self.time_limit - self.time)
                }
                _ => self.time_limit,
            };
        }
        Ok(())
    }

    fn session_dir(&self) -> PathBuf {
        PathBuf::from("/session")
    }

    fn save_state(&mut self, path: &Path) -> Result<(), MockError> {
        if self.fail_saves {
            return Err(MockError::DiskFull);
        }
        self.saved.push(path.to_path_buf());
        Ok(())
    }
}
