use std::{
    convert::Infallible,
    path::{Path, PathBuf},
};

use tandem_core::Engine;

use crate::RunConfig;

/// Stopping criterion handle of a [`DryRunEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DryRunCriterion;

/// An engine that performs no physics.
///
/// It knows a fixed set of continuum names, accepts any stopping-criterion
/// name, always consumes the full iteration budget, and always reaches the
/// requested time. Saves are recorded but nothing is written. Running the
/// scheduler against it previews the phase schedule and checkpoint files of
/// a real run.
#[derive(Debug, Clone)]
pub struct DryRunEngine {
    continua: Vec<(String, bool)>,
    time: f64,
    iteration: u64,
    iteration_limit: u64,
    time_limit: f64,
    session_dir: PathBuf,
    runs: u64,
    saved: Vec<PathBuf>,
}

impl DryRunEngine {
    /// Creates an engine at time zero knowing the given continuum names.
    pub fn new<I, S>(continua: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            continua: continua.into_iter().map(|n| (n.into(), false)).collect(),
            time: 0.0,
            iteration: 0,
            iteration_limit: 0,
            time_limit: 0.0,
            session_dir: PathBuf::from("."),
            runs: 0,
            saved: Vec::new(),
        }
    }

    /// Creates an engine knowing every continuum named in `config`.
    #[must_use]
    pub fn for_config(config: &RunConfig) -> Self {
        let names = &config.continua;
        Self::new(std::iter::once(&names.fluid).chain(&names.solids).cloned())
    }

    /// Starts the simulated clock at `time` instead of zero.
    #[must_use]
    pub fn with_start_time(mut self, time: f64) -> Self {
        self.time = time;
        self.time_limit = time;
        self
    }

    #[must_use]
    pub fn with_session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.session_dir = dir.into();
        self
    }

    /// Returns the number of `run()` calls made.
    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Returns the paths that would have been saved, in order.
    #[must_use]
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl Engine for DryRunEngine {
    type Continuum = usize;
    type StepCriterion = DryRunCriterion;
    type TimeCriterion = DryRunCriterion;
    type Error = Infallible;

    fn resolve_continuum(&self, name: &str) -> Result<Option<usize>, Infallible> {
        Ok(self.continua.iter().position(|(n, _)| n == name))
    }

    fn resolve_step_criterion(&self, _name: &str) -> Result<Option<DryRunCriterion>, Infallible> {
        Ok(Some(DryRunCriterion))
    }

    fn resolve_time_criterion(&self, _name: &str) -> Result<Option<DryRunCriterion>, Infallible> {
        Ok(Some(DryRunCriterion))
    }

    fn set_active(&mut self, continuum: &usize, active: bool) -> Result<(), Infallible> {
        if let Some((_, flag)) = self.continua.get_mut(*continuum) {
            *flag = active;
        }
        Ok(())
    }

    fn current_physical_time(&self) -> Result<f64, Infallible> {
        Ok(self.time)
    }

    fn iteration(&self) -> Result<u64, Infallible> {
        Ok(self.iteration)
    }

    fn increase_steady_iteration_budget(
        &mut self,
        _criterion: &DryRunCriterion,
        n: u64,
    ) -> Result<(), Infallible> {
        self.iteration_limit += n;
        Ok(())
    }

    fn set_time_advance_limit(
        &mut self,
        _criterion: &DryRunCriterion,
        time: f64,
    ) -> Result<(), Infallible> {
        self.time_limit = time;
        Ok(())
    }

    /// Stops at the first criterion met: pending iterations run first,
    /// otherwise time jumps to the limit.
    fn run(&mut self) -> Result<(), Infallible> {
        self.runs += 1;
        if self.iteration < self.iteration_limit {
            self.iteration = self.iteration_limit;
        } else if self.time < self.time_limit {
            self.time = self.time_limit;
        }
        Ok(())
    }

    fn session_dir(&self) -> PathBuf {
        self.session_dir.clone()
    }

    fn save_state(&mut self, path: &Path) -> Result<(), Infallible> {
        self.saved.push(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::run_unobserved;

    #[test]
    fn dry_run_previews_reference_schedule() {
        let config = RunConfig::default();
        let mut engine = DryRunEngine::for_config(&config).with_session_dir("/runs/cht");

        let summary = run_unobserved(&mut engine, &config).expect("dry run completes");

        assert_eq!(summary.counters().total_solid_steps(), 20_000);
        assert_eq!(engine.runs(), 40_000);
        assert_eq!(engine.saved().len(), 20);
        assert_eq!(
            engine.saved().last().unwrap(),
            &PathBuf::from("/runs/cht/CHT_partitioned_t2.00.sim")
        );
    }

    #[test]
    fn unknown_names_still_fail() {
        let mut config = RunConfig::default();
        let mut engine = DryRunEngine::for_config(&config);
        config.continua.fluid = "Water".to_owned();

        assert!(run_unobserved(&mut engine, &config).is_err());
        assert_eq!(engine.runs(), 0);
    }
}
