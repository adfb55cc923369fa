use std::fmt;

use tandem_core::Engine;
use tracing::debug;

use crate::{ActiveGroup, ContinuumSet, CriterionNames, Error};

/// The two kinds of engine run a subcycle is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Steady flow iterations with solids frozen.
    Fluid,

    /// Transient conduction with the flow field frozen.
    Solid,
}

impl Phase {
    fn required_group(self) -> ActiveGroup {
        match self {
            Self::Fluid => ActiveGroup::Fluid,
            Self::Solid => ActiveGroup::Solids,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fluid => "fluid",
            Self::Solid => "solid",
        })
    }
}

/// Runs single fluid or solid phases against the engine.
///
/// Holds the stopping criteria resolved at initialization. The fluid phase is
/// bounded by an iteration budget, since steady convergence is what matters
/// there; the solid phase is bounded by physical time.
pub struct PhaseRunner<E: Engine> {
    step_criterion: E::StepCriterion,
    time_criterion: E::TimeCriterion,
    end_time: f64,
}

impl<E: Engine> PhaseRunner<E> {
    /// Resolves both stopping criteria by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CriterionNotFound`] if either criterion is unknown to
    /// the engine, or [`Error::Engine`] if the lookup fails.
    pub fn resolve(engine: &E, names: &CriterionNames, end_time: f64) -> Result<Self, Error> {
        let step_criterion = engine
            .resolve_step_criterion(&names.step)
            .map_err(Error::engine)?
            .ok_or_else(|| Error::CriterionNotFound {
                name: names.step.clone(),
            })?;
        let time_criterion = engine
            .resolve_time_criterion(&names.time)
            .map_err(Error::engine)?
            .ok_or_else(|| Error::CriterionNotFound {
                name: names.time.clone(),
            })?;

        Ok(Self {
            step_criterion,
            time_criterion,
            end_time,
        })
    }

    /// Grants the fluid `budget` more steady iterations and runs the engine
    /// once, returning the iterations it actually completed.
    ///
    /// A result below `budget` signals an interrupted run and is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ActivationConflict`] unless the fluid alone is
    /// active, or [`Error::Engine`] if any engine call fails.
    pub fn run_fluid_phase(
        &self,
        engine: &mut E,
        continua: &ContinuumSet<E::Continuum>,
        budget: u64,
    ) -> Result<u64, Error> {
        let before = engine.iteration().map_err(Error::engine)?;
        engine
            .increase_steady_iteration_budget(&self.step_criterion, budget)
            .map_err(Error::engine)?;

        run_exclusive(engine, continua, Phase::Fluid)?;

        let after = engine.iteration().map_err(Error::engine)?;
        let completed = after.saturating_sub(before);
        debug!(budget, completed, "fluid phase finished");
        Ok(completed)
    }

    /// Lets the solids advance to `target_time`, capped at the end time, and
    /// returns the time the engine actually reached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ActivationConflict`] unless the solids alone are
    /// active, or [`Error::Engine`] if any engine call fails.
    pub fn run_solid_phase(
        &self,
        engine: &mut E,
        continua: &ContinuumSet<E::Continuum>,
        target_time: f64,
    ) -> Result<f64, Error> {
        let limit = target_time.min(self.end_time);
        engine
            .set_time_advance_limit(&self.time_criterion, limit)
            .map_err(Error::engine)?;

        run_exclusive(engine, continua, Phase::Solid)?;

        let reached = engine.current_physical_time().map_err(Error::engine)?;
        debug!(limit, reached, "solid phase finished");
        Ok(reached)
    }
}

fn run_exclusive<E: Engine>(
    engine: &mut E,
    continua: &ContinuumSet<E::Continuum>,
    phase: Phase,
) -> Result<(), Error> {
    debug_assert!(
        continua.is_exclusive(),
        "fluid and solids active during {phase} phase"
    );

    let active = continua.active_group();
    if active != phase.required_group() {
        return Err(Error::ActivationConflict { phase, active });
    }

    engine.run().map_err(Error::engine)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::{ContinuumNames, test_utils::MockEngine};

    fn setup(engine: &MockEngine) -> (PhaseRunner<MockEngine>, ContinuumSet<usize>) {
        let names = ContinuumNames {
            fluid: "Air".to_owned(),
            solids: vec!["Steel".to_owned()],
        };
        let runner = PhaseRunner::resolve(engine, &CriterionNames::default(), 1.0).unwrap();
        let continua = ContinuumSet::resolve(engine, &names).unwrap();
        (runner, continua)
    }

    #[test]
    fn fluid_phase_reports_completed_iterations() {
        let mut engine = MockEngine::new(["Air", "Steel"]);
        let (runner, mut continua) = setup(&engine);
        continua.set_active(&mut engine, true, false).unwrap();

        let completed = runner.run_fluid_phase(&mut engine, &continua, 25).unwrap();

        assert_eq!(completed, 25);
        assert_eq!(engine.iteration().unwrap(), 25);
        assert_eq!(engine.runs().len(), 1);
    }

    #[test]
    fn interrupted_fluid_phase_returns_partial_count() {
        let mut engine = MockEngine::new(["Air", "Steel"]).interrupt_fluid_run(1, 10);
        let (runner, mut continua) = setup(&engine);
        continua.set_active(&mut engine, true, false).unwrap();

        let completed = runner.run_fluid_phase(&mut engine, &continua, 25).unwrap();

        assert_eq!(completed, 10);
    }

    #[test]
    fn solid_phase_target_is_capped_at_end_time() {
        let mut engine = MockEngine::new(["Air", "Steel"]);
        let (runner, mut continua) = setup(&engine);
        continua.set_active(&mut engine, false, true).unwrap();

        let reached = runner.run_solid_phase(&mut engine, &continua, 1.5).unwrap();

        assert_relative_eq!(reached, 1.0);
    }

    #[test]
    fn phase_refuses_wrong_group() {
        let mut engine = MockEngine::new(["Air", "Steel"]);
        let (runner, mut continua) = setup(&engine);
        continua.set_active(&mut engine, false, true).unwrap();

        let err = runner.run_fluid_phase(&mut engine, &continua, 25).unwrap_err();

        assert!(matches!(
            err,
            Error::ActivationConflict {
                phase: Phase::Fluid,
                active: ActiveGroup::Solids,
            }
        ));
        assert!(engine.runs().is_empty());
    }

    #[test]
    fn missing_criterion_is_a_configuration_error() {
        let engine = MockEngine::new(["Air"]);
        let names = CriterionNames {
            step: "Maximum Iterations".to_owned(),
            ..CriterionNames::default()
        };

        let err = PhaseRunner::resolve(&engine, &names, 1.0).err().unwrap();

        assert!(matches!(err, Error::CriterionNotFound { name } if name == "Maximum Iterations"));
    }
}
