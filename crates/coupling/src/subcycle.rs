use tandem_core::{Engine, Observer};
use tracing::warn;

use crate::{
    ContinuumSet, CouplingPolicy, Error, Event, PhaseRunner, RunState, Shortfall,
};

/// Relative tolerance, in units of the solid time step, for comparing times.
///
/// A solid target closer than this to the end time is snapped onto it, so
/// accumulated rounding never leaves a sliver step at the end of a run.
pub const TIME_EPSILON: f64 = 1e-6;

/// Runs one fluid phase followed by one solid phase.
pub struct SubcycleController<'a, E: Engine> {
    policy: &'a CouplingPolicy,
    runner: &'a PhaseRunner<E>,
}

impl<'a, E: Engine> SubcycleController<'a, E> {
    #[must_use]
    pub fn new(policy: &'a CouplingPolicy, runner: &'a PhaseRunner<E>) -> Self {
        Self { policy, runner }
    }

    /// Returns the solid target for a subcycle starting at `time`.
    #[must_use]
    pub fn solid_target(&self, time: f64) -> f64 {
        let dt = self.policy.solid_time_step();
        let end = self.policy.end_time();
        let target = (time + dt).min(end);
        if end - target <= TIME_EPSILON * dt {
            end
        } else {
            target
        }
    }

    /// Runs one subcycle and returns the new physical time.
    ///
    /// The fluid runs alone with the solids frozen, then the solids run alone
    /// with the converged flow frozen. Counters are updated after each phase
    /// completes, with whatever the engine actually achieved.
    ///
    /// # Errors
    ///
    /// Returns an error if an engine call fails, a phase finds the wrong
    /// continua active, or the engine reports time going backwards.
    pub fn run_one_subcycle<Obs>(
        &self,
        engine: &mut E,
        continua: &mut ContinuumSet<E::Continuum>,
        state: &mut RunState,
        subcycle: u32,
        observer: &mut Obs,
    ) -> Result<f64, Error>
    where
        Obs: for<'e> Observer<Event<'e>>,
    {
        let step = state.counters.major_step_index();

        // Fluid phase.
        let budget = self.policy.fluid_iterations_per_phase();
        continua.set_active(engine, true, false)?;
        let completed = self.runner.run_fluid_phase(engine, continua, budget)?;
        state.counters.add_fluid_iterations(completed);

        observer.observe(&Event::FluidPhase {
            step,
            subcycle,
            budget,
            completed,
        });
        if completed < budget {
            warn!(step, subcycle, budget, completed, "fluid phase stopped early");
            state.soft_stops += 1;
            observer.observe(&Event::SoftStop {
                step,
                subcycle,
                shortfall: Shortfall::Iterations { budget, completed },
            });
        }

        // Solid phase.
        let from = state.clock.time();
        let target = self.solid_target(from);
        continua.set_active(engine, false, true)?;
        let reported = self.runner.run_solid_phase(engine, continua, target)?;
        let reached = state.clock.advance_to(reported)?;
        state.counters.add_solid_step();

        observer.observe(&Event::SolidPhase {
            step,
            subcycle,
            from,
            target,
            reached,
        });

        let tolerance = TIME_EPSILON * self.policy.solid_time_step();
        if target - reached > tolerance {
            warn!(step, subcycle, target, reached, "solid phase stopped early");
            state.soft_stops += 1;
            observer.observe(&Event::SoftStop {
                step,
                subcycle,
                shortfall: Shortfall::Time { target, reached },
            });
        } else if reached - state.clock.end_time() > tolerance {
            warn!(
                reached,
                end_time = state.clock.end_time(),
                "engine advanced past the end time"
            );
        }

        Ok(reached)
    }
}
