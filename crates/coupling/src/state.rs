use crate::{Error, RunCounters};

/// Physical time of a run, bounded above by the end time.
///
/// The clock only moves forward. The engine is the authority on where time
/// actually is, so [`SimulationClock::advance_to`] takes the engine's report
/// rather than the requested target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    time: f64,
    end_time: f64,
}

impl SimulationClock {
    #[must_use]
    pub fn new(time: f64, end_time: f64) -> Self {
        Self { time, end_time }
    }

    /// Returns the current physical time in seconds.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Returns `true` once the end time has been reached.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.time >= self.end_time
    }

    /// Moves the clock to the time reported by the engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TimeRegressed`] if `reported` is earlier than the
    /// current time, leaving the clock unchanged.
    pub(crate) fn advance_to(&mut self, reported: f64) -> Result<f64, Error> {
        if reported < self.time || reported.is_nan() {
            return Err(Error::TimeRegressed {
                previous: self.time,
                reported,
            });
        }
        self.time = reported;
        Ok(reported)
    }
}

/// All mutable state of a run, owned by the scheduler.
#[derive(Debug, Clone)]
pub struct RunState {
    initial_time: f64,
    pub(crate) clock: SimulationClock,
    pub(crate) counters: RunCounters,
    pub(crate) checkpoints: u64,
    pub(crate) soft_stops: u64,
}

impl RunState {
    pub(crate) fn new(initial_time: f64, end_time: f64) -> Self {
        Self {
            initial_time,
            clock: SimulationClock::new(initial_time, end_time),
            counters: RunCounters::default(),
            checkpoints: 0,
            soft_stops: 0,
        }
    }

    /// Returns the physical time the run started from.
    #[must_use]
    pub fn initial_time(&self) -> f64 {
        self.initial_time
    }

    #[must_use]
    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    #[must_use]
    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }

    /// Returns the number of checkpoints written so far.
    #[must_use]
    pub fn checkpoints(&self) -> u64 {
        self.checkpoints
    }

    /// Returns the number of phases that ended short of their target.
    #[must_use]
    pub fn soft_stops(&self) -> u64 {
        self.soft_stops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_accepts_forward_and_equal_times() {
        let mut clock = SimulationClock::new(0.0, 1.0);

        assert_eq!(clock.advance_to(0.25).unwrap(), 0.25);
        assert_eq!(clock.advance_to(0.25).unwrap(), 0.25);
        assert!(!clock.is_finished());

        clock.advance_to(1.0).unwrap();
        assert!(clock.is_finished());
    }

    #[test]
    fn clock_rejects_regression() {
        let mut clock = SimulationClock::new(0.5, 1.0);

        let err = clock.advance_to(0.4).unwrap_err();

        assert!(matches!(
            err,
            Error::TimeRegressed { previous, reported } if previous == 0.5 && reported == 0.4
        ));
        assert_eq!(clock.time(), 0.5);
        assert!(clock.advance_to(f64::NAN).is_err());
    }
}
