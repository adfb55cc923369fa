//! Progress narration through `tracing`.

use tandem_core::Observer;
use tandem_coupling::{Event, RunReporter, Shortfall};
use tracing::{debug, info};

/// Narrates a coupled run as `tracing` events.
///
/// The configuration banner, major step headers, checkpoints, and the final
/// summary are logged at `INFO`. Individual fluid and solid phases are
/// logged at `DEBUG`, since a reference run has tens of thousands of them.
///
/// ```
/// use tandem_coupling::{DryRunEngine, RunConfig, run};
/// use tandem_observers::LogObserver;
///
/// let config = RunConfig::default();
/// let mut engine = DryRunEngine::for_config(&config);
/// let summary = run(&mut engine, &config, LogObserver::new().progress_every(1000))?;
///
/// assert_eq!(summary.checkpoints(), 20);
/// # Ok::<(), tandem_coupling::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogObserver {
    progress_every: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Info,
    Detail,
}

impl Default for LogObserver {
    fn default() -> Self {
        Self { progress_every: 1 }
    }
}

impl LogObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs the header of every `n`th major step only (the first step is
    /// always logged). Zero is treated as one.
    #[must_use]
    pub fn progress_every(mut self, n: u64) -> Self {
        self.progress_every = n.max(1);
        self
    }

    fn lines(&self, event: &Event<'_>) -> Vec<(Level, String)> {
        match *event {
            Event::Initialized {
                config,
                policy,
                initial_time,
                planned_solid_steps,
            } => {
                let reference = config.report.reference_time_step;
                let speedup =
                    RunReporter::new(policy.solid_time_step(), reference).speedup();
                let mut lines = vec![
                    (Level::Info, "PARTITIONED CHT SOLVER".to_owned()),
                    (Level::Info, "Configuration:".to_owned()),
                    (
                        Level::Info,
                        format!("  - End time: {} s", policy.end_time()),
                    ),
                    (
                        Level::Info,
                        format!(
                            "  - Solid timestep: {} s (vs {reference} for fully coupled)",
                            policy.solid_time_step()
                        ),
                    ),
                    (
                        Level::Info,
                        format!(
                            "  - Fluid iterations per solve: {}",
                            policy.fluid_iterations_per_phase()
                        ),
                    ),
                    (
                        Level::Info,
                        format!(
                            "  - Subcycles per timestep: {}",
                            policy.subcycles_per_major_step()
                        ),
                    ),
                    (
                        Level::Info,
                        format!("  - Effective speedup: ~{}x", speedup.round() as u64),
                    ),
                    (
                        Level::Info,
                        format!("  - Starting from t = {initial_time} s"),
                    ),
                    (
                        Level::Info,
                        format!("  - Planned solid timesteps: {planned_solid_steps}"),
                    ),
                ];
                let names = &config.continua;
                lines.extend(
                    std::iter::once(&names.fluid)
                        .chain(&names.solids)
                        .map(|name| (Level::Detail, format!("  Found continuum: {name}"))),
                );
                lines
            }

            Event::MajorStepStarted {
                step,
                start_time,
                target_time,
            } => {
                if step != 1 && step % self.progress_every != 0 {
                    return Vec::new();
                }
                vec![(
                    Level::Info,
                    format!("--- Major Step {step}: t = {start_time:.4} -> {target_time:.4} s ---"),
                )]
            }

            Event::FluidPhase {
                subcycle,
                budget,
                completed,
                ..
            } => vec![(
                Level::Detail,
                format!("  [Fluid {subcycle}] Converged flow field ({completed}/{budget} iterations)"),
            )],

            Event::SolidPhase {
                subcycle,
                from,
                reached,
                ..
            } => vec![(
                Level::Detail,
                format!("  [Solid {subcycle}] Advanced thermal solution: {from:.4} -> {reached:.4} s"),
            )],

            Event::SoftStop {
                step,
                subcycle,
                shortfall,
            } => {
                let what = match shortfall {
                    Shortfall::Iterations { budget, completed } => {
                        format!("fluid stopped after {completed} of {budget} iterations")
                    }
                    Shortfall::Time { target, reached } => {
                        format!("solid stopped at {reached:.4} s short of {target:.4} s")
                    }
                };
                vec![(
                    Level::Detail,
                    format!("  [Step {step}.{subcycle}] Interrupted: {what}"),
                )]
            }

            Event::Checkpoint { time, path, .. } => vec![(
                Level::Info,
                format!(">>> Saving simulation at t = {time:.4} s ({})", path.display()),
            )],

            Event::MajorStepCompleted {
                step,
                time,
                counters,
                next_save_time,
            } => vec![(
                Level::Detail,
                format!(
                    "  Step {step} done at t = {time:.4} s: {} fluid iterations, {} solid steps, next save at {next_save_time:.4} s",
                    counters.total_fluid_iterations(),
                    counters.total_solid_steps()
                ),
            )],

            Event::Completed { summary } => {
                std::iter::once((Level::Info, "SIMULATION COMPLETE".to_owned()))
                    .chain(
                        summary
                            .to_string()
                            .lines()
                            .map(|line| (Level::Info, line.to_owned())),
                    )
                    .collect()
            }
        }
    }
}

impl<'e> Observer<Event<'e>> for LogObserver {
    fn observe(&mut self, event: &Event<'e>) {
        for (level, line) in self.lines(event) {
            match level {
                Level::Info => info!("{line}"),
                Level::Detail => debug!("{line}"),
            }
        }
    }
}

/// Allows `&mut LogObserver` to be passed where an observer is taken by value.
impl<'e> Observer<Event<'e>> for &mut LogObserver {
    fn observe(&mut self, event: &Event<'e>) {
        (**self).observe(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;

    use tandem_coupling::{CouplingPolicy, RunConfig};

    fn info_lines(observer: &LogObserver, event: &Event<'_>) -> Vec<String> {
        observer
            .lines(event)
            .into_iter()
            .filter(|(level, _)| *level == Level::Info)
            .map(|(_, line)| line)
            .collect()
    }

    #[test]
    fn banner_describes_configuration() {
        let config = RunConfig::default();
        let policy = CouplingPolicy::default();
        let event = Event::Initialized {
            config: &config,
            policy: &policy,
            initial_time: 0.0,
            planned_solid_steps: 20_000,
        };

        let lines = info_lines(&LogObserver::new(), &event);

        assert!(lines.contains(&"  - End time: 2 s".to_owned()));
        assert!(lines.contains(&"  - Effective speedup: ~500x".to_owned()));
        assert!(lines.contains(&"  - Planned solid timesteps: 20000".to_owned()));

        let found = LogObserver::new()
            .lines(&event)
            .into_iter()
            .filter(|(level, _)| *level == Level::Detail)
            .count();
        assert_eq!(found, 6);
    }

    #[test]
    fn step_headers_respect_progress_interval() {
        let observer = LogObserver::new().progress_every(100);
        let header = |step: u64| Event::MajorStepStarted {
            step,
            start_time: 0.0002 * (step - 1) as f64,
            target_time: 0.0002 * step as f64,
        };

        assert_eq!(
            info_lines(&observer, &header(1)),
            vec!["--- Major Step 1: t = 0.0000 -> 0.0002 s ---".to_owned()]
        );
        assert!(info_lines(&observer, &header(2)).is_empty());
        assert_eq!(info_lines(&observer, &header(200)).len(), 1);
    }

    #[test]
    fn zero_interval_logs_every_step() {
        let observer = LogObserver::new().progress_every(0);
        let header = Event::MajorStepStarted {
            step: 7,
            start_time: 0.0,
            target_time: 0.1,
        };

        assert_eq!(info_lines(&observer, &header).len(), 1);
    }

    #[test]
    fn phases_are_detail_only() {
        let observer = LogObserver::new();
        let fluid = Event::FluidPhase {
            step: 1,
            subcycle: 2,
            budget: 25,
            completed: 25,
        };
        let solid = Event::SolidPhase {
            step: 1,
            subcycle: 2,
            from: 0.1,
            target: 0.1001,
            reached: 0.1001,
        };

        assert!(info_lines(&observer, &fluid).is_empty());
        assert_eq!(
            observer.lines(&solid),
            vec![(
                Level::Detail,
                "  [Solid 2] Advanced thermal solution: 0.1000 -> 0.1001 s".to_owned()
            )]
        );
    }

    #[test]
    fn checkpoint_line_names_the_file() {
        let event = Event::Checkpoint {
            step: 500,
            time: 0.1,
            path: Path::new("/session/CHT_partitioned_t0.10.sim"),
        };

        assert_eq!(
            info_lines(&LogObserver::new(), &event),
            vec![
                ">>> Saving simulation at t = 0.1000 s (/session/CHT_partitioned_t0.10.sim)"
                    .to_owned()
            ]
        );
    }

    #[test]
    fn soft_stop_names_the_shortfall() {
        let event = Event::SoftStop {
            step: 3,
            subcycle: 1,
            shortfall: Shortfall::Iterations {
                budget: 25,
                completed: 12,
            },
        };

        let lines = LogObserver::new().lines(&event);

        assert_eq!(lines.len(), 1);
        assert!(lines[0].1.contains("fluid stopped after 12 of 25 iterations"));
    }
}
