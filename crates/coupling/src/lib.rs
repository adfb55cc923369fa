//! Partitioned fluid/solid coupling for conjugate heat transfer.
//!
//! A fluid field that relaxes in microseconds and solids that conduct heat
//! over seconds cannot share one timestep efficiently. This crate alternates
//! between them instead: the fluid runs steady iterations with the solids
//! frozen, then the solids advance one large transient step with the flow
//! frozen, and so on until the end time.
//!
//! The numerical work belongs to an external engine reached through
//! [`tandem_core::Engine`]. This crate only schedules it:
//!
//! - [`ContinuumSet`] — resolved continua and their activation
//! - [`PhaseRunner`] — one fluid or one solid engine run
//! - [`SubcycleController`] — a fluid phase followed by a solid phase
//! - [`CouplingScheduler`] — major steps, checkpoints, and termination
//! - [`CheckpointManager`] / [`CheckpointSchedule`] — when and where to save
//! - [`RunReporter`] / [`RunSummary`] — counters and the final report
//!
//! # Example
//!
//! ```
//! use tandem_coupling::{DryRunEngine, RunConfig, run_unobserved};
//!
//! let config = RunConfig::from_toml_str(
//!     r#"
//!     [policy]
//!     end_time = 0.01
//!     solid_time_step = 1e-3
//!     save_interval = 0.005
//!     "#,
//! )?;
//! let mut engine = DryRunEngine::for_config(&config);
//!
//! let summary = run_unobserved(&mut engine, &config)?;
//!
//! assert_eq!(summary.counters().total_solid_steps(), 10);
//! assert_eq!(summary.counters().total_fluid_iterations(), 250);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod checkpoint;
mod config;
mod continuum;
mod dry_run;
mod error;
mod event;
mod phase;
mod policy;
mod report;
mod scheduler;
mod state;
mod subcycle;

#[cfg(test)]
mod test_utils;

pub use checkpoint::{CheckpointManager, CheckpointSchedule};
pub use config::{
    CheckpointSettings, ContinuumNames, CriterionNames, LoadError, PolicySettings, ReportSettings,
    RunConfig,
};
pub use continuum::{ActiveGroup, ContinuumRef, ContinuumSet};
pub use dry_run::{DryRunCriterion, DryRunEngine};
pub use error::Error;
pub use event::{Event, Shortfall};
pub use phase::{Phase, PhaseRunner};
pub use policy::{ConfigError, CouplingPolicy};
pub use report::{RunCounters, RunReporter, RunSummary};
pub use scheduler::{CouplingScheduler, Status, run, run_unobserved};
pub use state::{RunState, SimulationClock};
pub use subcycle::{SubcycleController, TIME_EPSILON};
