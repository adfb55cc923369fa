//! Tandem - validates and previews partitioned coupling runs
//!
//! `check` loads a configuration and reports the schedule it implies.
//! `dry-run` drives the full scheduler against an engine that performs no
//! physics, listing the major steps and checkpoint files a real run would
//! produce.

use std::{error::Error as StdError, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use tandem_coupling::{DryRunEngine, RunConfig, RunReporter, run};
use tandem_observers::{LogObserver, StepHistory};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "tandem=info,tandem_coupling=info,tandem_observers=info";

#[derive(Parser, Debug)]
#[command(name = "tandem")]
#[command(about = "Validate and preview partitioned fluid/solid coupling runs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a configuration and print the schedule it implies
    Check {
        /// Path to a TOML run configuration
        config: PathBuf,
    },

    /// Run the scheduler against a no-op engine
    DryRun {
        /// Path to a TOML run configuration
        config: PathBuf,

        /// Directory checkpoints would be written to, if not configured
        #[arg(long, default_value = ".")]
        session_dir: PathBuf,

        /// Physical time the engine starts at
        #[arg(long, default_value = "0.0")]
        start_time: f64,

        /// Log every Nth major step header
        #[arg(long, default_value = "100")]
        progress_every: u64,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check { config } => check(config),
        Command::DryRun {
            config,
            session_dir,
            start_time,
            progress_every,
        } => dry_run(config, session_dir, start_time, progress_every),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            for line in failure_report(&*err) {
                error!("{line}");
            }
            ExitCode::FAILURE
        }
    }
}

fn check(path: PathBuf) -> Result<(), Box<dyn StdError>> {
    info!("Loading configuration from: {}", path.display());
    let config = RunConfig::from_path(&path)?;
    let policy = config.validate()?;
    let speedup = RunReporter::new(policy.solid_time_step(), config.report.reference_time_step)
        .speedup();

    info!("Configuration is valid");
    info!("  - Fluid: {}", config.continua.fluid);
    info!("  - Solids: {}", config.continua.solids.join(", "));
    info!("  - End time: {} s", policy.end_time());
    info!("  - Solid timestep: {} s", policy.solid_time_step());
    info!(
        "  - Major step: {} subcycles, {} s",
        policy.subcycles_per_major_step(),
        policy.major_step_duration()
    );
    info!(
        "  - Fluid iterations per phase: {}",
        policy.fluid_iterations_per_phase()
    );
    info!("  - Save interval: {} s", policy.save_interval());
    info!(
        "  - Planned solid timesteps from t = 0: {}",
        policy.planned_solid_steps(0.0)
    );
    info!("  - Effective speedup: ~{}x", speedup.round() as u64);
    Ok(())
}

fn dry_run(
    path: PathBuf,
    session_dir: PathBuf,
    start_time: f64,
    progress_every: u64,
) -> Result<(), Box<dyn StdError>> {
    info!("Loading configuration from: {}", path.display());
    let config = RunConfig::from_path(&path)?;

    let mut engine = DryRunEngine::for_config(&config)
        .with_session_dir(session_dir)
        .with_start_time(start_time);
    let mut log = LogObserver::new().progress_every(progress_every);
    let mut history = StepHistory::new();

    run(&mut engine, &config, (&mut log, &mut history))?;

    info!("Engine runs: {}", engine.runs());
    for checkpoint in history.checkpoints() {
        info!("  would save {}", checkpoint.path.display());
    }
    Ok(())
}

/// The error chain, followed by the progress made if the run had started.
fn failure_report(err: &(dyn StdError + 'static)) -> Vec<String> {
    let mut lines = vec![report(err)];
    if let Some(partial) = err
        .downcast_ref::<tandem_coupling::Error>()
        .and_then(tandem_coupling::Error::partial)
    {
        lines.push("Progress before the failure:".to_owned());
        lines.extend(partial.to_string().lines().map(str::to_owned));
    }
    lines
}

/// Joins an error and its sources into one line.
fn report(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
