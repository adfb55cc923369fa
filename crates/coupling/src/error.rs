use std::error::Error as StdError;

use thiserror::Error;

use crate::{ActiveGroup, ConfigError, Phase, RunSummary};

/// Errors that end a coupled run.
///
/// Every variant is fatal. Configuration problems are reported before any
/// phase runs; anything that goes wrong afterwards is wrapped in
/// [`Error::Aborted`] together with the progress made so far.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("continuum `{name}` not found")]
    ContinuumNotFound { name: String },

    #[error("stopping criterion `{name}` not found")]
    CriterionNotFound { name: String },

    #[error("cannot run the {phase} phase while {active} active")]
    ActivationConflict { phase: Phase, active: ActiveGroup },

    #[error("engine reported t = {reported} s after t = {previous} s")]
    TimeRegressed { previous: f64, reported: f64 },

    #[error("scheduler already aborted by an earlier failure")]
    AlreadyAborted,

    #[error("engine call failed")]
    Engine(#[source] Box<dyn StdError + Send + Sync>),

    #[error("run aborted at t = {time} s", time = .partial.final_time())]
    Aborted {
        partial: Box<RunSummary>,
        #[source]
        cause: Box<Error>,
    },
}

impl Error {
    pub(crate) fn engine<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Engine(Box::new(err))
    }

    pub(crate) fn aborted(self, partial: RunSummary) -> Self {
        Self::Aborted {
            partial: Box::new(partial),
            cause: Box::new(self),
        }
    }

    /// Returns the progress made before the run was aborted, if it started.
    #[must_use]
    pub fn partial(&self) -> Option<&RunSummary> {
        match self {
            Self::Aborted { partial, .. } => Some(&**partial),
            _ => None,
        }
    }

    /// Returns the underlying error, looking through [`Error::Aborted`].
    #[must_use]
    pub fn root(&self) -> &Error {
        match self {
            Self::Aborted { cause, .. } => cause.root(),
            other => other,
        }
    }
}
