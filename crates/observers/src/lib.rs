//! Reusable observers for partitioned coupling runs.
//!
//! - [`LogObserver`] narrates a run through `tracing`
//! - [`StepHistory`] records the state at the end of every major step
//!
//! Both implement [`Observer`] for `Self` and for `&mut Self`, so a caller
//! can keep ownership and inspect them after the run.
//!
//! [`Observer`]: tandem_core::Observer

mod history;
mod log;

pub use history::{CheckpointRecord, StepHistory, StepRecord};
pub use log::LogObserver;
