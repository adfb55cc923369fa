use std::path::Path;

use crate::{CouplingPolicy, RunConfig, RunCounters, RunSummary};

/// Events emitted by the coupling scheduler.
///
/// Major steps are numbered from 1 and subcycles from 1 within their major
/// step. For one subcycle the order is always [`Event::FluidPhase`], then
/// [`Event::SolidPhase`], each followed by [`Event::SoftStop`] if that phase
/// ended short.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// Everything resolved; no phase has run yet.
    Initialized {
        config: &'a RunConfig,
        policy: &'a CouplingPolicy,

        /// Physical time read from the engine.
        initial_time: f64,

        /// Solid steps an uninterrupted run will take.
        planned_solid_steps: u64,
    },

    /// A major step is about to run its subcycles.
    MajorStepStarted {
        step: u64,
        start_time: f64,

        /// Where the step ends if every subcycle advances fully.
        target_time: f64,
    },

    /// The fluid phase of a subcycle finished.
    FluidPhase {
        step: u64,
        subcycle: u32,
        budget: u64,
        completed: u64,
    },

    /// The solid phase of a subcycle finished.
    SolidPhase {
        step: u64,
        subcycle: u32,
        from: f64,
        target: f64,
        reached: f64,
    },

    /// A phase ended before its budget or target; the run continues.
    SoftStop {
        step: u64,
        subcycle: u32,
        shortfall: Shortfall,
    },

    /// A checkpoint was written.
    Checkpoint {
        step: u64,
        time: f64,
        path: &'a Path,
    },

    /// A major step finished, after any checkpoint.
    ///
    /// This is the hook for interface heat-flux or temperature reports.
    MajorStepCompleted {
        step: u64,
        time: f64,
        counters: &'a RunCounters,
        next_save_time: f64,
    },

    /// The end time was reached.
    Completed { summary: &'a RunSummary },
}

/// What an interrupted phase fell short of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shortfall {
    Iterations { budget: u64, completed: u64 },
    Time { target: f64, reached: f64 },
}
