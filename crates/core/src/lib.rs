//! Core traits for Tandem, a partitioned fluid/solid coupling scheduler.
//!
//! This crate defines the two seams the scheduler is built against:
//!
//! - [`Engine`] — the external numerical simulation engine that owns the
//!   physics and exposes activation, stopping criteria, run, and save
//! - [`Observer`] — receives scheduler events for logging or diagnostics

mod engine;
mod observer;

pub use engine::Engine;
pub use observer::Observer;
