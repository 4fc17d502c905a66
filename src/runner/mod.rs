//! Runner module - ties discovery and the scheduler together.
//!
//! - run: the single blocking entry point
//! - RunSummary / RunOutcome: what happened

mod boost_runner;

pub use boost_runner::{RunOutcome, RunSummary, run};
