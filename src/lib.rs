//! Boostr - keeps HeadHunter resumes at the top of search results
//!
//! Boostr continuously discovers resumes, filters them through an allow/deny
//! policy and boosts each one on a fixed cadence. Boosts are serialized
//! process-wide while every resume waits on its own timer.

pub mod config;
pub mod context;
pub mod discovery;
pub mod domain;
pub mod eligibility;
pub mod error;
pub mod remote;
pub mod runner;
pub mod scheduler;

pub use error::{BoostError, Result};
