//! Scheduler module for per-item boost loops.
//!
//! This module provides:
//! - **BoostScheduler**: de-duplicates items and spawns one refresh loop per item.
//! - **Refresh loop**: waits until an item is due, boosts it, backs off on failure.
//! - **Refresh gate**: the single lock that keeps boosts from ever running concurrently.
//!
//! # Example
//!
//! ```ignore
//! use boostr::scheduler::BoostScheduler;
//!
//! let scheduler = BoostScheduler::new(&ctx, action);
//! scheduler.schedule(item);
//! scheduler.done().cancelled().await;
//! ```

mod manager;
mod rate_limit;
mod refresh;

pub use manager::BoostScheduler;
pub use rate_limit::{RefreshGate, RefreshPermit, RefreshStats};
pub use refresh::{LoopExit, RefreshAction};
