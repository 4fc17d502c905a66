//! Domain types for Boostr
//!
//! - Item: one boostable resume with its boost bookkeeping

pub mod item;

pub use item::Item;
