//! Temporal consistency engine for chapter periods.
//!
//! The sole writer of period date ranges in the system: creation,
//! updates, closing, and deletion all pass through [`TimelineEngine`],
//! which runs its invariant checks inside one store transaction.

pub mod engine;

pub use engine::TimelineEngine;
