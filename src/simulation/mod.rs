//! Simulated flaky work.
//!
//! `source.rs` decides a branch, `unstable.rs` acts it out. Tests swap the
//! random source for a fixed or scripted one instead of patching globals.

pub mod source;
pub mod unstable;

pub use source::{Branch, FixedOutcome, OutcomeSource, RandomOutcomes, ScriptedOutcomes};
pub use unstable::{OperationPayload, UnstableOperation};
