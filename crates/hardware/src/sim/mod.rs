//! Simulation driver.
//!
//! This module provides:
//! 1. **`Simulator`:** Owns the CPU architectural state and the selected
//!    timing engine side-by-side and drives them cycle by cycle.
//! 2. **Program Images:** The `(entry, SP, segments)` contract a loader
//!    hands to the timing core.

/// Top-level simulator and run results.
pub mod simulator;

pub use simulator::{ProgramImage, RunResult, Segment, Simulator};
