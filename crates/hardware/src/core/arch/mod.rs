//! Architectural state of the core.
//!
//! This module holds the state every pipeline stage and the fast engine
//! share:
//! 1. **Register File:** 31 general-purpose registers, the stack pointer, and
//!    the program counter, with AArch64 zero-register semantics.
//! 2. **PSTATE:** The N/Z/C/V condition flags and condition-code evaluation.

/// PSTATE condition flags.
pub mod pstate;
/// General-purpose register file.
pub mod regfile;

pub use pstate::Pstate;
pub use regfile::RegFile;
