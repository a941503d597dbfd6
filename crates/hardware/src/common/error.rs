//! Library error definitions.
//!
//! The timing core never raises out-of-band errors: every architectural
//! outcome (illegal instruction, bad syscall, instruction limit, program
//! exit) is converted into a register value, a halt reason, or a statistics
//! counter. `SimError` therefore only covers caller mistakes made before a
//! simulation starts.

use thiserror::Error;

/// Errors reported to the embedding caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// `run` was called before any program image was loaded.
    #[error("program not loaded")]
    ProgramNotLoaded,

    /// The configured issue width is not one of the supported values.
    #[error("unsupported issue width {0} (expected 1, 2, 3, 4, 6, or 8)")]
    InvalidIssueWidth(usize),

    /// A predictor table size was not a power of two.
    #[error("predictor table size {0} is not a power of two")]
    InvalidTableSize(usize),

    /// The configured global history length exceeds the supported maximum.
    #[error("global history length {0} exceeds the 16-bit maximum")]
    InvalidHistoryLength(usize),
}
