//! Execution units shared by the pipeline and the fast engine.
//!
//! This module groups the functional building blocks of the execute and
//! memory stages:
//! 1. **ALU:** Integer add/sub/logical helpers with NZCV flag production.
//! 2. **LSU:** Effective-address computation for every addressing mode.
//! 3. **BRU:** Branch direction predictors and the branch target buffer.

/// Integer arithmetic and logic with flag production.
pub mod alu;
/// Branch prediction unit implementations.
pub mod bru;
/// Load/store addressing computation.
pub mod lsu;
