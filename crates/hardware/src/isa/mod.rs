//! Instruction set support.
//!
//! This module contains everything the pipeline needs to know about AArch64
//! encodings:
//! 1. **Record:** The decoded [`Instruction`](instruction::Instruction) value
//!    consulted by every stage.
//! 2. **Decoder:** A pure `u32 -> Instruction` function covering the
//!    integer/branch/load-store subset.

/// Pure instruction decoder.
pub mod decode;
/// Decoded instruction record and field enums.
pub mod instruction;

pub use decode::decode;
pub use instruction::{Cond, Format, IndexMode, Instruction, Opcode};
