//! Pipeline stage implementations.
//!
//! Each stage is a free function taking the CPU state and the latches it
//! reads and writes; the controller in the parent module sequences them
//! back-to-front every cycle.

/// Decode stage.
pub mod decode;
/// Execute stage: ALU, branch resolution, syscalls.
pub mod execute;
/// Fetch stage: predecode and branch prediction.
pub mod fetch;
/// Issue stage: operand resolution and structural checks.
pub mod issue;
/// Memory stage: loads and stores.
pub mod memory;
/// Writeback stage: retirement.
pub mod writeback;
