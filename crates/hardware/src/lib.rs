//! ARM64 (AArch64) core timing simulator library.
//!
//! This crate implements a cycle-accurate simulator of a single AArch64 core with the following:
//! 1. **Core:** configurable-width in-order pipeline (Fetch, Decode, Issue, Execute, Memory,
//!    Writeback), register file, PSTATE flags, and a fast-timing alternative engine.
//! 2. **Memory:** sparse 64 KiB-page little-endian byte memory over the full address space.
//! 3. **ISA:** decoding for the integer/branch/load-store AArch64 subset (ADD/SUB, logical
//!    ops, MOVZ, ADRP, LDR/STR, LDP/STP, B/BL/B.cond, BR/BLR/RET, SVC).
//! 4. **Syscalls:** a Linux AArch64 ABI bridge (`read`, `write`, `exit`) invoked at execute.
//! 5. **Simulation:** `Simulator` (owns CPU + engine), program image loading, configuration,
//!    and statistics.

/// Common types (library error enum).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// CPU core (architectural state, execution units, latency table, pipeline, fast engine).
pub mod core;
/// Instruction set (decoded record, condition codes, decoder).
pub mod isa;
/// Sparse page-backed byte memory.
pub mod mem;
/// Simulation: `Simulator`, program images, and run results.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;
/// Linux AArch64 syscall ABI bridge.
pub mod syscall;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// CPU architectural state: registers, PSTATE, memory, statistics.
pub use crate::core::Cpu;
/// Top-level simulator; owns the CPU and the timing engine side-by-side.
pub use crate::sim::simulator::Simulator;
/// Simulation statistics; derived metrics include [`stats::SimStats::cpi`].
pub use crate::stats::SimStats;
