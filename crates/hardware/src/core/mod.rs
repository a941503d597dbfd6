//! CPU core: architectural state, execution units, and timing engines.
//!
//! This module contains:
//! 1. **Arch:** Register file (GPRs, SP, PC) and PSTATE flags.
//! 2. **Units:** ALU, LSU addressing, and branch predictors.
//! 3. **Latency:** The instruction latency table.
//! 4. **Pipeline:** The detailed cycle-accurate in-order pipeline.
//! 5. **Fast:** The simplified fast-timing engine.

/// Architectural state (registers, PSTATE).
pub mod arch;
/// Fast-timing engine.
pub mod fast;
/// Instruction latency table.
pub mod latency;
/// Detailed pipeline controller and stages.
pub mod pipeline;
/// Execution units.
pub mod units;

use crate::config::Config;
use crate::core::arch::RegFile;
use crate::mem::Memory;
use crate::stats::SimStats;

/// CPU architectural state shared by both timing engines.
///
/// The register file, memory, and statistics are owned here and mutated
/// exclusively by the engine driving the core; there is no global state.
#[derive(Debug, Default)]
pub struct Cpu {
    /// General-purpose registers, SP, PC, and PSTATE.
    pub regs: RegFile,
    /// Byte-addressable program memory.
    pub mem: Memory,
    /// Running statistics.
    pub stats: SimStats,
    /// Enable stage tracing to stderr.
    pub trace: bool,
    /// True once the core has stopped (exit, illegal instruction, or
    /// instruction limit).
    pub halted: bool,
    /// Exit code, present once `halted` is set.
    pub exit_code: Option<i64>,
    /// Retired-instruction limit; 0 means unbounded.
    pub max_instructions: u64,
}

impl Cpu {
    /// Creates a fresh core from configuration: zeroed registers, empty
    /// memory, SP and PC seeded from the general settings.
    pub fn new(config: &Config) -> Self {
        let mut regs = RegFile::new();
        regs.pc = config.general.start_pc;
        regs.sp = config.general.initial_sp;
        Self {
            regs,
            mem: Memory::new(),
            stats: SimStats::default(),
            trace: config.general.trace,
            halted: false,
            exit_code: None,
            max_instructions: config.general.max_instructions,
        }
    }

    /// Records program termination. The first recorded exit wins; later
    /// calls in the same cycle are ignored.
    pub fn halt(&mut self, exit_code: i64) {
        if !self.halted {
            self.halted = true;
            self.exit_code = Some(exit_code);
        }
    }

    /// Retrieves and clears the exit code if the core has halted.
    pub fn take_exit(&mut self) -> Option<i64> {
        self.exit_code.take()
    }
}
