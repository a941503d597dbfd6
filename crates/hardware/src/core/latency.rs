//! Instruction latency table.
//!
//! Maps a decoded instruction to its execute-stage occupancy and, for memory
//! operations, its memory-stage occupancy. The issue stage consults the
//! table to compute how long a result stays unavailable to consumers; the
//! execute stage uses it to hold the EX self-loop.

use crate::config::LatencyConfig;
use crate::isa::{Instruction, Opcode};

/// Cycle costs of one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Latency {
    /// Cycles the instruction occupies the execute stage (>= 1).
    pub exec: u32,
    /// Cycles the instruction occupies the memory stage (>= 1 for memory
    /// operations, 1 otherwise).
    pub mem: u32,
}

/// Latency lookup table built from configuration.
#[derive(Clone, Copy, Debug)]
pub struct LatencyTable {
    alu: u32,
    load: u32,
    store: u32,
    branch: u32,
    memory: u32,
}

impl Default for LatencyTable {
    fn default() -> Self {
        Self::from_config(&LatencyConfig::default())
    }
}

impl LatencyTable {
    /// Builds the table from a latency configuration, clamping every class
    /// to at least one cycle.
    pub fn from_config(config: &LatencyConfig) -> Self {
        Self {
            alu: config.alu.max(1),
            load: config.load.max(1),
            store: config.store.max(1),
            branch: config.branch.max(1),
            memory: config.memory.max(1),
        }
    }

    /// Returns the cycle costs for one decoded instruction.
    pub fn lookup(&self, inst: &Instruction) -> Latency {
        match inst.op {
            Opcode::Ldr | Opcode::Ldp => Latency {
                exec: self.load,
                mem: self.memory,
            },
            Opcode::Str | Opcode::Stp => Latency {
                exec: self.store,
                mem: self.memory,
            },
            Opcode::B
            | Opcode::Bl
            | Opcode::BCond
            | Opcode::Br
            | Opcode::Blr
            | Opcode::Ret => Latency {
                exec: self.branch,
                mem: 1,
            },
            _ => Latency {
                exec: self.alu,
                mem: 1,
            },
        }
    }

    /// Execute-stage cycles only; convenience for the fast engine.
    pub fn exec_cycles(&self, inst: &Instruction) -> u32 {
        self.lookup(inst).exec
    }
}
