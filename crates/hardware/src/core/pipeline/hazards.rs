//! Data hazard detection and operand forwarding.
//!
//! This module implements the forwarding network as a pure function over the
//! in-flight latches, so it can be exercised in isolation. It provides:
//! 1. **Operand Resolution:** `resolve_operand` walks producers newest-first
//!    and either forwards a value or reports that the consumer must stall.
//! 2. **Stall Semantics:** An instruction still occupying the execute stage,
//!    or a load whose data has not passed the memory stage, blocks its
//!    consumers; completed ALU results and memory data forward freely.
//! 3. **Stack-Pointer Tracking:** Base-register updates from pre/post-index
//!    addressing (including SP) participate like ordinary results.
//!
//! Register-file state observed here is always from prior cycles; same-cycle
//! writeback results are visible only because retirement runs earlier in the
//! same tick, which is exactly the WB-latch forwarding path.

use crate::common::REG_ZR;
use crate::core::arch::RegFile;
use crate::core::pipeline::latches::{ExecuteMemEntry, IssueExecuteEntry, MemWbEntry};
use crate::isa::{IndexMode, Opcode};

/// Result of resolving one source operand at issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// The operand value, forwarded or read from the register file.
    Ready(u64),
    /// The producer is still in flight; the consumer must wait.
    Stall,
}

impl Operand {
    /// Unwraps a ready value, or `None` when stalled.
    pub fn value(self) -> Option<u64> {
        match self {
            Self::Ready(v) => Some(v),
            Self::Stall => None,
        }
    }
}

/// True if an in-flight (not yet executed) entry will write `reg` in the
/// data-processing context.
pub fn pending_writes_reg(e: &IssueExecuteEntry, reg: usize) -> bool {
    if reg >= REG_ZR {
        return false;
    }
    if e.ctrl.reg_write && (e.inst.rd == reg || (e.inst.op == Opcode::Ldp && e.inst.rt2 == reg)) {
        return true;
    }
    // A pre/post-index base update to an ordinary register is also a write.
    matches!(e.inst.index_mode, IndexMode::Pre | IndexMode::Post) && e.inst.rn == reg
}

/// True if an in-flight entry will update base register `reg` (index 31
/// names SP in this context).
pub fn pending_writes_base(e: &IssueExecuteEntry, reg: usize) -> bool {
    if reg < REG_ZR {
        return pending_writes_reg(e, reg);
    }
    matches!(e.inst.index_mode, IndexMode::Pre | IndexMode::Post) && e.inst.rn == REG_ZR
}

/// View over every in-flight producer, newest stage first.
#[derive(Debug)]
pub struct ForwardView<'a> {
    /// The bundle still occupying the execute stage (results not available).
    pub ex_busy: &'a [IssueExecuteEntry],
    /// Executed entries heading to the memory stage.
    pub ex_mem: &'a [ExecuteMemEntry],
    /// Entries past the memory stage, retiring next.
    pub mem_wb: &'a [MemWbEntry],
    /// Architectural register file (prior-cycle state plus this cycle's
    /// retirements).
    pub regs: &'a RegFile,
}

impl ForwardView<'_> {
    /// Resolves a data-processing source register.
    ///
    /// Index 31 is the zero register and always resolves to 0.
    pub fn resolve_operand(&self, reg: usize) -> Operand {
        if reg >= REG_ZR {
            return Operand::Ready(0);
        }

        // Newest first: a producer still executing blocks the consumer.
        for e in self.ex_busy.iter().rev() {
            if pending_writes_reg(e, reg) {
                return Operand::Stall;
            }
        }

        for e in self.ex_mem.iter().rev() {
            if e.ctrl.reg_write
                && (e.inst.rd == reg || (e.inst.op == Opcode::Ldp && e.inst.rt2 == reg))
            {
                // Load data has not been read yet; ALU results are ready.
                if e.ctrl.mem_read {
                    return Operand::Stall;
                }
                return Operand::Ready(e.alu);
            }
            if let Some(bw) = e.base_wb {
                if bw.reg == reg {
                    return Operand::Ready(bw.value);
                }
            }
        }

        for e in self.mem_wb.iter().rev() {
            if e.ctrl.reg_write && e.inst.rd == reg {
                let v = if e.ctrl.mem_to_reg { e.mem_data } else { e.alu };
                return Operand::Ready(v);
            }
            if e.ctrl.reg_write && e.inst.op == Opcode::Ldp && e.inst.rt2 == reg {
                return Operand::Ready(e.mem_data2);
            }
            if let Some(bw) = e.base_wb {
                if bw.reg == reg {
                    return Operand::Ready(bw.value);
                }
            }
        }

        Operand::Ready(self.regs.read(reg))
    }

    /// Resolves a load/store base register, where index 31 names SP.
    pub fn resolve_base(&self, reg: usize) -> Operand {
        if reg < REG_ZR {
            return self.resolve_operand(reg);
        }

        for e in self.ex_busy.iter().rev() {
            if pending_writes_base(e, REG_ZR) {
                return Operand::Stall;
            }
        }
        for e in self.ex_mem.iter().rev() {
            if let Some(bw) = e.base_wb {
                if bw.reg == REG_ZR {
                    return Operand::Ready(bw.value);
                }
            }
        }
        for e in self.mem_wb.iter().rev() {
            if let Some(bw) = e.base_wb {
                if bw.reg == REG_ZR {
                    return Operand::Ready(bw.value);
                }
            }
        }
        Operand::Ready(self.regs.sp)
    }
}
